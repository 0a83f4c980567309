//! Binary field primitives for the HCPK wire format
//!
//! Every multi-byte integer in the format is an unsigned 32-bit value in
//! little-endian byte order; variable-length data is stored as
//! `[u32 length][length bytes]`. This module provides the reader and writer
//! halves of those two primitives. Nothing here knows about the container
//! layout itself.

use crate::{PackError, PackResult};

/// Width of an encoded u32 field.
pub const U32_SIZE: usize = 4;

/// Sequential reader over an in-memory byte stream.
///
/// All reads advance a cursor and fail with [`PackError::TruncatedInput`]
/// when the stream holds fewer bytes than the read requires. Length prefixes
/// are validated against the remaining stream before any buffer is
/// allocated, so a corrupt length field cannot trigger a huge allocation.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at `offset` within `data`.
    ///
    /// An offset past the end of `data` yields a reader with nothing
    /// remaining; the first read reports truncation.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            pos: offset.min(data.len()),
        }
    }

    /// Create a reader at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::at(data, 0)
    }

    /// Current cursor position within the full stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize, field: &'static str) -> PackResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(PackError::TruncatedInput {
                field,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed 4-byte array, e.g. a magic literal.
    pub fn read_array4(&mut self, field: &'static str) -> PackResult<[u8; 4]> {
        let bytes = self.take(4, field)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read a little-endian u32.
    pub fn read_u32(&mut self, field: &'static str) -> PackResult<u32> {
        let bytes = self.read_array4(field)?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read `len` raw bytes, borrowed from the stream.
    pub fn read_exact(&mut self, len: usize, field: &'static str) -> PackResult<&'a [u8]> {
        self.take(len, field)
    }

    /// Read a `[u32 length][bytes]` string, borrowed from the stream.
    ///
    /// The declared length is checked against the remaining bytes before the
    /// slice is taken.
    pub fn read_prefixed(&mut self, field: &'static str) -> PackResult<&'a [u8]> {
        let len = self.read_u32(field)? as usize;
        self.take(len, field)
    }
}

/// Append a little-endian u32 to `out`.
pub fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Append a `[u32 length][bytes]` string to `out`.
///
/// Lengths are u32 on the wire; callers keep individual payloads under
/// 4 GiB.
pub fn put_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(out, bytes.len() as u32);
    out.extend_from_slice(bytes);
}
