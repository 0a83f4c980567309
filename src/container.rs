//! HCPK container model and wire format
//!
//! A container holds one primary script payload and an ordered list of named
//! resources. The serialized form is written and read strictly front to
//! back, with no alignment padding and no trailing checksum:
//!
//! ```text
//! [Header]
//!   - Magic: "HCPK" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//! [Payload]
//!   - Length: u32 LE + that many bytes (the script blob)
//! [Resources]
//!   - Count: u32 LE
//!   - Per resource: name length u32 LE + name bytes,
//!                   data length u32 LE + data bytes
//! ```
//!
//! Resource order is preserved exactly as given at write time. A container
//! is built transiently: packed then serialized, or decoded field by field
//! and immediately materialized to files.

use crate::codec::{put_prefixed, put_u32, ByteReader};
use crate::{PackError, PackResult};

/// Magic bytes identifying an HCPK container.
pub const MAGIC: &[u8; 4] = b"HCPK";

/// Current container format version.
pub const CONTAINER_VERSION: u32 = 1;

/// Upper bound on a stored resource name, in bytes.
///
/// A name length of zero or above this cap on read means the stream is no
/// longer consistent; the resource list stops there.
pub const NAME_LEN_CAP: u32 = 1000;

/// Fixed filename the primary payload is written to on extraction.
pub const PAYLOAD_FILENAME: &str = "extracted.hc";

/// One named auxiliary file stored alongside the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Name used verbatim as the output file name (flat, no directories).
    pub name: String,
    /// Raw file content.
    pub data: Vec<u8>,
}

/// In-memory form of a package: one payload plus named resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Format version stamped into the header.
    pub version: u32,
    /// The primary script blob.
    pub payload: Vec<u8>,
    /// Resources in write order.
    pub resources: Vec<Resource>,
}

impl Container {
    /// Create a container for `payload` with no resources yet.
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            version: CONTAINER_VERSION,
            payload,
            resources: Vec::new(),
        }
    }

    /// Append a resource, keeping insertion order.
    pub fn add_resource(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.resources.push(Resource {
            name: name.into(),
            data,
        });
    }

    /// Exact size of the serialized container in bytes.
    pub fn encoded_len(&self) -> usize {
        let mut len = MAGIC.len() + 4 + 4 + self.payload.len() + 4;
        for res in &self.resources {
            len += 4 + res.name.len() + 4 + res.data.len();
        }
        len
    }

    /// Serialize to the wire format described in the module docs.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(MAGIC);
        put_u32(&mut out, self.version);
        put_prefixed(&mut out, &self.payload);
        put_u32(&mut out, self.resources.len() as u32);
        for res in &self.resources {
            put_prefixed(&mut out, res.name.as_bytes());
            put_prefixed(&mut out, &res.data);
        }
        tracing::debug!(
            "serialized container: {} payload bytes, {} resources, {} total bytes",
            self.payload.len(),
            self.resources.len(),
            out.len()
        );
        out
    }

    /// Decode a container that starts at `offset` within `data`.
    ///
    /// The version is read but not judged here; version policy belongs to
    /// the extractor. A zero or over-cap resource name length ends the
    /// resource list early rather than failing, matching extraction
    /// behavior. Truncation anywhere is an error.
    pub fn from_bytes(data: &[u8], offset: usize) -> PackResult<Self> {
        let mut reader = ContainerReader::at(data, offset);
        let header = reader.read_header()?;
        let payload = reader.read_payload()?.to_vec();
        reader.read_resource_count()?;

        let mut container = Container {
            version: header.version,
            payload,
            resources: Vec::new(),
        };
        while let Some(entry) = reader.next_resource()? {
            container.add_resource(entry.name, entry.data.to_vec());
        }
        Ok(container)
    }
}

/// Decoded header fields.
#[derive(Debug, Clone, Copy)]
pub struct ContainerHeader {
    /// Version as stored; acceptance is the caller's policy.
    pub version: u32,
}

/// One resource as decoded from the stream, data still borrowed.
#[derive(Debug)]
pub struct ResourceEntry<'a> {
    /// Zero-based position in the resource list.
    pub index: u32,
    /// Name bytes decoded as UTF-8, lossily.
    pub name: String,
    /// Raw content, borrowed from the source stream.
    pub data: &'a [u8],
}

/// Strictly-sequential decoder for a serialized container.
///
/// Callers drive it through the four stages in order: header, payload,
/// resource count, then `next_resource` until it returns `None`. There is
/// no backtracking; each stage consumes its bytes exactly once. This shape
/// lets the extractor write the payload to disk before any resource is
/// touched.
#[derive(Debug)]
pub struct ContainerReader<'a> {
    reader: ByteReader<'a>,
    declared: u32,
    index: u32,
    suspicious_stop: Option<SuspiciousLength>,
}

/// Details of a soft stop in the resource list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspiciousLength {
    /// Index of the resource whose name length was rejected.
    pub index: u32,
    /// The length value found on the wire.
    pub len: u32,
}

impl<'a> ContainerReader<'a> {
    /// Create a decoder over the container starting at `offset` in `data`.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            reader: ByteReader::at(data, offset),
            declared: 0,
            index: 0,
            suspicious_stop: None,
        }
    }

    /// Read and validate the magic, then the version.
    pub fn read_header(&mut self) -> PackResult<ContainerHeader> {
        let magic = self.reader.read_array4("magic")?;
        if &magic != MAGIC {
            return Err(PackError::InvalidMagic { found: magic });
        }
        let version = self.reader.read_u32("version")?;
        Ok(ContainerHeader { version })
    }

    /// Read the length-prefixed primary payload.
    pub fn read_payload(&mut self) -> PackResult<&'a [u8]> {
        self.reader.read_prefixed("payload")
    }

    /// Read the declared resource count and arm the resource loop.
    pub fn read_resource_count(&mut self) -> PackResult<u32> {
        self.declared = self.reader.read_u32("resource count")?;
        Ok(self.declared)
    }

    /// Decode the next resource.
    ///
    /// Returns `None` once the declared count is exhausted, or earlier when
    /// a name length of zero or above [`NAME_LEN_CAP`] is found; the early
    /// stop is recorded and readable via [`suspicious_stop`]. A declared
    /// name or data length running past the end of the stream is a hard
    /// [`PackError::TruncatedInput`].
    ///
    /// [`suspicious_stop`]: ContainerReader::suspicious_stop
    pub fn next_resource(&mut self) -> PackResult<Option<ResourceEntry<'a>>> {
        if self.index >= self.declared || self.suspicious_stop.is_some() {
            return Ok(None);
        }
        let name_len = self.reader.read_u32("resource name length")?;
        if name_len == 0 || name_len > NAME_LEN_CAP {
            tracing::warn!(
                "resource {} has suspicious name length {}, stopping list",
                self.index,
                name_len
            );
            self.suspicious_stop = Some(SuspiciousLength {
                index: self.index,
                len: name_len,
            });
            return Ok(None);
        }
        let name_bytes = self
            .reader
            .read_exact(name_len as usize, "resource name")?;
        let data = self.reader.read_prefixed("resource data")?;

        let entry = ResourceEntry {
            index: self.index,
            name: String::from_utf8_lossy(name_bytes).into_owned(),
            data,
        };
        self.index += 1;
        Ok(Some(entry))
    }

    /// Whether the resource list stopped early, and why.
    pub fn suspicious_stop(&self) -> Option<SuspiciousLength> {
        self.suspicious_stop
    }

    /// Cursor position in full-stream coordinates.
    pub fn position(&self) -> usize {
        self.reader.position()
    }
}
