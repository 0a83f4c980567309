//! Marker scan for self-extracting images
//!
//! A self-extracting image is `[stub executable][marker][container]`. The
//! container is found by scanning the tail of the image for the last
//! occurrence of the marker literal. Only a bounded window at the end of
//! the stream is searched: the marker is always within the last 64 KiB of a
//! well-formed image, and bounding the scan keeps large stubs cheap to
//! open. The rightmost match wins because the marker bytes could also occur
//! inside the stub's compiled code; the occurrence adjacent to the appended
//! container is the last one.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::PackResult;

/// Marker literal placed between the stub and the appended container.
pub const MARKER: &[u8] = b"HCPK_EOF:";

/// Default number of trailing bytes searched for the marker.
pub const DEFAULT_SCAN_WINDOW: usize = 64 * 1024;

/// Find the rightmost occurrence of `marker` within the final `scan_window`
/// bytes of `stream`.
///
/// Returns the offset, in full-stream coordinates, of the byte immediately
/// after the marker's last byte, or `None` if the marker does not appear in
/// the window. A marker straddling the window boundary is not found.
pub fn locate_marker(stream: &[u8], marker: &[u8], scan_window: usize) -> Option<usize> {
    if marker.is_empty() || marker.len() > stream.len() {
        return None;
    }
    let window_start = stream.len().saturating_sub(scan_window);
    let window = &stream[window_start..];
    if marker.len() > window.len() {
        return None;
    }

    let mut i = window.len() - marker.len();
    loop {
        if &window[i..i + marker.len()] == marker {
            return Some(window_start + i + marker.len());
        }
        if i == 0 {
            return None;
        }
        i -= 1;
    }
}

/// Scan the tail of a file on disk for `marker`.
///
/// Reads at most `scan_window` bytes from the end of the file; the rest of
/// the image is never touched. Returns the file offset of the byte after
/// the rightmost marker occurrence, or `None`.
pub fn locate_marker_in_file(
    path: &Path,
    marker: &[u8],
    scan_window: usize,
) -> PackResult<Option<u64>> {
    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let tail_start = file_len.saturating_sub(scan_window as u64);
    file.seek(SeekFrom::Start(tail_start))?;

    let mut tail = Vec::with_capacity((file_len - tail_start) as usize);
    file.read_to_end(&mut tail)?;

    let found = locate_marker(&tail, marker, tail.len());
    if let Some(offset) = found {
        tracing::debug!(
            "marker found, package starts at file offset {}",
            tail_start + offset as u64
        );
    }
    Ok(found.map(|offset| tail_start + offset as u64))
}
