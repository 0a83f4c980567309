//! hcpack - HCPK Container Packaging
//!
//! This crate packs a primary script payload plus named auxiliary
//! resources into one self-contained binary container, and extracts such
//! containers back into files. It also produces self-extracting images by
//! appending a container to the tail of a stub executable behind a scan
//! marker.
//!
//! # Quick Start
//!
//! ```no_run
//! use hcpack::{Extractor, Packer};
//! use std::path::Path;
//!
//! // Pack a script and one resource into a package file
//! let output = Packer::new("main.hc")
//!     .resource("icon.bmp")
//!     .pack_to_file(Path::new("app.hcpk"))?;
//! println!("packed {} bytes", output.size);
//!
//! // Extract it again
//! let report = Extractor::new().extract_package(Path::new("app.hcpk"), Path::new("out"))?;
//! println!("{} resources written", report.resources_written);
//! # Ok::<(), hcpack::PackError>(())
//! ```
//!
//! # Container Format
//!
//! All integers are unsigned 32-bit little-endian; there is no alignment
//! padding and no checksum:
//!
//! ```text
//! [Container]
//!   - Magic: "HCPK" (4 bytes)
//!   - Version: u32 (4 bytes)
//!   - Payload length: u32 + payload bytes (the script blob)
//!   - Resource count: u32
//!   - Per resource: name length u32 + name bytes,
//!                   data length u32 + data bytes
//! ```
//!
//! # Self-Extracting Image Layout
//!
//! ```text
//! [Stub executable bytes]
//! [Marker: "HCPK_EOF:"]
//! [Container bytes, as above]
//! ```
//!
//! The container is found at run time by scanning the last 64 KiB of the
//! image for the rightmost marker occurrence; the container starts at the
//! byte after it.

pub mod codec;
pub mod container;
mod error;
mod extract;
mod locator;
mod manifest;
mod metrics;
mod packer;
pub mod progress;
mod resources;

pub use codec::ByteReader;
pub use container::{
    Container, ContainerReader, Resource, ResourceEntry, SuspiciousLength, CONTAINER_VERSION,
    MAGIC, NAME_LEN_CAP, PAYLOAD_FILENAME,
};
pub use error::{PackError, PackResult};
pub use extract::{ExtractOptions, ExtractWarning, ExtractionReport, Extractor};
pub use locator::{locate_marker, locate_marker_in_file, DEFAULT_SCAN_WINDOW, MARKER};
pub use manifest::{
    ExtractManifestConfig, Manifest, PackageConfig, ResourceManifestEntry,
};
pub use metrics::PackMetrics;
pub use packer::{PackOutput, Packer, ResourceSpec};
pub use progress::{PackProgress, ProgressStyles};
pub use resources::{ResourceCollector, ResourceSet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if the current executable has a container appended (is a
/// self-extracting image)
pub fn is_self_extracting() -> bool {
    let exe_path = match std::env::current_exe() {
        Ok(p) => p,
        Err(_) => return false,
    };
    matches!(
        locate_marker_in_file(&exe_path, MARKER, DEFAULT_SCAN_WINDOW),
        Ok(Some(_))
    )
}

/// Extract the container appended to the current executable into
/// `output_dir`
pub fn extract_self(output_dir: &std::path::Path) -> PackResult<ExtractionReport> {
    let exe_path = std::env::current_exe()?;
    Extractor::new().extract_image(&exe_path, output_dir)
}
