//! Container extraction
//!
//! Deserializes a container back into files: the primary payload at a
//! fixed name, then each resource under its stored name, all directly in
//! the output directory. Extraction is a strictly sequential pass over the
//! stream with no backtracking. The payload is written to disk as soon as
//! it is read, so it can be inspected even when a later resource fails.
//!
//! Failure handling follows two tiers: header and length-prefix problems
//! (bad magic, rejected version, truncation) abort the operation; a single
//! resource that cannot be written is recorded as a warning and the loop
//! moves on.

use crate::container::{ContainerReader, PAYLOAD_FILENAME};
use crate::locator::{locate_marker_in_file, DEFAULT_SCAN_WINDOW, MARKER};
use crate::metrics::PackMetrics;
use crate::progress::PackProgress;
use crate::{PackError, PackResult};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Extraction policy knobs.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Container versions accepted on read; `None` accepts any version.
    pub accepted_versions: Option<Vec<u32>>,
    /// Tail-scan bound in bytes when locating the marker in an image.
    pub scan_window: usize,
    /// Show a progress bar over the resource loop.
    pub show_progress: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            accepted_versions: None,
            scan_window: DEFAULT_SCAN_WINDOW,
            show_progress: false,
        }
    }
}

/// A non-fatal problem encountered during extraction.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractWarning {
    /// A resource name length of zero or above the cap ended the list early.
    SuspiciousNameLength {
        /// Index of the resource where the list stopped
        index: u32,
        /// The length value found on the wire
        len: u32,
    },
    /// A resource file could not be created or written; the loop continued.
    FileCreateFailed {
        /// Stored resource name
        name: String,
        /// Underlying failure, as text
        reason: String,
    },
}

impl std::fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractWarning::SuspiciousNameLength { index, len } => write!(
                f,
                "resource {index}: suspicious name length {len}, remaining resources skipped"
            ),
            ExtractWarning::FileCreateFailed { name, reason } => {
                write!(f, "resource {name}: {reason}")
            }
        }
    }
}

/// What an extraction produced.
#[derive(Debug, Serialize)]
pub struct ExtractionReport {
    /// Where the primary payload was written
    pub payload_path: PathBuf,
    /// Payload size in bytes
    pub payload_size: u64,
    /// Number of resource files written
    pub resources_written: usize,
    /// Non-fatal problems, in the order they occurred
    pub warnings: Vec<ExtractWarning>,
}

impl ExtractionReport {
    /// Serialize the report to pretty JSON.
    pub fn to_json(&self) -> PackResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Extracts HCPK containers from byte streams, package files, and
/// self-extracting images.
#[derive(Debug, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with explicit options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Extract a container that starts at `start_offset` within `stream`,
    /// writing files into `output_dir`.
    pub fn extract(
        &self,
        stream: &[u8],
        start_offset: usize,
        output_dir: &Path,
    ) -> PackResult<ExtractionReport> {
        self.extract_with_metrics(stream, start_offset, output_dir, None)
    }

    /// Extract, recording phase timings.
    pub fn extract_with_metrics(
        &self,
        stream: &[u8],
        start_offset: usize,
        output_dir: &Path,
        mut metrics: Option<&mut PackMetrics>,
    ) -> PackResult<ExtractionReport> {
        let mut reader = ContainerReader::at(stream, start_offset);
        let header = reader.read_header()?;
        self.check_version(header.version)?;
        tracing::info!("container version {}", header.version);

        let payload = reader.read_payload()?;

        fs::create_dir_all(output_dir)?;
        let payload_path = output_dir.join(PAYLOAD_FILENAME);
        fs::write(&payload_path, payload)?;
        tracing::info!(
            "wrote payload: {} ({} bytes)",
            payload_path.display(),
            payload.len()
        );
        if let Some(m) = metrics.as_deref_mut() {
            m.mark_payload_write();
        }

        let declared = reader.read_resource_count()?;
        tracing::debug!("container declares {} resources", declared);

        let progress = PackProgress::new();
        let bar = if self.options.show_progress && declared > 0 {
            Some(progress.files(u64::from(declared), "extracting resources"))
        } else {
            None
        };

        let mut warnings = Vec::new();
        let mut resources_written = 0usize;
        while let Some(entry) = reader.next_resource()? {
            let dest = output_dir.join(&entry.name);
            match write_resource(&dest, entry.data) {
                Ok(()) => {
                    tracing::debug!(
                        "wrote resource: {} ({} bytes)",
                        dest.display(),
                        entry.data.len()
                    );
                    resources_written += 1;
                }
                Err(e) => {
                    tracing::warn!("failed to write resource {}: {}", entry.name, e);
                    warnings.push(ExtractWarning::FileCreateFailed {
                        name: entry.name,
                        reason: e.to_string(),
                    });
                }
            }
            if let Some(ref bar) = bar {
                bar.inc(1);
            }
        }
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        if let Some(stop) = reader.suspicious_stop() {
            warnings.push(ExtractWarning::SuspiciousNameLength {
                index: stop.index,
                len: stop.len,
            });
        }

        if let Some(m) = metrics.as_deref_mut() {
            m.mark_resources_write();
            m.mark_total();
        }

        tracing::info!(
            "extraction complete: {} resources written, {} warnings",
            resources_written,
            warnings.len()
        );

        Ok(ExtractionReport {
            payload_path,
            payload_size: payload.len() as u64,
            resources_written,
            warnings,
        })
    }

    /// Extract a standalone `.hcpk` package file.
    pub fn extract_package(&self, path: &Path, output_dir: &Path) -> PackResult<ExtractionReport> {
        let data = fs::read(path)?;
        self.extract(&data, 0, output_dir)
    }

    /// Extract a self-extracting image: locate the marker in the tail,
    /// then extract the container that follows it.
    ///
    /// Only the tail window and the container bytes are read from disk;
    /// the stub portion of the image is never loaded.
    pub fn extract_image(&self, path: &Path, output_dir: &Path) -> PackResult<ExtractionReport> {
        self.extract_image_with_metrics(path, output_dir, None)
    }

    /// Extract a self-extracting image, recording phase timings.
    pub fn extract_image_with_metrics(
        &self,
        path: &Path,
        output_dir: &Path,
        mut metrics: Option<&mut PackMetrics>,
    ) -> PackResult<ExtractionReport> {
        let package_offset = locate_marker_in_file(path, MARKER, self.options.scan_window)?
            .ok_or_else(|| {
                let file_len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                PackError::MarkerNotFound {
                    scanned: (file_len as usize).min(self.options.scan_window),
                }
            })?;
        if let Some(m) = metrics.as_deref_mut() {
            m.mark_marker_scan();
        }

        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(package_offset))?;
        let mut container_bytes = Vec::new();
        file.read_to_end(&mut container_bytes)?;

        self.extract_with_metrics(&container_bytes, 0, output_dir, metrics)
    }

    fn check_version(&self, version: u32) -> PackResult<()> {
        match &self.options.accepted_versions {
            Some(accepted) if !accepted.contains(&version) => {
                Err(PackError::UnsupportedVersion(version))
            }
            _ => Ok(()),
        }
    }
}

/// Create and fill one resource file. Missing parent directories are not
/// created: resource names are flat, and a name smuggling a separator
/// fails here and is reported as a warning by the caller.
fn write_resource(dest: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(dest)?;
    file.write_all(data)
}
