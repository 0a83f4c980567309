//! Main packer implementation
//!
//! Reads the primary script and every resource up front, serializes one
//! container stream, and writes it either to a standalone `.hcpk` package
//! or onto the tail of a stub executable as a self-extracting image. All
//! input reading happens before the destination is created, and the
//! destination is written through a temp file in the same directory, so a
//! failed pack never leaves a partial package behind.

use crate::container::Container;
use crate::locator::MARKER;
use crate::metrics::PackMetrics;
use crate::progress::PackProgress;
use crate::resources::{ResourceCollector, ResourceSet};
use crate::{Manifest, PackError, PackResult};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One resource input: a file path and an optional stored-name override.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    /// Stored name; defaults to the file name of `path`
    pub name: Option<String>,
    /// File to read the content from
    pub path: PathBuf,
}

/// Result of a pack operation
#[derive(Debug, Serialize)]
pub struct PackOutput {
    /// Path to the written package or self-extracting image
    pub package: PathBuf,
    /// Total size of the output file in bytes
    pub size: u64,
    /// Size of the primary script payload in bytes
    pub payload_size: u64,
    /// Number of resources stored
    pub resource_count: usize,
}

/// Packs a script and resources into an HCPK container
pub struct Packer {
    script: PathBuf,
    resources: Vec<ResourceSpec>,
    resource_dirs: Vec<PathBuf>,
    show_progress: bool,
}

impl Packer {
    /// Create a packer for the given primary script file.
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            resources: Vec::new(),
            resource_dirs: Vec::new(),
            show_progress: false,
        }
    }

    /// Create a packer from a parsed manifest, resolving relative paths
    /// against `base_dir`.
    pub fn from_manifest(manifest: &Manifest, base_dir: &Path) -> PackResult<Self> {
        let resolve = |p: &Path| -> PathBuf {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };

        let mut packer = Self::new(resolve(&manifest.package.script));
        for entry in &manifest.resources {
            packer.resources.push(ResourceSpec {
                name: entry.name.clone(),
                path: resolve(&entry.path),
            });
        }
        if let Some(ref dir) = manifest.package.resource_dir {
            packer.resource_dirs.push(resolve(dir));
        }
        Ok(packer)
    }

    /// Add a resource stored under its file name.
    pub fn resource(mut self, path: impl Into<PathBuf>) -> Self {
        self.resources.push(ResourceSpec {
            name: None,
            path: path.into(),
        });
        self
    }

    /// Add a resource with an explicit stored name.
    pub fn resource_named(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.resources.push(ResourceSpec {
            name: Some(name.into()),
            path: path.into(),
        });
        self
    }

    /// Collect every file under `dir` as a resource (flat names).
    pub fn resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dirs.push(dir.into());
        self
    }

    /// Show a progress bar while reading resources.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Read all inputs and build the in-memory container.
    ///
    /// Every input file is read here; a missing or unreadable source fails
    /// the whole pack before any output exists.
    pub fn build_container(&self) -> PackResult<Container> {
        let payload = fs::read(&self.script).map_err(|e| PackError::SourceFileUnreadable {
            path: self.script.clone(),
            source: e,
        })?;
        tracing::info!(
            "read script payload: {} ({} bytes)",
            self.script.display(),
            payload.len()
        );

        let mut set = ResourceSet::new();
        let collector = ResourceCollector::new();

        let progress = PackProgress::new();
        let bar = if self.show_progress && !self.resources.is_empty() {
            Some(progress.files(self.resources.len() as u64, "reading resources"))
        } else {
            None
        };

        for spec in &self.resources {
            match &spec.name {
                Some(name) => {
                    let content =
                        fs::read(&spec.path).map_err(|e| PackError::SourceFileUnreadable {
                            path: spec.path.clone(),
                            source: e,
                        })?;
                    set.add(name.clone(), content)?;
                }
                None => collector.collect_file(&mut set, &spec.path)?,
            }
            if let Some(ref bar) = bar {
                bar.inc(1);
            }
        }
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        for dir in &self.resource_dirs {
            collector.collect_dir(&mut set, dir)?;
        }

        let mut container = Container::new(payload);
        for (name, data) in set.into_entries() {
            container.add_resource(name, data);
        }
        Ok(container)
    }

    /// Serialize the container to bytes without touching the filesystem
    /// for output.
    pub fn pack_to_vec(&self) -> PackResult<Vec<u8>> {
        Ok(self.build_container()?.to_bytes())
    }

    /// Pack to a standalone `.hcpk` package file.
    pub fn pack_to_file(&self, dest: &Path) -> PackResult<PackOutput> {
        self.pack_to_file_with_metrics(dest, None)
    }

    /// Pack to a package file, recording phase timings.
    pub fn pack_to_file_with_metrics(
        &self,
        dest: &Path,
        mut metrics: Option<&mut PackMetrics>,
    ) -> PackResult<PackOutput> {
        let container = self.build_container()?;
        if let Some(m) = metrics.as_deref_mut() {
            m.mark_inputs_read();
        }

        let payload_size = container.payload.len() as u64;
        let resource_count = container.resources.len();
        let bytes = container.to_bytes();

        let size = write_atomic(dest, |out| out.write_all(&bytes))?;
        if let Some(m) = metrics.as_deref_mut() {
            m.mark_container_write();
            m.mark_total();
        }

        tracing::info!(
            "pack complete: {} ({} bytes, {} resources)",
            dest.display(),
            size,
            resource_count
        );

        Ok(PackOutput {
            package: dest.to_path_buf(),
            size,
            payload_size,
            resource_count,
        })
    }

    /// Build a self-extracting image: the stub executable with
    /// `[marker][container]` appended at its tail.
    ///
    /// Producing the image is a plain byte concatenation; the stub is
    /// copied verbatim and never parsed.
    pub fn pack_self_extracting(&self, stub: &Path, dest: &Path) -> PackResult<PackOutput> {
        let container = self.build_container()?;
        let payload_size = container.payload.len() as u64;
        let resource_count = container.resources.len();
        let bytes = container.to_bytes();

        let mut stub_file = File::open(stub).map_err(|e| PackError::SourceFileUnreadable {
            path: stub.to_path_buf(),
            source: e,
        })?;

        let size = write_atomic(dest, |out| {
            io::copy(&mut stub_file, out)?;
            out.write_all(MARKER)?;
            out.write_all(&bytes)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(dest)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(dest, perms)?;
        }

        tracing::info!(
            "self-extracting image complete: {} ({} bytes, {} resources)",
            dest.display(),
            size,
            resource_count
        );

        Ok(PackOutput {
            package: dest.to_path_buf(),
            size,
            payload_size,
            resource_count,
        })
    }
}

/// Write `dest` through a temp file in the same directory, so the final
/// path only ever holds a complete package.
fn write_atomic<F>(dest: &Path, write: F) -> PackResult<u64>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            fs::create_dir_all(p)?;
            p
        }
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| PackError::Io(e.error))?;
    Ok(fs::metadata(dest)?.len())
}
