//! Resource collection for packing
//!
//! Resources live in a flat namespace inside the container: each one is a
//! bare file name plus its content. The collector accepts explicit files
//! and whole directories; directory entries are named by their file name
//! alone, so two files with the same name in different subdirectories
//! collide and are rejected up front rather than silently overwriting each
//! other at extraction time.

use crate::{PackError, PackResult};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// The collected set of resources, in collection order.
#[derive(Debug, Default)]
pub struct ResourceSet {
    entries: Vec<(String, Vec<u8>)>,
    total_size: u64,
}

impl ResourceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named resource, validating the name.
    ///
    /// Names must be non-empty, at most [`NAME_LEN_CAP`] bytes, and free of
    /// path separators: the container namespace is flat and extraction
    /// writes each name directly into the output directory.
    ///
    /// [`NAME_LEN_CAP`]: crate::container::NAME_LEN_CAP
    pub fn add(&mut self, name: impl Into<String>, content: Vec<u8>) -> PackResult<()> {
        let name = name.into();
        validate_name(&name)?;
        if self.entries.iter().any(|(n, _)| n == &name) {
            return Err(PackError::InvalidResourceName(format!(
                "duplicate resource name: {name}"
            )));
        }
        self.total_size += content.len() as u64;
        self.entries.push((name, content));
        Ok(())
    }

    /// Number of resources collected.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total content size in bytes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// View the collected `(name, content)` pairs.
    pub fn entries(&self) -> &[(String, Vec<u8>)] {
        &self.entries
    }

    /// Consume the set, yielding the pairs in collection order.
    pub fn into_entries(self) -> Vec<(String, Vec<u8>)> {
        self.entries
    }
}

/// Reject names that cannot round-trip through a flat container.
fn validate_name(name: &str) -> PackResult<()> {
    if name.is_empty() {
        return Err(PackError::InvalidResourceName(
            "resource name is empty".to_string(),
        ));
    }
    if name.len() > crate::container::NAME_LEN_CAP as usize {
        return Err(PackError::InvalidResourceName(format!(
            "resource name exceeds {} bytes: {name}",
            crate::container::NAME_LEN_CAP
        )));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(PackError::InvalidResourceName(format!(
            "resource name contains a path separator: {name}"
        )));
    }
    Ok(())
}

/// Gathers resource files from paths on disk.
pub struct ResourceCollector {
    exclude_names: Vec<String>,
}

impl Default for ResourceCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCollector {
    /// Create a collector with the standard junk-file excludes.
    pub fn new() -> Self {
        Self {
            exclude_names: vec![
                ".git".to_string(),
                ".gitignore".to_string(),
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
            ],
        }
    }

    /// Add file names to skip during directory collection.
    pub fn exclude(mut self, names: &[&str]) -> Self {
        self.exclude_names
            .extend(names.iter().map(|s| s.to_string()));
        self
    }

    /// Read a single file into `set`, named by its file name.
    pub fn collect_file(&self, set: &mut ResourceSet, path: &Path) -> PackResult<()> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PackError::InvalidResourceName(format!(
                    "cannot derive a resource name from {}",
                    path.display()
                ))
            })?
            .to_string();
        let content = fs::read(path).map_err(|e| PackError::SourceFileUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!("collected resource: {} ({} bytes)", name, content.len());
        set.add(name, content)
    }

    /// Recursively read every file under `dir` into `set`.
    ///
    /// Each file is named by its file name alone; duplicates anywhere in
    /// the tree are an error.
    pub fn collect_dir(&self, set: &mut ResourceSet, dir: &Path) -> PackResult<()> {
        if !dir.is_dir() {
            return Err(PackError::SourceFileUnreadable {
                path: dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not a directory",
                ),
            });
        }

        let mut seen: HashSet<String> = HashSet::new();
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !self.should_exclude(e))
        {
            let entry = entry.map_err(|e| PackError::SourceFileUnreadable {
                path: dir.to_path_buf(),
                source: std::io::Error::other(e),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !seen.insert(name.clone()) {
                return Err(PackError::InvalidResourceName(format!(
                    "duplicate resource name in {}: {name}",
                    dir.display()
                )));
            }
            self.collect_file(set, entry.path())?;
        }

        tracing::info!(
            "collected {} resources ({} bytes) from {}",
            set.len(),
            set.total_size(),
            dir.display()
        );
        Ok(())
    }

    fn should_exclude(&self, entry: &walkdir::DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.exclude_names.iter().any(|n| name == n.as_str())
    }
}
