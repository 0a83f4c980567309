//! Manifest file parser for hcpack
//!
//! Supports `hcpack.toml` manifest files for declarative packaging:
//!
//! ```toml
//! [package]
//! name = "my-app"            # package name, used for the default output
//! script = "main.hc"         # the primary script payload
//! output = "dist/my-app.hcpk" # optional, defaults to "<name>.hcpk"
//! # resource_dir = "assets"  # optional: collect a whole directory (flat)
//!
//! [[resources]]
//! path = "assets/icon.bmp"   # stored under its file name
//!
//! [[resources]]
//! name = "font.dat"          # explicit name override
//! path = "assets/font-v2.dat"
//!
//! [extract]
//! accepted_versions = [1]    # omit to accept any version
//! scan_window = 65536        # tail-scan bound for self-extracting images
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PackError, PackResult};
use crate::locator::DEFAULT_SCAN_WINDOW;

/// Root manifest structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Package metadata
    pub package: PackageConfig,

    /// Explicit resource entries, in pack order
    #[serde(default)]
    pub resources: Vec<ResourceManifestEntry>,

    /// Extraction policy
    #[serde(default)]
    pub extract: ExtractManifestConfig,
}

/// `[package]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Package name
    pub name: String,

    /// Path to the primary script payload
    pub script: PathBuf,

    /// Output package path; defaults to `<name>.hcpk`
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Directory whose files are collected as resources (flat names)
    #[serde(default)]
    pub resource_dir: Option<PathBuf>,
}

/// One `[[resources]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceManifestEntry {
    /// Stored name; defaults to the file name of `path`
    #[serde(default)]
    pub name: Option<String>,

    /// File to read the content from
    pub path: PathBuf,
}

/// `[extract]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractManifestConfig {
    /// Versions accepted on read; `None` accepts any version
    #[serde(default)]
    pub accepted_versions: Option<Vec<u32>>,

    /// Tail-scan bound in bytes for locating the marker
    #[serde(default = "default_scan_window")]
    pub scan_window: usize,
}

impl Default for ExtractManifestConfig {
    fn default() -> Self {
        Self {
            accepted_versions: None,
            scan_window: DEFAULT_SCAN_WINDOW,
        }
    }
}

fn default_scan_window() -> usize {
    DEFAULT_SCAN_WINDOW
}

impl Manifest {
    /// Parse a manifest from TOML text.
    pub fn parse(content: &str) -> PackResult<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> PackResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest = Self::parse(&content)?;
        tracing::debug!("loaded manifest from {}", path.display());
        Ok(manifest)
    }

    /// The output package path, defaulting to `<name>.hcpk`.
    pub fn output_path(&self) -> PathBuf {
        self.package
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.hcpk", self.package.name)))
    }

    fn validate(&self) -> PackResult<()> {
        if self.package.name.is_empty() {
            return Err(PackError::InvalidManifest(
                "package.name must not be empty".to_string(),
            ));
        }
        if self.package.script.as_os_str().is_empty() {
            return Err(PackError::InvalidManifest(
                "package.script must not be empty".to_string(),
            ));
        }
        if self.extract.scan_window == 0 {
            return Err(PackError::InvalidManifest(
                "extract.scan_window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
