//! Progress bar utilities for pack and extract operations
//!
//! Progress indicators for per-resource loops, built on indicatif.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Style presets for progress indicators
pub struct ProgressStyles;

impl ProgressStyles {
    /// Style for per-file loops (shows count and rate)
    pub fn files() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}",
        )
        .unwrap()
        .progress_chars("█▓▒░  ")
    }

    /// Style for byte-based operations (shows size and speed)
    pub fn bytes() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
        )
        .unwrap()
        .progress_chars("█▓▒░  ")
    }

    /// Style for indeterminate operations (spinner only)
    pub fn spinner() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }
}

/// Progress tracker for one pack or extract operation
#[derive(Default)]
pub struct PackProgress {
    multi: MultiProgress,
}

impl PackProgress {
    /// Create a new progress tracker.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    /// Create a spinner for an indeterminate operation.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyles::spinner());
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Create a progress bar over a known number of files.
    pub fn files(&self, total: u64, msg: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(ProgressStyles::files());
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a progress bar over a known number of bytes.
    pub fn bytes(&self, total: u64, msg: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(ProgressStyles::bytes());
        pb.set_message(msg.to_string());
        pb
    }
}
