//! Timing metrics for pack and extract operations
//!
//! Records how long the main phases of an operation took, for diagnosing
//! slow packs and extractions.

use std::time::{Duration, Instant};

/// Phase timings for one pack or extract operation
#[derive(Debug)]
pub struct PackMetrics {
    /// When measurement started
    start: Instant,
    /// Input files fully read (pack side)
    pub inputs_read: Option<Duration>,
    /// Container stream written to its destination (pack side)
    pub container_write: Option<Duration>,
    /// Marker located in the image tail (extract side)
    pub marker_scan: Option<Duration>,
    /// Primary payload written to disk (extract side)
    pub payload_write: Option<Duration>,
    /// Resource loop finished (extract side)
    pub resources_write: Option<Duration>,
    /// Whole operation finished
    pub total: Option<Duration>,
    /// Extra named phase timings
    phases: Vec<(String, Duration)>,
}

impl Default for PackMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PackMetrics {
    /// Start measuring now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            inputs_read: None,
            container_write: None,
            marker_scan: None,
            payload_write: None,
            resources_write: None,
            total: None,
            phases: Vec::new(),
        }
    }

    /// Mark input reading complete.
    pub fn mark_inputs_read(&mut self) {
        self.inputs_read = Some(self.start.elapsed());
    }

    /// Mark the container write complete.
    pub fn mark_container_write(&mut self) {
        self.container_write = Some(self.start.elapsed());
    }

    /// Mark the marker scan complete.
    pub fn mark_marker_scan(&mut self) {
        self.marker_scan = Some(self.start.elapsed());
    }

    /// Mark the payload write complete.
    pub fn mark_payload_write(&mut self) {
        self.payload_write = Some(self.start.elapsed());
    }

    /// Mark the resource loop complete.
    pub fn mark_resources_write(&mut self) {
        self.resources_write = Some(self.start.elapsed());
    }

    /// Mark the whole operation complete.
    pub fn mark_total(&mut self) {
        self.total = Some(self.start.elapsed());
    }

    /// Record a custom phase timing.
    pub fn add_phase(&mut self, name: impl Into<String>, duration: Duration) {
        self.phases.push((name.into(), duration));
    }

    /// Time a closure and record it as a phase.
    pub fn time_phase<F, R>(&mut self, name: impl Into<String>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let phase_start = Instant::now();
        let result = f();
        self.phases.push((name.into(), phase_start.elapsed()));
        result
    }

    /// Elapsed time since measurement started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn format_duration(d: Duration) -> String {
        let ms = d.as_secs_f64() * 1000.0;
        if ms < 1.0 {
            format!("{}µs", d.as_micros())
        } else if ms < 1000.0 {
            format!("{ms:.2}ms")
        } else {
            format!("{:.2}s", d.as_secs_f64())
        }
    }

    /// Generate a formatted timing report.
    pub fn report(&self) -> String {
        let marks: [(&str, Option<Duration>); 6] = [
            ("Inputs read", self.inputs_read),
            ("Container write", self.container_write),
            ("Marker scan", self.marker_scan),
            ("Payload write", self.payload_write),
            ("Resources write", self.resources_write),
            ("Total", self.total),
        ];

        let mut lines = Vec::new();
        lines.push(format!(
            "=== hcpack timing (elapsed {}) ===",
            Self::format_duration(self.elapsed())
        ));
        for (label, mark) in marks {
            if let Some(d) = mark {
                lines.push(format!("  {:<16} {:>10}", label, Self::format_duration(d)));
            }
        }
        for (name, duration) in &self.phases {
            lines.push(format!(
                "  {:<16} {:>10}",
                name,
                Self::format_duration(*duration)
            ));
        }
        lines.join("\n")
    }

    /// Log the report using tracing.
    pub fn log_report(&self) {
        for line in self.report().lines() {
            tracing::info!("{}", line);
        }
    }
}
