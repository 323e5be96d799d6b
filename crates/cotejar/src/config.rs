//! Matcher configuration.

use std::path::PathBuf;

/// Configuration for image snapshot assertions
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Directory holding approved reference images
    pub snapshots_dir: PathBuf,
    /// Root directory for failure report bundles
    pub report_dir: PathBuf,
    /// Suppress failure-artifact persistence
    pub no_report: bool,
    /// Per-pixel color-distance sensitivity (0.0-1.0), forwarded opaquely to the engine
    pub color_threshold: f64,
    /// Forwarded opaquely to the engine's anti-aliasing detection
    pub detect_antialiasing: bool,
    /// Max allowed differing pixel count; exceeding it fails
    pub pixel_threshold_absolute: Option<u64>,
    /// Max allowed differing pixel fraction (0.0-1.0); exceeding it fails
    pub pixel_threshold_relative: Option<f64>,
    /// Explicit reference path, takes precedence over the derived one
    pub snapshot_path_override: Option<PathBuf>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            snapshots_dir: PathBuf::from("__snapshots__"),
            report_dir: PathBuf::from("__reports__"),
            no_report: false,
            color_threshold: 0.1,
            detect_antialiasing: false,
            pixel_threshold_absolute: None,
            pixel_threshold_relative: None,
            snapshot_path_override: None,
        }
    }
}

impl MatcherConfig {
    /// Set the snapshots directory
    #[must_use]
    pub fn with_snapshots_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshots_dir = dir.into();
        self
    }

    /// Set the report root directory
    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Suppress failure report bundles
    #[must_use]
    pub const fn with_no_report(mut self, no_report: bool) -> Self {
        self.no_report = no_report;
        self
    }

    /// Set the per-pixel color-distance threshold
    #[must_use]
    pub const fn with_color_threshold(mut self, threshold: f64) -> Self {
        self.color_threshold = threshold;
        self
    }

    /// Enable anti-aliasing detection in the engine
    #[must_use]
    pub const fn with_antialiasing(mut self, detect: bool) -> Self {
        self.detect_antialiasing = detect;
        self
    }

    /// Allow up to `max` differing pixels
    #[must_use]
    pub const fn with_pixel_threshold_absolute(mut self, max: u64) -> Self {
        self.pixel_threshold_absolute = Some(max);
        self
    }

    /// Allow up to `limit` (0.0-1.0) of pixels to differ
    #[must_use]
    pub const fn with_pixel_threshold_relative(mut self, limit: f64) -> Self {
        self.pixel_threshold_relative = Some(limit);
        self
    }

    /// Pin the reference image to an explicit path
    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path_override = Some(path.into());
        self
    }

    /// Whether any pixel tolerance has been configured
    #[must_use]
    pub const fn has_pixel_threshold(&self) -> bool {
        self.pixel_threshold_absolute.is_some() || self.pixel_threshold_relative.is_some()
    }
}
