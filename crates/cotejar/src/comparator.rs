//! Image Comparator Adapter.
//!
//! The pixel-level comparison algorithm lives in an external engine binary
//! (odiff-compatible). This module is the only place that knows about its
//! command line and exit codes; everything downstream sees a closed
//! [`ComparisonOutcome`] variant.

use crate::result::{CotejarError, CotejarResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Engine exit code: images match
const EXIT_MATCH: i32 = 0;
/// Engine exit code: image dimensions differ, pixels are not comparable
const EXIT_LAYOUT_DIFF: i32 = 21;
/// Engine exit code: pixel-level mismatch, stdout carries `<count>;<percentage>`
const EXIT_PIXEL_DIFF: i32 = 22;

/// Default diff-mask highlight color
const DEFAULT_DIFF_COLOR: &str = "#cd2cc9";

/// Options forwarded to one engine invocation
#[derive(Debug, Clone, Copy)]
pub struct CompareOptions {
    /// Ignore anti-aliased pixels
    pub antialiasing: bool,
    /// Per-pixel color-distance threshold (0.0-1.0)
    pub threshold: f64,
    /// Ask the engine to write a diff-mask image on pixel mismatch
    pub output_diff_mask: bool,
}

/// Outcome of one pixel-level comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComparisonOutcome {
    /// Images match under the engine's color threshold
    Match,
    /// Images have different dimensions; no pixels are comparable
    DimensionsDiffer,
    /// Images differ at the pixel level
    PixelDiff {
        /// Number of differing pixels
        diff_count: u64,
        /// Differing pixels / total comparable pixels (0.0-1.0)
        diff_fraction: f64,
    },
}

impl ComparisonOutcome {
    /// Whether the engine considered the images equal
    #[must_use]
    pub const fn matched(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// Differing pixel count (0 when matched or not pixel-comparable)
    #[must_use]
    pub const fn diff_count(&self) -> u64 {
        match self {
            Self::PixelDiff { diff_count, .. } => *diff_count,
            _ => 0,
        }
    }

    /// Differing pixel fraction (0.0 when matched or not pixel-comparable)
    #[must_use]
    pub const fn diff_fraction(&self) -> f64 {
        match self {
            Self::PixelDiff { diff_fraction, .. } => *diff_fraction,
            _ => 0.0,
        }
    }
}

/// Boundary between the snapshot lifecycle and the pixel-diff engine.
///
/// The lifecycle controller only depends on this trait, so tests (and hosts
/// with an in-process engine) can substitute their own implementation.
pub trait ImageComparator {
    /// Compare two existing image files.
    ///
    /// Writes a diff-mask image to `diff_output` when the engine finds a
    /// pixel-level difference and `options.output_diff_mask` is set. Nothing
    /// is written when the images match or their dimensions differ.
    ///
    /// # Errors
    ///
    /// Any engine signal outside the three recognized outcome classes is a
    /// fatal error, not a verdict.
    fn compare(
        &self,
        received: &Path,
        reference: &Path,
        diff_output: &Path,
        options: &CompareOptions,
    ) -> CotejarResult<ComparisonOutcome>;
}

/// Process-invocation adapter for the odiff comparison engine
#[derive(Debug, Clone)]
pub struct OdiffComparator {
    binary: PathBuf,
    diff_color: String,
}

impl Default for OdiffComparator {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("odiff"),
            diff_color: String::from(DEFAULT_DIFF_COLOR),
        }
    }
}

impl OdiffComparator {
    /// Use an engine binary at an explicit path
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    /// Override the diff-mask highlight color (hex, e.g. `#ff0000`)
    #[must_use]
    pub fn with_diff_color(mut self, color: impl Into<String>) -> Self {
        self.diff_color = color.into();
        self
    }

    /// Engine binary path
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl ImageComparator for OdiffComparator {
    fn compare(
        &self,
        received: &Path,
        reference: &Path,
        diff_output: &Path,
        options: &CompareOptions,
    ) -> CotejarResult<ComparisonOutcome> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--parsable-stdout")
            .arg(format!("--threshold={}", options.threshold))
            .arg(format!("--diff-color={}", self.diff_color));
        if options.antialiasing {
            cmd.arg("--antialiasing");
        }
        if options.output_diff_mask {
            cmd.arg("--output-diff-mask");
        }
        cmd.arg(received).arg(reference).arg(diff_output);

        // Single blocking invocation, no retries: the engine is assumed
        // deterministic for identical inputs.
        let output = cmd.output().map_err(|source| CotejarError::EngineSpawn {
            binary: self.binary.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match output.status.code() {
            Some(EXIT_MATCH) => Ok(ComparisonOutcome::Match),
            Some(EXIT_LAYOUT_DIFF) => Ok(ComparisonOutcome::DimensionsDiffer),
            Some(EXIT_PIXEL_DIFF) => parse_pixel_diff(stdout.trim()),
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::error!(
                    ?code,
                    stdout = %stdout,
                    stderr = %stderr,
                    "comparison engine signaled an unrecognized condition"
                );
                Err(CotejarError::EngineFailure {
                    code,
                    output: format!("{stdout}{stderr}"),
                })
            }
        }
    }
}

/// Parse the engine's pixel-mismatch stdout: `<count>;<percentage>`, with the
/// percentage in 0..100.
fn parse_pixel_diff(stdout: &str) -> CotejarResult<ComparisonOutcome> {
    let malformed = || CotejarError::MalformedEngineOutput {
        output: stdout.to_string(),
    };
    let (count, percentage) = stdout.split_once(';').ok_or_else(malformed)?;
    let diff_count: u64 = count.trim().parse().map_err(|_| malformed())?;
    let percentage: f64 = percentage.trim().parse().map_err(|_| malformed())?;
    Ok(ComparisonOutcome::PixelDiff {
        diff_count,
        diff_fraction: percentage / 100.0,
    })
}
