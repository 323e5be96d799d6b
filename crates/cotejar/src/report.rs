//! Failure report bundles.
//!
//! A failing comparison persists a directory with the received image, a copy
//! of the reference, the engine's diff-mask (when one was produced), and a
//! JSON descriptor for tooling to pick up.

use crate::result::CotejarResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Received image filename inside a bundle
pub const RECEIVED_FILE: &str = "received.png";
/// Diff-mask filename inside a bundle
pub const DIFF_FILE: &str = "diff.png";
/// Reference copy filename inside a bundle
pub const SNAPSHOT_FILE: &str = "snapshot.png";
/// JSON descriptor filename inside a bundle
pub const INFO_FILE: &str = "info.json";

/// JSON descriptor written next to the bundle images.
///
/// Image paths are relative to the report root so the bundle stays portable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInfo {
    /// Name of the failing test
    pub test_name: String,
    /// Rendered failure explanation
    pub message: String,
    /// Differing pixel fraction (0.0-1.0)
    pub changed_relative: f64,
    /// Differing pixel count
    pub changed_pixels: u64,
    /// Test file path, relative to the working directory
    pub test_file_name: String,
    /// 1-based occurrence index within the test
    pub snapshot_number: u32,
    /// Bundle-relative path of the received image
    pub received_path: String,
    /// Bundle-relative path of the diff-mask image
    pub diff_path: String,
    /// Bundle-relative path of the reference copy
    pub snapshot_path: String,
}

/// Write a failure report bundle, replacing any previous bundle at the same
/// path.
///
/// `diff_mask` is copied only when the engine actually wrote one (dimension
/// mismatches produce no mask).
///
/// # Errors
///
/// Returns an error if any file in the bundle cannot be written.
pub fn write_report_bundle(
    bundle_dir: &Path,
    received: &[u8],
    reference: &Path,
    diff_mask: Option<&Path>,
    info: &ReportInfo,
) -> CotejarResult<()> {
    if bundle_dir.exists() {
        fs::remove_dir_all(bundle_dir)?;
    }
    fs::create_dir_all(bundle_dir)?;

    fs::write(bundle_dir.join(RECEIVED_FILE), received)?;
    fs::copy(reference, bundle_dir.join(SNAPSHOT_FILE))?;
    if let Some(mask) = diff_mask {
        if mask.exists() {
            fs::copy(mask, bundle_dir.join(DIFF_FILE))?;
        }
    }

    let descriptor = serde_json::to_string_pretty(info)?;
    fs::write(bundle_dir.join(INFO_FILE), descriptor)?;
    tracing::debug!(bundle = %bundle_dir.display(), "wrote failure report bundle");
    Ok(())
}
