//! Snapshot and report path derivation.
//!
//! Pure bookkeeping: identifiers are a kebab-case slug of the test file stem
//! and the test name, suffixed with the 1-based occurrence index, so every
//! assertion call inside a test maps to a distinct, stable filename.

use crate::config::MatcherConfig;
use std::path::{Path, PathBuf};

/// Stable identifier for `(test file, test name, occurrence)`
pub(crate) fn snapshot_identifier(test_file: &Path, test_name: &str, number: u32) -> String {
    let stem = test_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slug = slugify(&format!("{stem} {test_name}"));
    if slug.is_empty() {
        format!("snapshot-{number}")
    } else {
        format!("{slug}-{number}")
    }
}

/// Reference image path: explicit override wins, otherwise derived
pub(crate) fn reference_path(config: &MatcherConfig, identifier: &str) -> PathBuf {
    config.snapshot_path_override.clone().map_or_else(
        || config.snapshots_dir.join(format!("{identifier}.png")),
        |path| path,
    )
}

/// Failure report bundle directory for one occurrence
pub(crate) fn report_bundle_dir(config: &MatcherConfig, identifier: &str) -> PathBuf {
    config.report_dir.join(identifier)
}

/// Lowercase alphanumeric kebab-case, runs of other characters collapse to
/// a single `-`
fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
