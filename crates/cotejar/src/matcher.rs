//! Snapshot Lifecycle Controller.
//!
//! Drives one assertion call end to end: validate the calling context,
//! derive the reference path, create the reference on first run (when the
//! update mode authorizes it), otherwise compare through the engine adapter,
//! decide via the verdict engine, and persist side effects (forced reference
//! update or a failure report bundle).

use crate::comparator::{CompareOptions, ImageComparator, OdiffComparator};
use crate::config::MatcherConfig;
use crate::context::{AssertionContext, UpdateMode};
use crate::paths;
use crate::report::{self, ReportInfo};
use crate::result::CotejarResult;
use crate::verdict::{decide, Explanation, Verdict};
use std::fs;
use std::path::Path;

/// Image snapshot matcher
#[derive(Debug)]
pub struct SnapshotMatcher<C = OdiffComparator> {
    config: MatcherConfig,
    comparator: C,
}

impl SnapshotMatcher<OdiffComparator> {
    /// Matcher backed by the odiff engine on `PATH`
    #[must_use]
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            comparator: OdiffComparator::default(),
        }
    }
}

impl Default for SnapshotMatcher<OdiffComparator> {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}

impl<C: ImageComparator> SnapshotMatcher<C> {
    /// Matcher with a caller-supplied comparison engine
    #[must_use]
    pub fn with_comparator(config: MatcherConfig, comparator: C) -> Self {
        Self { config, comparator }
    }

    /// Matcher configuration
    #[must_use]
    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Assert that `received` matches the approved reference for the current
    /// test, creating or updating the reference per the context's update
    /// mode.
    ///
    /// Comparison mismatches and missing references come back as failing
    /// [`Verdict`]s; only usage errors, engine failures, and I/O problems
    /// are `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error for negated or malformed contexts, engine crashes,
    /// and filesystem failures.
    pub fn assert_snapshot(
        &self,
        ctx: &mut AssertionContext,
        received: &[u8],
    ) -> CotejarResult<Verdict> {
        ctx.validate()?;
        let number = ctx.next_occurrence();
        let identifier =
            paths::snapshot_identifier(&ctx.test_file_path, &ctx.current_test_name, number);
        let reference = paths::reference_path(&self.config, &identifier);
        if let Some(parent) = reference.parent() {
            fs::create_dir_all(parent)?;
        }

        if !reference.exists() {
            return self.handle_missing_reference(ctx, received, &reference);
        }

        // Fresh scratch dir per call so concurrent occurrences never collide
        let scratch = tempfile::tempdir()?;
        let received_path = scratch.path().join(report::RECEIVED_FILE);
        fs::write(&received_path, received)?;
        let diff_mask = scratch.path().join(report::DIFF_FILE);

        // A mask is only consumed by the report bundle, and no bundle is
        // ever written under forced update or with reporting suppressed
        let wants_mask = !self.config.no_report && ctx.update_mode != UpdateMode::All;
        let options = CompareOptions {
            antialiasing: self.config.detect_antialiasing,
            threshold: self.config.color_threshold,
            output_diff_mask: wants_mask,
        };
        let outcome = self
            .comparator
            .compare(&received_path, &reference, &diff_mask, &options)?;
        let verdict = decide(&outcome, &self.config, number);
        if verdict.pass {
            tracing::debug!(snapshot = %identifier, "snapshot matched");
            return Ok(verdict);
        }

        if ctx.update_mode == UpdateMode::All {
            // Forced update always wins over reporting
            fs::write(&reference, received)?;
            ctx.record_updated();
            tracing::debug!(snapshot = %identifier, "reference updated in place");
            return Ok(Verdict::passed());
        }

        if !self.config.no_report {
            self.persist_report(ctx, received, &reference, &diff_mask, &identifier, number, &verdict)?;
        }
        Ok(verdict)
    }

    fn handle_missing_reference(
        &self,
        ctx: &mut AssertionContext,
        received: &[u8],
        reference: &Path,
    ) -> CotejarResult<Verdict> {
        if ctx.update_mode.allows_create() {
            fs::write(reference, received)?;
            ctx.record_added();
            tracing::debug!(reference = %reference.display(), "new reference written");
            return Ok(Verdict::passed());
        }
        let shown = reference.display().to_string();
        Ok(Verdict::failed(Explanation::new(move || {
            format!(
                "New snapshot was not written: `{shown}` does not exist and no update flag \
                 authorized creating it. Snapshots are never created implicitly, so CI runs \
                 fail on missing references; run with update mode \"new\" to write it."
            )
        })))
    }

    #[allow(clippy::too_many_arguments)]
    fn persist_report(
        &self,
        ctx: &AssertionContext,
        received: &[u8],
        reference: &Path,
        diff_mask: &Path,
        identifier: &str,
        number: u32,
        verdict: &Verdict,
    ) -> CotejarResult<()> {
        fs::create_dir_all(&self.config.report_dir)?;
        let bundle_dir = paths::report_bundle_dir(&self.config, identifier);
        let info = ReportInfo {
            test_name: ctx.current_test_name.clone(),
            message: verdict.explanation().unwrap_or_default(),
            changed_relative: verdict.changed_relative.unwrap_or(0.0),
            changed_pixels: verdict.changed_pixels.unwrap_or(0),
            test_file_name: ctx.relative_test_file().to_string_lossy().into_owned(),
            snapshot_number: number,
            received_path: format!("{identifier}/{}", report::RECEIVED_FILE),
            diff_path: format!("{identifier}/{}", report::DIFF_FILE),
            snapshot_path: format!("{identifier}/{}", report::SNAPSHOT_FILE),
        };
        report::write_report_bundle(&bundle_dir, received, reference, Some(diff_mask), &info)
    }
}
