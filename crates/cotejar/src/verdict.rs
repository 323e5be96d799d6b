//! Verdict Engine.
//!
//! Turns a [`ComparisonOutcome`] plus the configured tolerances into a
//! pass/fail [`Verdict`]. Failure explanations are deferred: nothing is
//! formatted unless the caller actually reads the message.

use crate::comparator::ComparisonOutcome;
use crate::config::MatcherConfig;
use std::fmt;

/// Lazily rendered failure explanation
pub struct Explanation(Box<dyn Fn() -> String + Send + Sync>);

impl Explanation {
    /// Wrap a message producer
    pub fn new(producer: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Box::new(producer))
    }

    /// Produce the message
    #[must_use]
    pub fn render(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Explanation(<deferred>)")
    }
}

/// Pass/fail decision for one snapshot assertion
#[derive(Debug)]
pub struct Verdict {
    /// Whether the assertion passed
    pub pass: bool,
    explanation: Option<Explanation>,
    /// Differing pixel count, present on comparison failures
    pub changed_pixels: Option<u64>,
    /// Differing pixel fraction (0.0-1.0), present on comparison failures
    pub changed_relative: Option<f64>,
}

impl Verdict {
    /// Passing verdict; carries no explanation or pixel numbers
    #[must_use]
    pub const fn passed() -> Self {
        Self {
            pass: true,
            explanation: None,
            changed_pixels: None,
            changed_relative: None,
        }
    }

    /// Failing verdict with a deferred explanation
    #[must_use]
    pub fn failed(explanation: Explanation) -> Self {
        Self {
            pass: false,
            explanation: Some(explanation),
            changed_pixels: None,
            changed_relative: None,
        }
    }

    /// Attach measured pixel change numbers
    #[must_use]
    pub const fn with_changes(mut self, pixels: u64, relative: f64) -> Self {
        self.changed_pixels = Some(pixels);
        self.changed_relative = Some(relative);
        self
    }

    /// Render the explanation, if any
    #[must_use]
    pub fn explanation(&self) -> Option<String> {
        self.explanation.as_ref().map(Explanation::render)
    }
}

/// Decide pass/fail for one comparison outcome.
///
/// Rules, first match wins:
/// 1. absolute pixel threshold configured and exceeded → fail
/// 2. relative pixel threshold configured and exceeded → fail
/// 3. dimensions differ → fail, no pixel numbers shown
/// 4. pixel difference with no tolerance configured → fail (a snapshot
///    matcher without tolerances is a strict equality check)
/// 5. otherwise → pass
#[must_use]
pub fn decide(
    outcome: &ComparisonOutcome,
    config: &MatcherConfig,
    snapshot_number: u32,
) -> Verdict {
    let diff_count = outcome.diff_count();
    let diff_fraction = outcome.diff_fraction();

    if let Some(max) = config.pixel_threshold_absolute {
        if diff_count > max {
            return Verdict::failed(Explanation::new(move || {
                format!(
                    "Snapshot #{snapshot_number}: expected no more than {max} pixels to differ, \
                     but {diff_count} pixels changed"
                )
            }))
            .with_changes(diff_count, diff_fraction);
        }
    }

    if let Some(limit) = config.pixel_threshold_relative {
        if diff_fraction > limit {
            return Verdict::failed(Explanation::new(move || {
                format!(
                    "Snapshot #{snapshot_number}: expected no more than {:.2}% of pixels to \
                     differ, but {:.2}% changed",
                    limit * 100.0,
                    diff_fraction * 100.0
                )
            }))
            .with_changes(diff_count, diff_fraction);
        }
    }

    if matches!(outcome, ComparisonOutcome::DimensionsDiffer) {
        return Verdict::failed(Explanation::new(move || {
            format!(
                "Snapshot #{snapshot_number}: image dimensions changed, received image \
                 and reference snapshot are not the same size"
            )
        }))
        .with_changes(0, 0.0);
    }

    if diff_count > 0 && !config.has_pixel_threshold() {
        return Verdict::failed(Explanation::new(move || {
            format!(
                "Snapshot #{snapshot_number}: {diff_count} pixels changed and no pixel \
                 threshold is configured, any detected difference fails"
            )
        }))
        .with_changes(diff_count, diff_fraction);
    }

    Verdict::passed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_diff(count: u64, fraction: f64) -> ComparisonOutcome {
        ComparisonOutcome::PixelDiff {
            diff_count: count,
            diff_fraction: fraction,
        }
    }

    #[test]
    fn test_match_always_passes() {
        let strict = MatcherConfig::default()
            .with_pixel_threshold_absolute(0)
            .with_pixel_threshold_relative(0.0);
        let verdict = decide(&ComparisonOutcome::Match, &strict, 1);
        assert!(verdict.pass);
        assert!(verdict.explanation().is_none());
        assert!(verdict.changed_pixels.is_none());
    }

    #[test]
    fn test_absolute_threshold_boundary() {
        let config = MatcherConfig::default().with_pixel_threshold_absolute(10);
        // Exactly at the threshold passes, strict inequality
        assert!(decide(&pixel_diff(10, 0.01), &config, 1).pass);
        assert!(!decide(&pixel_diff(11, 0.01), &config, 1).pass);
    }

    #[test]
    fn test_absolute_threshold_explanation_cites_both_counts() {
        let config = MatcherConfig::default().with_pixel_threshold_absolute(10);
        let verdict = decide(&pixel_diff(50, 0.10), &config, 1);
        assert!(!verdict.pass);
        let message = verdict.explanation().unwrap();
        assert!(message.contains("10 pixels"));
        assert!(message.contains("50 pixels"));
        assert_eq!(verdict.changed_pixels, Some(50));
        assert!((verdict.changed_relative.unwrap() - 0.10).abs() < f64::EPSILON);
    }

    #[test]
    fn test_relative_threshold_boundary() {
        let config = MatcherConfig::default().with_pixel_threshold_relative(0.05);
        assert!(decide(&pixel_diff(5, 0.05), &config, 1).pass);
        assert!(!decide(&pixel_diff(6, 0.0501), &config, 1).pass);
    }

    #[test]
    fn test_relative_threshold_explanation_renders_percentages() {
        let config = MatcherConfig::default().with_pixel_threshold_relative(0.05);
        let verdict = decide(&pixel_diff(120, 0.1234), &config, 2);
        let message = verdict.explanation().unwrap();
        assert!(message.contains("5.00%"));
        assert!(message.contains("12.34%"));
    }

    #[test]
    fn test_absolute_checked_before_relative() {
        let config = MatcherConfig::default()
            .with_pixel_threshold_absolute(10)
            .with_pixel_threshold_relative(0.5);
        let verdict = decide(&pixel_diff(50, 0.10), &config, 1);
        assert!(!verdict.pass);
        // The absolute rule fired, so the message is in pixel counts
        assert!(verdict.explanation().unwrap().contains("50 pixels"));
    }

    #[test]
    fn test_within_both_thresholds_passes() {
        let config = MatcherConfig::default()
            .with_pixel_threshold_absolute(100)
            .with_pixel_threshold_relative(0.5);
        assert!(decide(&pixel_diff(50, 0.10), &config, 1).pass);
    }

    #[test]
    fn test_dimension_mismatch_fails_without_pixel_counts() {
        let verdict = decide(
            &ComparisonOutcome::DimensionsDiffer,
            &MatcherConfig::default(),
            1,
        );
        assert!(!verdict.pass);
        let message = verdict.explanation().unwrap();
        assert!(message.contains("dimensions"));
        assert!(!message.contains("pixels changed"));
        assert_eq!(verdict.changed_pixels, Some(0));
        assert!((verdict.changed_relative.unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dimension_mismatch_fails_even_with_thresholds() {
        let config = MatcherConfig::default()
            .with_pixel_threshold_absolute(1000)
            .with_pixel_threshold_relative(1.0);
        assert!(!decide(&ComparisonOutcome::DimensionsDiffer, &config, 1).pass);
    }

    #[test]
    fn test_pixel_diff_without_thresholds_is_zero_tolerance() {
        let verdict = decide(&pixel_diff(1, 0.0001), &MatcherConfig::default(), 1);
        assert!(!verdict.pass);
        assert!(verdict
            .explanation()
            .unwrap()
            .contains("no pixel threshold"));
        assert_eq!(verdict.changed_pixels, Some(1));
    }

    #[test]
    fn test_tolerated_pixel_diff_passes() {
        let config = MatcherConfig::default().with_pixel_threshold_absolute(5);
        let verdict = decide(&pixel_diff(3, 0.003), &config, 1);
        assert!(verdict.pass);
        assert!(verdict.changed_pixels.is_none());
    }

    #[test]
    fn test_explanation_is_deferred() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let rendered = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&rendered);
        let verdict = Verdict::failed(Explanation::new(move || {
            flag.store(true, Ordering::SeqCst);
            String::from("message")
        }));
        assert!(!rendered.load(Ordering::SeqCst));
        assert_eq!(verdict.explanation().unwrap(), "message");
        assert!(rendered.load(Ordering::SeqCst));
    }
}
