//! Cotejar (Spanish: "to check against") — image snapshot assertions for
//! visual regression testing.
//!
//! Given a freshly rendered image and a previously approved reference,
//! Cotejar decides whether they are the same under configurable tolerances
//! and produces actionable artifacts (diff-mask image, JSON report bundle)
//! when they are not. The pixel-level comparison itself is delegated to an
//! external odiff-compatible engine behind a narrow adapter.
//!
//! # Architecture
//!
//! ```text
//! received bytes
//!      │
//!      ▼
//! ┌──────────────────┐  missing ref  ┌─────────────────┐
//! │ SnapshotMatcher  │──────────────►│ create or fail  │
//! │ (lifecycle)      │               │ per UpdateMode  │
//! └──────┬───────────┘               └─────────────────┘
//!        │ ref exists
//!        ▼
//! ┌──────────────────┐    outcome    ┌─────────────────┐
//! │ ImageComparator  │──────────────►│ decide()        │
//! │ (engine adapter) │               │ (verdict engine)│
//! └──────────────────┘               └────────┬────────┘
//!                                             │ fail
//!                                             ▼
//!                                    update reference or
//!                                    write report bundle
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cotejar::{AssertionContext, MatcherConfig, SnapshotMatcher, UpdateMode};
//!
//! let matcher = SnapshotMatcher::new(MatcherConfig::default());
//! let mut ctx = AssertionContext::new("tests/ui.rs", "renders the header")
//!     .with_update_mode(UpdateMode::from_flag(std::env::var("UPDATE_SNAPSHOTS").ok().as_deref()));
//!
//! let screenshot: Vec<u8> = render_somehow();
//! let verdict = matcher.assert_snapshot(&mut ctx, &screenshot).unwrap();
//! assert!(verdict.pass, "{}", verdict.explanation().unwrap_or_default());
//! # fn render_somehow() -> Vec<u8> { Vec::new() }
//! ```

#![warn(missing_docs)]

mod comparator;
mod config;
mod context;
mod matcher;
mod paths;
mod report;
mod result;
mod verdict;

pub use comparator::{CompareOptions, ComparisonOutcome, ImageComparator, OdiffComparator};
pub use config::MatcherConfig;
pub use context::{AssertionContext, UpdateMode};
pub use matcher::SnapshotMatcher;
pub use report::{
    write_report_bundle, ReportInfo, DIFF_FILE, INFO_FILE, RECEIVED_FILE, SNAPSHOT_FILE,
};
pub use result::{CotejarError, CotejarResult};
pub use verdict::{decide, Explanation, Verdict};
