//! Run-scoped assertion context.
//!
//! The host test framework constructs one [`AssertionContext`] per test run
//! and threads it explicitly through every snapshot assertion. It replaces
//! the ambient matcher-context binding of snapshot frameworks with a plain
//! state object: test identity, the run-wide update mode, the per-test-name
//! occurrence counters, and the added/updated totals.

use crate::result::{CotejarError, CotejarResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Run-wide policy for writing missing or mismatching references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Write references that do not exist yet
    New,
    /// Write missing references and overwrite mismatching ones
    All,
    /// Never write references (continuous-integration default)
    #[default]
    NoUpdate,
}

impl UpdateMode {
    /// Map a host framework's update flag to a mode.
    ///
    /// `"new"` and `"all"` are recognized; anything else (including no flag
    /// at all) means no snapshot is ever written.
    #[must_use]
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("new") => Self::New,
            Some("all") => Self::All,
            _ => Self::NoUpdate,
        }
    }

    /// Whether this mode authorizes creating a missing reference
    #[must_use]
    pub const fn allows_create(self) -> bool {
        matches!(self, Self::New | Self::All)
    }
}

/// Snapshot state for one test run
#[derive(Debug, Clone)]
pub struct AssertionContext {
    /// Absolute or workspace-relative path of the test file
    pub test_file_path: PathBuf,
    /// Name of the currently running test
    pub current_test_name: String,
    /// Whether the matcher was invoked through a negation
    pub is_not: bool,
    /// Run-wide update policy
    pub update_mode: UpdateMode,
    occurrence_counters: HashMap<String, u32>,
    added: u32,
    updated: u32,
}

impl AssertionContext {
    /// Create a context for one test run
    #[must_use]
    pub fn new(test_file_path: impl Into<PathBuf>, test_name: impl Into<String>) -> Self {
        Self {
            test_file_path: test_file_path.into(),
            current_test_name: test_name.into(),
            is_not: false,
            update_mode: UpdateMode::NoUpdate,
            occurrence_counters: HashMap::new(),
            added: 0,
            updated: 0,
        }
    }

    /// Set the update mode
    #[must_use]
    pub const fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Mark the context as negated (for hosts that surface `.not`)
    #[must_use]
    pub const fn with_negation(mut self, is_not: bool) -> Self {
        self.is_not = is_not;
        self
    }

    /// Switch the current test name, e.g. between tests in one file
    pub fn set_test_name(&mut self, name: impl Into<String>) {
        self.current_test_name = name.into();
    }

    /// Check that this context can host a snapshot assertion.
    ///
    /// # Errors
    ///
    /// Returns [`CotejarError::NegatedAssertion`] for negated invocations and
    /// [`CotejarError::InvalidContext`] when the test identity is missing.
    pub fn validate(&self) -> CotejarResult<()> {
        if self.is_not {
            return Err(CotejarError::NegatedAssertion);
        }
        if self.current_test_name.is_empty() {
            return Err(CotejarError::InvalidContext {
                message: String::from("current test name is empty"),
            });
        }
        if self.test_file_path.as_os_str().is_empty() {
            return Err(CotejarError::InvalidContext {
                message: String::from("test file path is empty"),
            });
        }
        Ok(())
    }

    /// Next 1-based occurrence index for the current test name.
    ///
    /// Counters start at 0 the first time a test name is seen and only ever
    /// increase within a run; they are never persisted.
    pub fn next_occurrence(&mut self) -> u32 {
        let counter = self
            .occurrence_counters
            .entry(self.current_test_name.clone())
            .or_insert(0);
        *counter += 1;
        *counter
    }

    /// Record a newly created reference
    pub fn record_added(&mut self) {
        self.added += 1;
    }

    /// Record a forcibly overwritten reference
    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    /// References created during this run
    #[must_use]
    pub const fn added(&self) -> u32 {
        self.added
    }

    /// References overwritten during this run
    #[must_use]
    pub const fn updated(&self) -> u32 {
        self.updated
    }

    /// Test file path relative to the current working directory when
    /// possible, otherwise as given
    #[must_use]
    pub fn relative_test_file(&self) -> PathBuf {
        std::env::current_dir()
            .ok()
            .and_then(|cwd| self.test_file_path.strip_prefix(&cwd).ok())
            .map_or_else(|| self.test_file_path.clone(), Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_mode_from_flag() {
        assert_eq!(UpdateMode::from_flag(Some("new")), UpdateMode::New);
        assert_eq!(UpdateMode::from_flag(Some("all")), UpdateMode::All);
        assert_eq!(UpdateMode::from_flag(Some("none")), UpdateMode::NoUpdate);
        assert_eq!(UpdateMode::from_flag(None), UpdateMode::NoUpdate);
    }

    #[test]
    fn test_update_mode_allows_create() {
        assert!(UpdateMode::New.allows_create());
        assert!(UpdateMode::All.allows_create());
        assert!(!UpdateMode::NoUpdate.allows_create());
    }

    #[test]
    fn test_occurrences_start_at_one_and_increase() {
        let mut ctx = AssertionContext::new("tests/ui.rs", "renders header");
        assert_eq!(ctx.next_occurrence(), 1);
        assert_eq!(ctx.next_occurrence(), 2);
        assert_eq!(ctx.next_occurrence(), 3);
    }

    #[test]
    fn test_occurrences_independent_per_test_name() {
        let mut ctx = AssertionContext::new("tests/ui.rs", "first test");
        assert_eq!(ctx.next_occurrence(), 1);
        assert_eq!(ctx.next_occurrence(), 2);

        ctx.set_test_name("second test");
        assert_eq!(ctx.next_occurrence(), 1);
        assert_eq!(ctx.next_occurrence(), 2);

        // Returning to the first test continues its own sequence
        ctx.set_test_name("first test");
        assert_eq!(ctx.next_occurrence(), 3);
    }

    #[test]
    fn test_validate_rejects_negation() {
        let ctx = AssertionContext::new("tests/ui.rs", "renders header").with_negation(true);
        assert!(matches!(
            ctx.validate(),
            Err(CotejarError::NegatedAssertion)
        ));
    }

    #[test]
    fn test_validate_rejects_empty_test_name() {
        let ctx = AssertionContext::new("tests/ui.rs", "");
        assert!(matches!(
            ctx.validate(),
            Err(CotejarError::InvalidContext { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_file_path() {
        let ctx = AssertionContext::new("", "renders header");
        assert!(matches!(
            ctx.validate(),
            Err(CotejarError::InvalidContext { .. })
        ));
    }

    #[test]
    fn test_added_updated_counters() {
        let mut ctx = AssertionContext::new("tests/ui.rs", "renders header");
        assert_eq!(ctx.added(), 0);
        assert_eq!(ctx.updated(), 0);
        ctx.record_added();
        ctx.record_added();
        ctx.record_updated();
        assert_eq!(ctx.added(), 2);
        assert_eq!(ctx.updated(), 1);
    }
}
