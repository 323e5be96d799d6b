//! Result and error types for Cotejar.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Cotejar operations
pub type CotejarResult<T> = Result<T, CotejarError>;

/// Errors that can occur in Cotejar.
///
/// Usage errors and engine failures abort the assertion abnormally; they are
/// never downgraded to a pass/fail [`Verdict`](crate::Verdict). Comparison
/// mismatches and missing references are *not* errors — they come back as
/// failing verdicts.
#[derive(Debug, Error)]
pub enum CotejarError {
    /// Matcher invoked in negated form
    #[error("Snapshot assertions cannot be negated: `not` has no meaning for image snapshots")]
    NegatedAssertion,

    /// Calling context is absent or malformed
    #[error("Invalid assertion context: {message}")]
    InvalidContext {
        /// What was missing or malformed
        message: String,
    },

    /// Comparison engine could not be launched
    #[error("Failed to launch comparison engine `{binary}`: {source}")]
    EngineSpawn {
        /// Engine binary path
        binary: PathBuf,
        /// Underlying launch error
        source: std::io::Error,
    },

    /// Comparison engine signaled an unrecognized condition
    #[error("Comparison engine failed (exit code {code:?}): {output}")]
    EngineFailure {
        /// Exit code, if the process exited at all
        code: Option<i32>,
        /// Raw combined stdout/stderr
        output: String,
    },

    /// Comparison engine stdout did not follow the `<count>;<percentage>` shape
    #[error("Comparison engine produced unparsable output: {output:?}")]
    MalformedEngineOutput {
        /// Raw stdout
        output: String,
    },

    /// Report descriptor serialization failed
    #[error("Failed to serialize report descriptor: {0}")]
    ReportSerialization(#[from] serde_json::Error),

    /// Filesystem error while managing snapshots or reports
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
