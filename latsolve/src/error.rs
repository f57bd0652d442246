//! Error types for the solver pipeline.
//!
//! There are two families of failures. Input consistency errors are raised
//! while files are parsed and validated, before any real work starts.
//! [`Error::Overflow`] is different: it can surface at any point during a run
//! with a fixed width integer type and aborts the run. The caller is expected
//! to retry with a wider type, nothing is retried internally.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the solver.
#[derive(Debug, Error)]
pub enum Error {
    /// A fixed width integer operation left the representable range.
    #[error("arithmetic overflow, retry the computation with a wider integer type")]
    Overflow,

    /// A malformed token or line in one of the input files.
    #[error("parse error: {0}")]
    Parse(String),

    /// Shapes of the input files do not fit together.
    #[error("dimension mismatch: {0}")]
    Dimensions(String),

    /// The combination of inputs is not allowed for the selected variant.
    #[error("inconsistent input: {0}")]
    Inconsistent(String),

    /// An underlying file operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
