//! Error types for the fuzzy hash search layer.
//!
//! Comparison itself never fails: malformed or incomparable signatures map
//! to negative codes or a zero score (see [`crate::compare`]). The error
//! type here covers only the external collaborators (signature production,
//! traversal, and I/O), which are surfaced per candidate without aborting a
//! search.

use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of the search layer and its external collaborators.
#[derive(Debug, Error)]
pub enum FuzzyError {
    /// Input does not match the `blocksize:part1:part2[,comment]` grammar.
    #[error("malformed signature: {0:?}")]
    MalformedSignature(String),

    /// The external hashing tool exited abnormally.
    #[error("signature tool failed for {path}: {message}")]
    SignatureTool { path: PathBuf, message: String },

    /// The external hashing tool ran but produced no usable signature line.
    #[error("signature tool produced no usable output for {path}")]
    EmptySignatureOutput { path: PathBuf },

    /// Search root missing or not a directory.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// File I/O errors from collaborators.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fuzzyseek operations.
pub type Result<T> = std::result::Result<T, FuzzyError>;
