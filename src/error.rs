//! Crate-wide error type

use thiserror::Error;

/// Errors raised by the membership store, the clustering seam, the counter
/// and configuration loading.
#[derive(Error, Debug)]
pub enum Error {
    /// Two filters with different `(n, k)` were combined
    #[error("incompatible filter: expected {expected}, found {found}")]
    IncompatibleFilter { expected: String, found: String },

    /// An estimator hit a zero denominator or a non-positive log argument
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Persisted filter text could not be reconstructed
    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// A clustering primitive returned the wrong number of labels
    #[error("label count mismatch: expected {expected}, found {found}")]
    LabelCountMismatch { expected: usize, found: usize },

    #[error("reference table is empty")]
    EmptyReferenceTable,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
