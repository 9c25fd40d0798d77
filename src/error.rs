//! Error types for isolearn

use std::path::PathBuf;
use thiserror::Error;

/// Isolearn error type
#[derive(Debug, Error)]
pub enum IsoError {
    /// Engine shape or configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Filter parameters out of their domain
    #[error("Invalid filter parameters: {0}")]
    InvalidFilter(String),

    /// Channel or slot index outside the configured bounds
    #[error("{what} index {index} out of range (bound {bound})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    /// predict() called before a channel was ever fed
    #[error("Channel {0} has not received any input yet")]
    UninitializedInput(usize),

    /// The reflex weight (0,0) is a fixed reference gain
    #[error("Reflex weight (0,0) is fixed")]
    FixedReflexWeight,

    /// Shape mismatch
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A documentation file could not be opened
    #[error("Could not open docu {}: {source}", .path.display())]
    DocuOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encode/decode error
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, IsoError>;
