//! Input preparation for the numerical routines
//!
//! This module turns caller-supplied observation vectors into the clean,
//! finite inputs the engine works on: missing-value filtering, weight
//! validation and normalization of the independent-variable layout.

mod layout;
mod missing;
mod utils;


// Re-exports
pub use layout::{IndependentData, Orientation};
pub use missing::{MissingRange, MissingSpec, WeightedObservations};
pub use utils::{Shape, check_equal_lengths, sorted_unique};

/// Error types specific to input data
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Ragged matrix: row {row} has {len} values, expected {expected}")]
    RaggedMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Invalid weight at index {index}: {value}")]
    InvalidWeight { index: usize, value: f64 },

    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;
