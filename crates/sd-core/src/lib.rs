//! # sd-core
//!
//! Core numerics for StatDiag: input preparation, dense linear algebra,
//! special functions with the derived distribution CDFs, descriptive
//! moments and the weighted percentile engine.

pub mod data;
pub mod error;
pub mod frequency;
pub mod linalg;
pub mod special;
pub mod stats;

pub use error::{CoreError, Result};
pub use frequency::{FrequencyTable, PercentileMethod};
pub use linalg::{Matrix, Vector};
