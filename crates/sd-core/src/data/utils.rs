//! Utility types and functions for data preparation

use std::fmt;

use super::{DataError, Result};

/// Shape of a rectangular input block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    /// Create a new Shape
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Check if shape is empty
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Square shapes with more than one row cannot be oriented from shape alone
    pub fn is_square(&self) -> bool {
        self.rows > 1 && self.rows == self.cols
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self { rows, cols }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.rows, self.cols)
    }
}

/// Check if all slices have the same length
pub fn check_equal_lengths(slices: &[&[f64]]) -> Result<()> {
    if slices.len() < 2 {
        return Ok(());
    }

    let first_len = slices[0].len();
    for slice in slices.iter().skip(1) {
        if slice.len() != first_len {
            return Err(DataError::DimensionMismatch {
                expected: format!("length {}", first_len),
                actual: format!("length {}", slice.len()),
            });
        }
    }

    Ok(())
}

/// Sorted distinct values of a slice of finite numbers
pub fn sorted_unique(data: &[f64]) -> Vec<f64> {
    let mut values: Vec<f64> = data.to_vec();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}
