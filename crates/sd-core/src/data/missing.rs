//! Per-variable missing-value definitions
//!
//! A value is missing when it is non-finite, equals one of the declared
//! sentinel values, or falls inside the declared inclusive range.

use serde::{Deserialize, Serialize};

use super::{DataError, Result, check_equal_lengths};

/// Inclusive range of missing values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissingRange {
    /// Lower bound (inclusive)
    pub low: f64,
    /// Upper bound (inclusive)
    pub high: f64,
}

impl MissingRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Missing-value specification for one variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSpec {
    /// Discrete sentinel values
    #[serde(default)]
    pub values: Vec<f64>,
    /// Inclusive sentinel range
    #[serde(default)]
    pub range: Option<MissingRange>,
}

/// Valid observations paired with their weights
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedObservations {
    pub values: Vec<f64>,
    pub weights: Vec<f64>,
}

impl WeightedObservations {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Total weight W
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }
}

impl MissingSpec {
    /// Only non-finite values are missing
    pub fn none() -> Self {
        Self::default()
    }

    /// Add discrete sentinel values
    pub fn with_values(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.values.extend(values);
        self
    }

    /// Set the inclusive sentinel range
    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.range = Some(MissingRange { low, high });
        self
    }

    pub fn is_missing(&self, value: f64) -> bool {
        !value.is_finite()
            || self.values.iter().any(|&v| v == value)
            || self.range.is_some_and(|r| r.contains(value))
    }

    /// Keep the valid values, preserving order
    pub fn valid_values(&self, data: &[f64]) -> Vec<f64> {
        data.iter().copied().filter(|&v| !self.is_missing(v)).collect()
    }

    /// Per-observation validity mask
    pub fn valid_mask(&self, data: &[f64]) -> Vec<bool> {
        data.iter().map(|&v| !self.is_missing(v)).collect()
    }

    /// Filter a weighted sample.
    ///
    /// Weights must be finite and non-negative; observations that are
    /// missing or carry zero weight are dropped. Without weights every
    /// observation weighs 1.
    pub fn filter_weighted(
        &self,
        data: &[f64],
        weights: Option<&[f64]>,
    ) -> Result<WeightedObservations> {
        let Some(weights) = weights else {
            let values = self.valid_values(data);
            let weights = vec![1.0; values.len()];
            return Ok(WeightedObservations { values, weights });
        };

        check_equal_lengths(&[data, weights])?;

        let mut out = WeightedObservations::default();
        for (index, (&value, &weight)) in data.iter().zip(weights).enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DataError::InvalidWeight {
                    index,
                    value: weight,
                });
            }
            if weight == 0.0 || self.is_missing(value) {
                continue;
            }
            out.values.push(value);
            out.weights.push(weight);
        }

        Ok(out)
    }
}
