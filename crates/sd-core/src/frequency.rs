//! Weighted frequency tables and percentiles
//!
//! A [`FrequencyTable`] collapses a (possibly weighted) sample into its
//! sorted distinct values with per-value weight, cumulative weight `cc` and
//! the weight strictly below each value `c`. Percentiles are read off the
//! table under one of several classical definitions.
//!
//! Ranks are 1-based: the order statistic x₍k₎ is the first distinct value
//! whose cumulative weight reaches k.
//!
//! # Examples
//!
//! ```
//! use sd_core::frequency::{FrequencyTable, PercentileMethod};
//!
//! let data: Vec<f64> = (1..=10).map(f64::from).collect();
//! let table = FrequencyTable::new(&data, None).unwrap();
//! assert_eq!(table.percentile(25.0, PercentileMethod::TukeyHinges).unwrap(), 3.0);
//! assert_eq!(table.percentile(50.0, PercentileMethod::TukeyHinges).unwrap(), 5.5);
//! assert_eq!(table.percentile(75.0, PercentileMethod::TukeyHinges).unwrap(), 8.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::{DataError, MissingSpec};
use crate::error::{CoreError, Result};


/// Tolerance for treating a computed rank as an integer
const RANK_TOLERANCE: f64 = 1e-9;

// ==================== Percentile Methods ====================

/// Percentile definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentileMethod {
    /// Weighted average at rank p·(W−1)+1
    #[default]
    WAverage,
    /// Weighted average at rank p·(W+1)
    HAverage,
    /// Observation closest to rank p·W
    Round,
    /// Empirical distribution function
    Empirical,
    /// Empirical distribution function with averaging
    AEmpirical,
    /// Tukey's hinges for the quartiles, WAverage otherwise
    TukeyHinges,
}

impl PercentileMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PercentileMethod::WAverage => "waverage",
            PercentileMethod::HAverage => "haverage",
            PercentileMethod::Round => "round",
            PercentileMethod::Empirical => "empirical",
            PercentileMethod::AEmpirical => "aempirical",
            PercentileMethod::TukeyHinges => "tukeyhinges",
        }
    }
}

impl fmt::Display for PercentileMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PercentileMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "waverage" => Ok(PercentileMethod::WAverage),
            "haverage" => Ok(PercentileMethod::HAverage),
            "round" => Ok(PercentileMethod::Round),
            "empirical" => Ok(PercentileMethod::Empirical),
            "aempirical" => Ok(PercentileMethod::AEmpirical),
            "tukeyhinges" => Ok(PercentileMethod::TukeyHinges),
            other => Err(CoreError::InvalidParameter(format!(
                "unknown percentile method '{}'",
                other
            ))),
        }
    }
}

// ==================== Frequency Table ====================

/// One row of a frequency report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRow {
    pub value: f64,
    pub weight: f64,
    pub percent: f64,
    pub cumulative_percent: f64,
}

/// Sorted distinct values with their weights
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    values: Vec<f64>,
    weights: Vec<f64>,
    cumulative: Vec<f64>,
    below: Vec<f64>,
    total_weight: f64,
}

impl FrequencyTable {
    /// Build a table, treating only non-finite values as missing
    pub fn new(data: &[f64], weights: Option<&[f64]>) -> Result<Self> {
        Self::with_missing(data, weights, &MissingSpec::none())
    }

    /// Build a table after dropping values declared missing
    pub fn with_missing(
        data: &[f64],
        weights: Option<&[f64]>,
        missing: &MissingSpec,
    ) -> Result<Self> {
        let observations = missing.filter_weighted(data, weights)?;
        if observations.is_empty() {
            return Err(DataError::EmptyInput("no valid observations").into());
        }

        let mut pairs: Vec<(f64, f64)> = observations
            .values
            .into_iter()
            .zip(observations.weights)
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut values: Vec<f64> = Vec::new();
        let mut value_weights: Vec<f64> = Vec::new();
        for (value, weight) in pairs {
            match values.last() {
                Some(&last) if last == value => {
                    if let Some(w) = value_weights.last_mut() {
                        *w += weight;
                    }
                }
                _ => {
                    values.push(value);
                    value_weights.push(weight);
                }
            }
        }

        let mut cumulative = Vec::with_capacity(values.len());
        let mut below = Vec::with_capacity(values.len());
        let mut running = 0.0;
        for &w in &value_weights {
            below.push(running);
            running += w;
            cumulative.push(running);
        }

        Ok(Self {
            values,
            weights: value_weights,
            cumulative,
            below,
            total_weight: running,
        })
    }

    /// Sorted distinct values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Weight of each distinct value
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Cumulative weight up to and including each value (`cc`)
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Cumulative weight strictly below each value (`c`)
    pub fn below(&self) -> &[f64] {
        &self.below
    }

    /// Total weight W
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Median under the default method
    pub fn median(&self) -> f64 {
        self.interpolate(0.5 * (self.total_weight - 1.0) + 1.0)
    }

    /// Value with the largest weight; the smallest such value on ties
    pub fn mode(&self) -> f64 {
        let mut best = 0;
        for (i, &w) in self.weights.iter().enumerate() {
            if w > self.weights[best] {
                best = i;
            }
        }
        self.values[best]
    }

    /// Percent and cumulative percent for each distinct value
    pub fn rows(&self) -> Vec<FrequencyRow> {
        self.values
            .iter()
            .zip(&self.weights)
            .zip(&self.cumulative)
            .map(|((&value, &weight), &cc)| FrequencyRow {
                value,
                weight,
                percent: 100.0 * weight / self.total_weight,
                cumulative_percent: 100.0 * cc / self.total_weight,
            })
            .collect()
    }

    /// Percentile `p` (0–100) under the given method
    pub fn percentile(&self, p: f64, method: PercentileMethod) -> Result<f64> {
        if !(0.0..=100.0).contains(&p) {
            return Err(CoreError::InvalidParameter(format!(
                "percentile must be within [0, 100], got {}",
                p
            )));
        }

        let fraction = p / 100.0;
        let w = self.total_weight;

        let value = match method {
            PercentileMethod::WAverage => self.interpolate(fraction * (w - 1.0) + 1.0),
            PercentileMethod::HAverage => self.interpolate(fraction * (w + 1.0)),
            PercentileMethod::Round => self.value_at_rank((fraction * w + 0.5).floor()),
            PercentileMethod::Empirical => {
                let t = fraction * w;
                match integral(t) {
                    Some(k) => self.value_at_rank(k),
                    None => self.value_at_rank(t.floor() + 1.0),
                }
            }
            PercentileMethod::AEmpirical => {
                let t = fraction * w;
                match integral(t) {
                    Some(k) => 0.5 * (self.value_at_rank(k) + self.value_at_rank(k + 1.0)),
                    None => self.value_at_rank(t.floor() + 1.0),
                }
            }
            PercentileMethod::TukeyHinges => match self.hinge_position(p) {
                Some(position) => self.interpolate(position),
                None => self.percentile(p, PercentileMethod::WAverage)?,
            },
        };

        Ok(value)
    }

    /// Several percentiles under one method
    pub fn percentiles(&self, ps: &[f64], method: PercentileMethod) -> Result<Vec<f64>> {
        ps.iter().map(|&p| self.percentile(p, method)).collect()
    }

    /// Hinge depth for the 25th/50th/75th percentile, `None` for any other
    fn hinge_position(&self, p: f64) -> Option<f64> {
        let w = self.total_weight;
        let d = ((w + 3.0) / 2.0).floor() / 2.0;

        if (p - 25.0).abs() < RANK_TOLERANCE {
            Some(d)
        } else if (p - 50.0).abs() < RANK_TOLERANCE {
            if integral(w).is_some_and(|k| k as u64 % 2 == 0) {
                Some(w / 2.0 + 0.5)
            } else {
                Some((w + 1.0) / 2.0)
            }
        } else if (p - 75.0).abs() < RANK_TOLERANCE {
            Some(w + 1.0 - d)
        } else {
            None
        }
    }

    /// Linear interpolation between the order statistics around `position`
    fn interpolate(&self, position: f64) -> f64 {
        let position = position.clamp(1.0, self.total_weight.max(1.0));
        let k = position.floor();
        let g = position - k;

        let lower = self.value_at_rank(k);
        if g <= RANK_TOLERANCE {
            return lower;
        }
        let upper = self.value_at_rank(k + 1.0);
        lower + g * (upper - lower)
    }

    /// Order statistic x₍k₎, clamped to the sample range
    fn value_at_rank(&self, rank: f64) -> f64 {
        let rank = rank.max(1.0);
        let index = self
            .cumulative
            .iter()
            .position(|&cc| cc >= rank - RANK_TOLERANCE)
            .unwrap_or(self.values.len() - 1);
        self.values[index]
    }
}

/// `Some(t)` rounded when `t` is integral within tolerance
fn integral(t: f64) -> Option<f64> {
    let rounded = t.round();
    ((t - rounded).abs() < RANK_TOLERANCE).then_some(rounded)
}
