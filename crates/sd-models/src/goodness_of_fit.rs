//! Chi-square goodness-of-fit test for a single categorical variable
//!
//! Categories are either the distinct observed values or a contiguous
//! integer range. Expected counts are equal across categories or
//! proportional to caller-supplied weights.
//!
//! Degenerate inputs (no valid observations, a single category) are not
//! errors: the result carries `has_insufficient_data` and null statistics.

use serde::{Deserialize, Serialize};

use sd_core::CoreError;
use sd_core::data::{MissingSpec, sorted_unique};
use sd_core::special;

use crate::base::{ModelError, Result};

#[cfg(test)]
mod tests;

/// Expected counts below this make the chi-square approximation doubtful
pub const MIN_EXPECTED_COUNT: f64 = 5.0;

/// Widest integer range accepted by [`ExpectedRange::Range`]
pub const MAX_RANGE_CATEGORIES: usize = 1_000_000;

// ==================== Configuration ====================

/// Where the categories come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpectedRange {
    /// Distinct observed values
    #[default]
    FromData,
    /// Every integer in `lower..=upper`; values are floored and those
    /// outside the range excluded
    Range { lower: i64, upper: i64 },
}

/// How expected counts are distributed over the categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpectedValues {
    #[default]
    Equal,
    /// Relative weights, one per category in ascending category order
    Values(Vec<f64>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoodnessOfFitConfig {
    pub expected_range: ExpectedRange,
    pub expected_values: ExpectedValues,
}

impl GoodnessOfFitConfig {
    pub fn with_range(mut self, lower: i64, upper: i64) -> Self {
        self.expected_range = ExpectedRange::Range { lower, upper };
        self
    }

    pub fn with_expected_values(mut self, values: Vec<f64>) -> Self {
        self.expected_values = ExpectedValues::Values(values);
        self
    }

    /// Check the parts of the configuration that do not depend on the data
    pub fn validate(&self) -> Result<()> {
        if let ExpectedRange::Range { lower, upper } = self.expected_range {
            if lower > upper {
                return Err(ModelError::InvalidConfig {
                    message: format!("range lower bound {} exceeds upper bound {}", lower, upper),
                });
            }
            let width = upper
                .checked_sub(lower)
                .and_then(|d| d.checked_add(1))
                .and_then(|w| usize::try_from(w).ok());
            if !width.is_some_and(|w| w <= MAX_RANGE_CATEGORIES) {
                return Err(ModelError::InvalidConfig {
                    message: format!(
                        "range {}..={} spans more than {} categories",
                        lower, upper, MAX_RANGE_CATEGORIES
                    ),
                });
            }
        }
        if let ExpectedValues::Values(values) = &self.expected_values {
            if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(CoreError::InvalidParameter(format!(
                    "expected values must be positive, got {}",
                    bad
                ))
                .into());
            }
        }
        Ok(())
    }
}

// ==================== Result Types ====================

/// Observed and expected count of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFrequency {
    pub category: f64,
    pub observed: f64,
    pub expected: f64,
    /// Observed minus expected
    pub residual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsufficientType {
    Empty,
    SingleCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareStatistics {
    #[serde(rename = "ChiSquare")]
    pub chi_square: Option<f64>,
    #[serde(rename = "DF")]
    pub df: Option<usize>,
    #[serde(rename = "PValue")]
    pub p_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodnessOfFitMetadata {
    pub has_insufficient_data: bool,
    pub insufficient_type: Vec<InsufficientType>,
    /// Categories with an expected count below five
    pub cells_below_five: usize,
    pub min_expected: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodnessOfFit {
    pub frequencies: Vec<CategoryFrequency>,
    pub test_statistics: ChiSquareStatistics,
    pub metadata: GoodnessOfFitMetadata,
}

impl GoodnessOfFit {
    /// Number of valid observations counted
    pub fn n(&self) -> f64 {
        self.frequencies.iter().map(|f| f.observed).sum()
    }

    pub fn category_count(&self) -> usize {
        self.frequencies.len()
    }
}

// ==================== Computation ====================

/// Categories in ascending order with their observed counts
fn observed_counts(valid: &[f64], range: ExpectedRange) -> (Vec<f64>, Vec<f64>) {
    match range {
        ExpectedRange::FromData => {
            let categories = sorted_unique(valid);
            let mut counts = vec![0.0; categories.len()];
            for v in valid {
                if let Ok(i) = categories.binary_search_by(|c| c.total_cmp(v)) {
                    counts[i] += 1.0;
                }
            }
            (categories, counts)
        }
        ExpectedRange::Range { lower, upper } => {
            let categories: Vec<f64> = (lower..=upper).map(|c| c as f64).collect();
            let mut counts = vec![0.0; categories.len()];
            for v in valid {
                let floored = v.floor();
                if floored >= lower as f64 && floored <= upper as f64 {
                    counts[(floored - lower as f64) as usize] += 1.0;
                }
            }
            (categories, counts)
        }
    }
}

/// Expected count per category, summing to `n`
fn expected_counts(n: f64, k: usize, values: &ExpectedValues) -> Result<Vec<f64>> {
    match values {
        ExpectedValues::Equal => Ok(vec![n / k as f64; k]),
        ExpectedValues::Values(weights) => {
            if weights.len() != k {
                return Err(CoreError::InvalidParameter(format!(
                    "expected {} expected values, one per category, got {}",
                    k,
                    weights.len()
                ))
                .into());
            }
            let total: f64 = weights.iter().sum();
            Ok(weights.iter().map(|w| w / total * n).collect())
        }
    }
}

/// Chi-square goodness-of-fit test of `data` after missing-value filtering
pub fn chi_square_goodness_of_fit(
    data: &[f64],
    missing: &MissingSpec,
    config: &GoodnessOfFitConfig,
) -> Result<GoodnessOfFit> {
    config.validate()?;

    let valid = missing.valid_values(data);
    let (categories, observed) = observed_counts(&valid, config.expected_range);
    let n: f64 = observed.iter().sum();
    let k = categories.len();

    let mut insufficient = Vec::new();
    if n == 0.0 {
        insufficient.push(InsufficientType::Empty);
    }
    if k == 1 {
        insufficient.push(InsufficientType::SingleCategory);
    }

    // With one category or no observations every weighting yields N/k
    let expected = if insufficient.is_empty() {
        expected_counts(n, k, &config.expected_values)?
    } else {
        vec![if k > 0 { n / k as f64 } else { 0.0 }; k]
    };

    let frequencies: Vec<CategoryFrequency> = categories
        .iter()
        .zip(&observed)
        .zip(&expected)
        .map(|((&category, &observed), &expected)| CategoryFrequency {
            category,
            observed,
            expected,
            residual: observed - expected,
        })
        .collect();

    let metadata = GoodnessOfFitMetadata {
        has_insufficient_data: !insufficient.is_empty(),
        insufficient_type: insufficient,
        cells_below_five: expected.iter().filter(|&&e| e < MIN_EXPECTED_COUNT).count(),
        min_expected: expected.iter().copied().reduce(f64::min),
    };

    if metadata.has_insufficient_data {
        log::debug!("goodness of fit: insufficient data {:?}", metadata.insufficient_type);
        return Ok(GoodnessOfFit {
            frequencies,
            test_statistics: ChiSquareStatistics::default(),
            metadata,
        });
    }

    let chi_square = chi_square_statistic(&frequencies, config);
    let df = k - 1;
    let p_value = special::chi_square_sf(chi_square, df as f64);

    log::debug!(
        "goodness of fit: χ² = {:.6}, df = {}, p = {:.6}, N = {}",
        chi_square,
        df,
        p_value,
        n
    );

    Ok(GoodnessOfFit {
        frequencies,
        test_statistics: ChiSquareStatistics {
            chi_square: Some(chi_square),
            df: Some(df),
            p_value: Some(p_value),
        },
        metadata,
    })
}

fn chi_square_statistic(frequencies: &[CategoryFrequency], config: &GoodnessOfFitConfig) -> f64 {
    let term = |f: &CategoryFrequency| f.residual * f.residual / f.expected;

    match (config.expected_range, &config.expected_values) {
        // Empty categories in range all contribute (0 − E)²/E = E
        (ExpectedRange::Range { .. }, ExpectedValues::Equal) => {
            let realized = frequencies.iter().filter(|f| f.observed > 0.0);
            let unobserved = frequencies.iter().filter(|f| f.observed == 0.0).count();
            let expected = frequencies.first().map_or(0.0, |f| f.expected);
            realized.map(term).sum::<f64>() + unobserved as f64 * expected
        }
        _ => frequencies.iter().map(term).sum(),
    }
}
