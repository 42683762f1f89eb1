//! Core types shared by the statistical procedures
//!
//! Every hypothesis test produces a [`TestResult`]: a name plus a tagged
//! [`TestOutcome`]. A completed test carries its statistic, degrees of
//! freedom and p-value; a failed one carries the [`ModelError`] that stopped
//! it. Nulls only appear once a result is turned into its wire
//! [`TestRecord`].

use serde::{Deserialize, Serialize};

// Re-export core types
pub use coefficient::Coefficient;
pub use statistics::ModelStatistics;
pub use statistics::ResidualStatistics;
pub use summary::ModelSummary;

pub use crate::error::ModelError;

pub mod coefficient;
pub mod statistics;
pub mod summary;

#[cfg(test)]
mod tests;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Fixed significance threshold for every test decision
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

// ==================== Test Outcomes ====================

/// Statistic of a completed test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStatistic {
    pub statistic: f64,
    /// Degrees of freedom, when the reference distribution has one
    pub df: Option<f64>,
    pub p_value: f64,
}

impl TestStatistic {
    pub fn new(statistic: f64, df: Option<f64>, p_value: f64) -> Self {
        Self {
            statistic,
            df,
            p_value,
        }
    }

    /// Whether the null hypothesis is kept at [`SIGNIFICANCE_LEVEL`]
    pub fn null_holds(&self) -> bool {
        self.p_value > SIGNIFICANCE_LEVEL
    }
}

/// What happened when a test ran
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    Completed(TestStatistic),
    Failed(ModelError),
}

/// Named outcome of one hypothesis test
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub outcome: TestOutcome,
}

impl TestResult {
    pub fn completed(name: impl Into<String>, statistic: TestStatistic) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Completed(statistic),
        }
    }

    pub fn failed(name: impl Into<String>, error: ModelError) -> Self {
        let name = name.into();
        log::warn!("{} could not be completed: {}", name, error);
        Self {
            name,
            outcome: TestOutcome::Failed(error),
        }
    }

    /// Record a computation, demoting non-finite statistics to failures
    pub fn from_result(name: impl Into<String>, result: Result<TestStatistic>) -> Self {
        match result {
            Ok(stat) if stat.statistic.is_finite() && stat.p_value.is_finite() => {
                Self::completed(name, stat)
            }
            Ok(stat) => Self::failed(
                name,
                ModelError::NumericalError {
                    message: format!(
                        "non-finite result (statistic {}, p-value {})",
                        stat.statistic, stat.p_value
                    ),
                    operation: "test statistic".to_string(),
                },
            ),
            Err(err) => Self::failed(name, err),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, TestOutcome::Completed(_))
    }

    pub fn test_statistic(&self) -> Option<&TestStatistic> {
        match &self.outcome {
            TestOutcome::Completed(stat) => Some(stat),
            TestOutcome::Failed(_) => None,
        }
    }

    pub fn statistic(&self) -> Option<f64> {
        self.test_statistic().map(|s| s.statistic)
    }

    pub fn df(&self) -> Option<f64> {
        self.test_statistic().and_then(|s| s.df)
    }

    pub fn p_value(&self) -> Option<f64> {
        self.test_statistic().map(|s| s.p_value)
    }

    pub fn error(&self) -> Option<&ModelError> {
        match &self.outcome {
            TestOutcome::Completed(_) => None,
            TestOutcome::Failed(err) => Some(err),
        }
    }

    /// Decision flag; a failed test keeps the null hypothesis
    pub fn null_holds(&self) -> bool {
        self.test_statistic().is_none_or(TestStatistic::null_holds)
    }

    /// Whether the test completed and rejected the null hypothesis
    pub fn rejects_null(&self) -> bool {
        !self.null_holds()
    }

    /// Wire record with the decision keyed for `hypothesis`
    pub fn to_record(&self, hypothesis: Hypothesis) -> TestRecord {
        let verdict = self.null_holds();
        TestRecord {
            test_name: self.name.clone(),
            statistic: self.statistic(),
            df: self.df(),
            p_value: self.p_value(),
            verdict: match hypothesis {
                Hypothesis::Homoscedasticity => Verdict::Homoscedastic(verdict),
                Hypothesis::Normality => Verdict::Normal(verdict),
            },
            critical_value: SIGNIFICANCE_LEVEL,
            error: self.error().map(ToString::to_string),
        }
    }
}

/// Best-effort suite verdict: the null holds unless a completed test rejects it
pub fn aggregate_verdict<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> bool {
    !results.into_iter().any(TestResult::rejects_null)
}

// ==================== Wire Records ====================

/// Null hypothesis under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hypothesis {
    Homoscedasticity,
    Normality,
}

/// Decision flag, serialized under the hypothesis-specific key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "isHomoscedastic")]
    Homoscedastic(bool),
    #[serde(rename = "isNormal")]
    Normal(bool),
}

impl Verdict {
    pub fn holds(&self) -> bool {
        match *self {
            Verdict::Homoscedastic(v) | Verdict::Normal(v) => v,
        }
    }
}

/// Serialized form of a [`TestResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub test_name: String,
    pub statistic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub df: Option<f64>,
    pub p_value: Option<f64>,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub critical_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
