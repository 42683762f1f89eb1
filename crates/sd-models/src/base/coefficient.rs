//! Coefficient definition

use serde::{Deserialize, Serialize};

/// Coefficient estimate with statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coefficient {
    /// Coefficient name
    pub name: String,
    /// Display label from the variable metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Coefficient estimate
    pub estimate: f64,
    /// Standard error
    pub std_error: Option<f64>,
    /// t-statistic
    pub t_stat: Option<f64>,
    /// Two-sided p-value
    pub p_value: Option<f64>,
    /// Is this the intercept?
    pub is_intercept: bool,
}

impl Coefficient {
    /// Create a new coefficient
    pub fn new(name: impl Into<String>, estimate: f64) -> Self {
        Self {
            name: name.into(),
            label: None,
            estimate,
            std_error: None,
            t_stat: None,
            p_value: None,
            is_intercept: false,
        }
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set standard error
    pub fn with_std_error(mut self, se: f64) -> Self {
        self.std_error = Some(se);
        self
    }

    /// Set t-statistic
    pub fn with_t_stat(mut self, t: f64) -> Self {
        self.t_stat = Some(t);
        self
    }

    /// Set p-value
    pub fn with_p_value(mut self, p: f64) -> Self {
        self.p_value = Some(p);
        self
    }

    /// Mark as intercept
    pub fn as_intercept(mut self) -> Self {
        self.is_intercept = true;
        self
    }

    /// Label when present, name otherwise
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}
