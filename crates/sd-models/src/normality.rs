//! Normality tests for residuals or any sample
//!
//! - **Kolmogorov-Smirnov** against a normal distribution with the sample's
//!   mean and standard deviation, with the asymptotic Kolmogorov p-value.
//! - **Jarque-Bera** from the population (biased) skewness and kurtosis.
//! - **Shapiro-Wilk** (optional) using Royston's approximation.
//!
//! The bias-corrected sample skewness and excess kurtosis in
//! [`Descriptives`] are reported alongside but never enter a statistic.
//!
//! # References
//!
//! - Jarque & Bera (1987). "A test for normality of observations and
//!   regression residuals". International Statistical Review, 55(2).
//! - Royston (1992). "Approximating the Shapiro-Wilk W-test for
//!   non-normality". Statistics and Computing, 2, 117–119.
//! - Royston (1995). "Remark AS R94". Applied Statistics, 44(4), 547–551.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use sd_core::data::DataError;
use sd_core::{special, stats};

use crate::base::{ModelError, Result, TestResult, TestStatistic, aggregate_verdict};

#[cfg(test)]
mod tests;

pub const KOLMOGOROV_SMIRNOV: &str = "Kolmogorov-Smirnov Test";
pub const JARQUE_BERA: &str = "Jarque-Bera Test";
pub const SHAPIRO_WILK: &str = "Shapiro-Wilk Test";

const KS_MAX_TERMS: usize = 100;
const KS_TERM_TOLERANCE: f64 = 1e-10;

/// Largest sample the Royston approximation covers
pub const SHAPIRO_WILK_MAX_OBS: usize = 5000;

// ==================== Configuration ====================

/// Which normality tests to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalityConfig {
    pub kolmogorov_smirnov: bool,
    pub jarque_bera: bool,
    pub shapiro_wilk: bool,
    /// Histogram bin count; Sturges' rule when absent
    pub histogram_bins: Option<usize>,
}

impl Default for NormalityConfig {
    fn default() -> Self {
        Self {
            kolmogorov_smirnov: true,
            jarque_bera: true,
            shapiro_wilk: false,
            histogram_bins: None,
        }
    }
}

// ==================== Descriptives ====================

/// Bias-corrected shape statistics, for reporting only
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptives {
    /// Sample skewness G₁
    pub skewness: Option<f64>,
    /// Sample excess kurtosis G₂
    pub excess_kurtosis: Option<f64>,
}

impl Descriptives {
    pub fn from_data(data: &[f64]) -> Self {
        Self {
            skewness: stats::sample_skewness(data),
            excess_kurtosis: stats::sample_excess_kurtosis(data),
        }
    }
}

// ==================== Kolmogorov-Smirnov ====================

/// Kolmogorov-Smirnov test against N(x̄, s²).
///
/// The statistic is D; its p-value is the Kolmogorov upper tail at
/// λ = (√n + 0.12 + 0.11/√n)·D.
pub fn kolmogorov_smirnov(data: &[f64]) -> Result<TestStatistic> {
    let n = data.len();
    check_sample(data, 3)?;

    let mean = stats::mean(data).ok_or(DataError::EmptyInput("sample"))?;
    let sd = stats::std_dev(data).ok_or(DataError::EmptyInput("sample"))?;
    if sd <= 0.0 {
        return Err(ModelError::ZeroVariance {
            context: "Kolmogorov-Smirnov sample",
        });
    }

    let nf = n as f64;
    let mut d = 0.0_f64;
    for (i, &x) in stats::sorted(data).iter().enumerate() {
        let cdf = special::normal_cdf((x - mean) / sd);
        let above = (i + 1) as f64 / nf - cdf;
        let below = cdf - i as f64 / nf;
        d = d.max(above.abs()).max(below.abs());
    }

    let sqrt_n = nf.sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    let p_value = kolmogorov_p_value(lambda);

    log::debug!("Kolmogorov-Smirnov: D = {:.6}, λ = {:.6}, p = {:.6}", d, lambda, p_value);
    Ok(TestStatistic::new(d, None, p_value))
}

/// Upper tail Q(λ) = 2 Σ (−1)^(k−1) exp(−2k²λ²).
///
/// Returns 1 when the series has not converged within its term budget,
/// which only happens for small λ.
pub fn kolmogorov_p_value(lambda: f64) -> f64 {
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=KS_MAX_TERMS {
        let k = k as f64;
        let term = 2.0 * sign * (-2.0 * k * k * lambda * lambda).exp();
        sum += term;
        if term.abs() < KS_TERM_TOLERANCE {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
    }
    1.0
}

// ==================== Jarque-Bera ====================

/// Jarque-Bera test, JB = n/6 · (S² + (K − 3)²/4) against chi-square(2)
pub fn jarque_bera(data: &[f64]) -> Result<TestStatistic> {
    let n = data.len();
    check_sample(data, 4)?;

    let zero_variance = || ModelError::ZeroVariance {
        context: "Jarque-Bera sample",
    };
    let skewness = stats::skewness(data).ok_or_else(zero_variance)?;
    let kurtosis = stats::kurtosis(data).ok_or_else(zero_variance)?;

    let statistic =
        n as f64 / 6.0 * (skewness * skewness + (kurtosis - 3.0).powi(2) / 4.0);
    let df = 2.0;
    let p_value = special::chi_square_sf(statistic, df);

    log::debug!(
        "Jarque-Bera: JB = {:.6}, S = {:.6}, K = {:.6}, p = {:.6}",
        statistic,
        skewness,
        kurtosis,
        p_value
    );
    Ok(TestStatistic::new(statistic, Some(df), p_value))
}

// ==================== Shapiro-Wilk ====================

// Royston polynomial coefficients (AS R94)
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

/// Shapiro-Wilk W test for 3 ≤ n ≤ 5000
pub fn shapiro_wilk(data: &[f64]) -> Result<TestStatistic> {
    let n = data.len();
    check_sample(data, 3)?;
    if n > SHAPIRO_WILK_MAX_OBS {
        return Err(ModelError::InvalidConfig {
            message: format!(
                "Shapiro-Wilk supports at most {} observations, got {}",
                SHAPIRO_WILK_MAX_OBS, n
            ),
        });
    }

    let x = stats::sorted(data);
    let mean = stats::mean(&x).ok_or(DataError::EmptyInput("sample"))?;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    if ss <= 0.0 {
        return Err(ModelError::ZeroVariance {
            context: "Shapiro-Wilk sample",
        });
    }

    if n == 3 {
        let w = (0.5 * (x[2] - x[0]).powi(2) / ss).clamp(0.75, 1.0);
        let p_value = (6.0 / PI * (w.sqrt().asin() - PI / 3.0)).clamp(0.0, 1.0);
        return Ok(TestStatistic::new(w, None, p_value));
    }

    let a = sw_coefficients(n)?;
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / ss).min(1.0);
    let p_value = sw_p_value(w, n).clamp(0.0, 1.0);

    log::debug!("Shapiro-Wilk: W = {:.6}, p = {:.6}", w, p_value);
    Ok(TestStatistic::new(w, None, p_value))
}

/// Polynomial c₀ + c₁x + c₂x² + ... by Horner's rule
fn sw_poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Antisymmetric weights for the lower half of the order statistics
fn sw_coefficients(n: usize) -> Result<Vec<f64>> {
    let half = n / 2;
    let nf = n as f64;

    // Blom scores for the expected normal order statistics
    let m: Vec<f64> = (0..half)
        .map(|i| special::normal_quantile((i as f64 + 1.0 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let a1 = sw_poly(&SW_C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; half];
    a[0] = a1;

    let (corrected, fac_sq, one_minus) = if n > 5 {
        let a2 = -m[1] / ssumm2 + sw_poly(&SW_C2, rsn);
        a[1] = a2;
        (
            2,
            summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1],
            1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2,
        )
    } else {
        (1, summ2 - 2.0 * m[0] * m[0], 1.0 - 2.0 * a1 * a1)
    };

    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return Err(ModelError::NumericalError {
            message: "non-positive normalization".to_string(),
            operation: "shapiro_wilk coefficients".to_string(),
        });
    }
    let fac = (fac_sq / one_minus).sqrt();
    for i in corrected..half {
        a[i] = -m[i] / fac;
    }

    Ok(a)
}

/// Royston's normalizing transformation of 1 − W
fn sw_p_value(w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let (z, mu, sigma) = if n <= 11 {
        let gamma = sw_poly(&SW_G, nf);
        if y >= gamma {
            return 0.0;
        }
        (-(gamma - y).ln(), sw_poly(&SW_C3, nf), sw_poly(&SW_C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (y, sw_poly(&SW_C5, ln_n), sw_poly(&SW_C6, ln_n).exp())
    };

    1.0 - special::normal_cdf((z - mu) / sigma)
}

fn check_sample(data: &[f64], required: usize) -> Result<()> {
    if data.len() < required {
        return Err(ModelError::InsufficientObservations {
            required,
            actual: data.len(),
        });
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(DataError::NonFinite("sample").into());
    }
    Ok(())
}

// ==================== Suite ====================

/// Results of the enabled normality tests
#[derive(Debug, Clone, PartialEq)]
pub struct NormalitySuite {
    pub kolmogorov_smirnov: Option<TestResult>,
    pub jarque_bera: Option<TestResult>,
    pub shapiro_wilk: Option<TestResult>,
    pub descriptives: Descriptives,
    /// Normal unless a completed test rejects
    pub is_normal: bool,
}

impl NormalitySuite {
    /// Every enabled test failed with the same error
    pub fn failed(error: &ModelError, config: &NormalityConfig) -> Self {
        let fail = |enabled: bool, name: &str| {
            enabled.then(|| TestResult::failed(name, error.clone()))
        };
        Self {
            kolmogorov_smirnov: fail(config.kolmogorov_smirnov, KOLMOGOROV_SMIRNOV),
            jarque_bera: fail(config.jarque_bera, JARQUE_BERA),
            shapiro_wilk: fail(config.shapiro_wilk, SHAPIRO_WILK),
            descriptives: Descriptives::default(),
            is_normal: true,
        }
    }

    /// Results of the tests that ran
    pub fn results(&self) -> impl Iterator<Item = &TestResult> {
        [&self.kolmogorov_smirnov, &self.jarque_bera, &self.shapiro_wilk]
            .into_iter()
            .flatten()
    }
}

/// Run the configured tests on a sample
pub fn normality_tests(data: &[f64], config: &NormalityConfig) -> NormalitySuite {
    let kolmogorov_smirnov = config
        .kolmogorov_smirnov
        .then(|| TestResult::from_result(KOLMOGOROV_SMIRNOV, kolmogorov_smirnov(data)));
    let jarque_bera = config
        .jarque_bera
        .then(|| TestResult::from_result(JARQUE_BERA, jarque_bera(data)));
    let shapiro_wilk = config
        .shapiro_wilk
        .then(|| TestResult::from_result(SHAPIRO_WILK, shapiro_wilk(data)));

    let is_normal = aggregate_verdict(
        [&kolmogorov_smirnov, &jarque_bera, &shapiro_wilk]
            .into_iter()
            .flatten(),
    );

    NormalitySuite {
        kolmogorov_smirnov,
        jarque_bera,
        shapiro_wilk,
        descriptives: Descriptives::from_data(data),
        is_normal,
    }
}
