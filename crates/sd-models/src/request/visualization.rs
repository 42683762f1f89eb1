//! Plot-ready point series attached to the diagnostic responses

use serde::{Deserialize, Serialize};

use sd_core::{special, stats};

/// A point in a scatter plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// Count scaled so the bar areas sum to one
    pub density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QqPoint {
    /// Standard normal quantile
    pub theoretical: f64,
    /// Ordered sample value
    pub sample: f64,
}

/// Plots of a regression's residuals against its fitted values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionPlots {
    pub residuals_vs_fitted: Vec<Point>,
    /// √|standardized residual| against fitted value
    pub scale_location: Vec<Point>,
}

/// Plots of a sample's distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPlots {
    pub histogram: Vec<HistogramBin>,
    pub qq_plot: Vec<QqPoint>,
}

impl RegressionPlots {
    /// Residuals are standardized by `scale`; a non-positive scale leaves
    /// them as they are
    pub fn new(fitted: &[f64], residuals: &[f64], scale: f64) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let residuals_vs_fitted = fitted
            .iter()
            .zip(residuals)
            .map(|(&x, &y)| Point { x, y })
            .collect();
        let scale_location = fitted
            .iter()
            .zip(residuals)
            .map(|(&x, &e)| Point {
                x,
                y: (e / scale).abs().sqrt(),
            })
            .collect();
        Self {
            residuals_vs_fitted,
            scale_location,
        }
    }
}

impl DistributionPlots {
    pub fn new(data: &[f64], bins: Option<usize>) -> Self {
        Self {
            histogram: histogram(data, bins.unwrap_or_else(|| sturges_bins(data.len()))),
            qq_plot: qq_plot(data),
        }
    }
}

/// Sturges' rule, ⌈log₂ n⌉ + 1
pub fn sturges_bins(n: usize) -> usize {
    if n < 2 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Equal-width histogram over the sample range; the last bin is closed.
/// The bin count is capped at the sample size.
pub fn histogram(data: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(min), Some(max)) = (stats::min(data), stats::max(data)) else {
        return Vec::new();
    };
    let bins = bins.clamp(1, data.len());
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for &v in data {
        let i = ((v - min) / width).floor() as usize;
        counts[i.min(bins - 1)] += 1;
    }

    let n = data.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            count,
            density: count as f64 / (n * width),
        })
        .collect()
}

/// Normal Q-Q points at plotting positions (i + 0.5)/n
pub fn qq_plot(data: &[f64]) -> Vec<QqPoint> {
    let n = data.len() as f64;
    stats::sorted(data)
        .into_iter()
        .enumerate()
        .map(|(i, sample)| QqPoint {
            theoretical: special::normal_quantile((i as f64 + 0.5) / n),
            sample,
        })
        .collect()
}
