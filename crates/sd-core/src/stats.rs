//! Descriptive statistics shared by every test
//!
//! Two moment-estimator families live here and must not be mixed:
//! population (biased) skewness/kurtosis feed the Jarque-Bera statistic,
//! while the bias-corrected sample versions are for reporting.

/// Arithmetic mean
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom
pub fn variance_ddof(data: &[f64], ddof: usize) -> Option<f64> {
    let n = data.len();
    if n <= ddof {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|&x| (x - m).powi(2)).sum();
    Some(ss / (n - ddof) as f64)
}

/// Sample variance (n − 1 denominator)
pub fn variance(data: &[f64]) -> Option<f64> {
    variance_ddof(data, 1)
}

/// Sample standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

pub fn min(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::min)
}

pub fn max(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::max)
}

/// Sorted copy, NaN-safe
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut values = data.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

/// Second, third and fourth central moments (population)
fn central_moments(data: &[f64]) -> Option<(f64, f64, f64)> {
    let n = data.len() as f64;
    let m = mean(data)?;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &x in data {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Some((m2 / n, m3 / n, m4 / n))
}

/// Population skewness g₁ = m₃ / m₂^(3/2)
pub fn skewness(data: &[f64]) -> Option<f64> {
    let (m2, m3, _) = central_moments(data)?;
    if m2 <= 0.0 {
        return None;
    }
    Some(m3 / m2.powf(1.5))
}

/// Population kurtosis b₂ = m₄ / m₂² (not excess; normal = 3)
pub fn kurtosis(data: &[f64]) -> Option<f64> {
    let (m2, _, m4) = central_moments(data)?;
    if m2 <= 0.0 {
        return None;
    }
    Some(m4 / (m2 * m2))
}

/// Bias-corrected sample skewness G₁ (needs n ≥ 3)
pub fn sample_skewness(data: &[f64]) -> Option<f64> {
    let n = data.len() as f64;
    if data.len() < 3 {
        return None;
    }
    let g1 = skewness(data)?;
    Some(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Bias-corrected sample excess kurtosis G₂ (needs n ≥ 4)
pub fn sample_excess_kurtosis(data: &[f64]) -> Option<f64> {
    let n = data.len() as f64;
    if data.len() < 4 {
        return None;
    }
    let g2 = kurtosis(data)? - 3.0;
    Some(((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_basic_statistics() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(mean(&data), Some(3.0));
        assert_abs_diff_eq!(std_dev(&data).unwrap(), 1.58113883, epsilon = 1e-6);
        assert_abs_diff_eq!(variance_ddof(&data, 0).unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(min(&data), Some(1.0));
        assert_eq!(max(&data), Some(5.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[1.0]), None);
    }

    #[test]
    fn test_symmetric_data_has_zero_skew() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_abs_diff_eq!(skewness(&data).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sample_skewness(&data).unwrap(), 0.0, epsilon = 1e-12);
        // Uniform-like data is platykurtic
        assert_abs_diff_eq!(kurtosis(&data).unwrap(), 1.7, epsilon = 1e-12);
        assert_abs_diff_eq!(sample_excess_kurtosis(&data).unwrap(), -1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_estimator_families_differ() {
        let data = [1.0, 1.0, 2.0, 2.0, 3.0, 9.0];
        let g1 = skewness(&data).unwrap();
        let big_g1 = sample_skewness(&data).unwrap();
        assert!(g1 > 0.0);
        assert!(big_g1 > g1);
    }

    #[test]
    fn test_zero_variance() {
        let data = [2.0, 2.0, 2.0, 2.0];
        assert_eq!(skewness(&data), None);
        assert_eq!(kurtosis(&data), None);
        assert_eq!(sample_excess_kurtosis(&data), None);
    }

    #[test]
    fn test_sorted_handles_nan() {
        let data = [3.0, f64::NAN, 1.0, 2.0];
        let s = sorted(&data);
        assert_eq!(&s[..3], &[1.0, 2.0, 3.0]);
        assert!(s[3].is_nan());
    }
}
