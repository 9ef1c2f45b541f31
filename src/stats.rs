//! Numeric estimators shared by the calling pipeline
//!

use statrs::statistics::Statistics;

/// Scale factor making the median absolute deviation consistent with the
/// standard deviation under normality
pub const MAD_SCALE: f64 = 1.4826;

pub fn mean(values: &[f64]) -> f64 {
    Statistics::mean(values)
}

/// Median of an already-sorted slice
///
/// Even-length input returns the average of the two middle values.
///
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    assert!(n > 0, "Median of empty value set requested");
    if n % 2 == 0 {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    } else {
        sorted[n / 2]
    }
}

/// Median absolute deviation about `center` (unscaled)
///
pub fn mad(values: &[f64], center: f64) -> f64 {
    let mut devs = values.iter().map(|x| (x - center).abs()).collect::<Vec<_>>();
    devs.sort_by(f64::total_cmp);
    median_sorted(&devs)
}

/// Population standard deviation about a fixed center instead of the sample mean
///
pub fn stdev_around(values: &[f64], center: f64) -> f64 {
    assert!(!values.is_empty());
    let ss = values.iter().map(|x| (x - center) * (x - center)).sum::<f64>();
    (ss / values.len() as f64).sqrt()
}

/// Mean of `(value, weight)` pairs
///
/// Returns 0.0 for empty input.
///
pub fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let mut wsum = 0.0;
    let mut size = 0.0;
    for (value, weight) in pairs.iter() {
        wsum += value * weight;
        size += weight;
    }
    wsum / size
}

/// Pearson correlation of two equal-length vectors
///
/// NaN if either vector has zero variance.
///
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    let mean_a = mean(a);
    let mean_b = mean(b);
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a) * (x - mean_a);
        var_b += (y - mean_b) * (y - mean_b);
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_sorted() {
        assert_eq!(median_sorted(&[1.0, 2.0, 4.0]), 2.0);
        assert_eq!(median_sorted(&[1.0, 2.0, 4.0, 5.0]), 3.0);
        assert_eq!(median_sorted(&[7.0]), 7.0);
    }

    #[test]
    fn test_mad() {
        // deviations about 2: [1, 0, 2] -> sorted [0, 1, 2]
        assert_eq!(mad(&[1.0, 2.0, 4.0], 2.0), 1.0);
        assert_eq!(mad(&[5.0, 5.0, 5.0], 5.0), 0.0);
    }

    #[test]
    fn test_stdev_around() {
        approx::assert_ulps_eq!(
            stdev_around(&[0.5, 1.5], 1.0),
            0.5,
            max_ulps = 4
        );
        assert_eq!(stdev_around(&[1.0, 1.0, 1.0], 1.0), 0.0);
    }

    #[test]
    fn test_weighted_mean() {
        assert_eq!(weighted_mean(&[]), 0.0);
        approx::assert_ulps_eq!(
            weighted_mean(&[(1.0, 100.0), (2.0, 300.0)]),
            1.75,
            max_ulps = 4
        );
    }

    #[test]
    fn test_pearson_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        approx::assert_ulps_eq!(pearson_correlation(&a, &b), 1.0, max_ulps = 4);

        let c = [4.0, 3.0, 2.0, 1.0];
        approx::assert_ulps_eq!(pearson_correlation(&a, &c), -1.0, max_ulps = 4);

        // zero variance input has no defined correlation
        let flat = [1.0, 1.0, 1.0, 1.0];
        assert!(pearson_correlation(&a, &flat).is_nan());
    }
}
