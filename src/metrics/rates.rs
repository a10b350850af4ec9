//! Detection-rate and precision helpers.
//!
//! Unlike a classic precision/recall report these return `NaN` when the
//! denominator is zero, so an empty ground truth reads as "undefined" rather
//! than as a perfect or a failing score.

/// Calculate the detection rate (recall against all ground truth).
///
/// Detection rate = TP / total ground truth
///
/// # Examples
///
/// ```
/// # use roi_eval::metrics::rates::detection_rate;
/// assert_eq!(detection_rate(8, 10), 0.8);
/// assert!(detection_rate(0, 0).is_nan());
/// ```
#[must_use]
pub fn detection_rate(true_positives: usize, total_ground_truth: usize) -> f64 {
    if total_ground_truth == 0 {
        return f64::NAN;
    }

    #[allow(clippy::cast_precision_loss)]
    let rate = (true_positives as f64) / (total_ground_truth as f64);
    rate
}

/// Calculate precision from confusion matrix values
///
/// Precision = TP / (TP + FP)
///
/// # Examples
///
/// ```
/// # use roi_eval::metrics::rates::precision;
/// assert_eq!(precision(80, 20), 0.8);
/// assert!(precision(0, 0).is_nan());
/// ```
#[must_use]
pub fn precision(true_positives: usize, false_positives: usize) -> f64 {
    let denominator = true_positives + false_positives;
    if denominator == 0 {
        return f64::NAN;
    }

    #[allow(clippy::cast_precision_loss)]
    let precision = (true_positives as f64) / (denominator as f64);

    debug_assert!(
        (0.0..=1.0).contains(&precision),
        "Precision must be between 0 and 1, got {precision}"
    );

    precision
}

/// Format a rate for reports, printing undefined rates as `n/a`.
pub fn format_rate(rate: f64) -> String {
    if rate.is_nan() {
        "n/a".to_string()
    } else {
        format!("{rate:.6}")
    }
}
