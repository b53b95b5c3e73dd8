//! Scalar summaries of slices.

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
pub fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.is_nan() {
        return f64::NAN;
    }
    let var = values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// True when every value lies within `tolerance` of the first.
///
/// The check does not go through the mean, so constants such as 2.7 that
/// have no exact binary form are still detected.
pub fn is_constant(values: &[f64], tolerance: f64) -> bool {
    match values.split_first() {
        None => true,
        Some((&first, rest)) => rest.iter().all(|&v| (v - first).abs() <= tolerance),
    }
}

/// Median; NaN for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Coefficient of determination of `predicted` against `observed`.
///
/// Returns NaN when `observed` has zero variance.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    let m = mean(observed);
    let tss: f64 = observed.iter().map(|&y| (y - m).powi(2)).sum();
    let rss: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(&y, &p)| (y - p).powi(2))
        .sum();
    if tss > 0.0 {
        1.0 - rss / tss
    } else {
        f64::NAN
    }
}
