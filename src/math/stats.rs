//! Goodness-of-fit statistics.

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// No clamping: a model worse than the mean gives a negative score.
/// When the observations are constant (`SS_tot = 0`) the score is `1.0` for an
/// exact prediction and `0.0` otherwise, so the result is always finite for
/// finite inputs.
///
/// # Panics
/// Panics if the slices have different lengths.
pub fn r2_score(observed: &[f64], predicted: &[f64]) -> f64 {
    assert_eq!(observed.len(), predicted.len(), "r2_score: length mismatch");
    if observed.is_empty() {
        return 0.0;
    }

    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(y, f)| (y - f).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Sum of squared differences.
pub fn sse(observed: &[f64], predicted: &[f64]) -> f64 {
    observed
        .iter()
        .zip(predicted)
        .map(|(y, f)| (y - f).powi(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_scores_one() {
        let y = [1.0, 2.0, 4.0];
        assert_eq!(r2_score(&y, &y), 1.0);
    }

    #[test]
    fn mean_prediction_scores_zero_and_worse_is_negative() {
        let y = [1.0, 2.0, 3.0];
        assert!(r2_score(&y, &[2.0, 2.0, 2.0]).abs() < 1e-15);
        assert!(r2_score(&y, &[3.0, 2.0, 1.0]) < 0.0);
    }

    #[test]
    fn constant_observations_fall_back() {
        let y = [5.0, 5.0, 5.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert_eq!(r2_score(&y, &[4.0, 5.0, 6.0]), 0.0);
    }
}
