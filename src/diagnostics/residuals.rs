//! Residual summaries of a fitted model.

use crate::solvers::FittedRegressor;
use crate::utils::{mean, population_std};
use faer::{Col, Mat};
use serde::Serialize;

/// Compute standardized residuals: e_i / s
///
/// Where s is the residual standard error (sqrt of MSE).
pub fn standardized_residuals(residuals: &Col<f64>, mse: f64) -> Col<f64> {
    if mse <= 0.0 || !mse.is_finite() {
        return Col::from_fn(residuals.nrows(), |i| {
            if residuals[i].abs() < 1e-14 {
                0.0
            } else {
                f64::NAN
            }
        });
    }

    let s = mse.sqrt();
    Col::from_fn(residuals.nrows(), |i| residuals[i] / s)
}

/// Indices of residuals outside `center ± width`.
pub fn residual_outliers(residuals: &[f64], center: f64, width: f64) -> Vec<usize> {
    residuals
        .iter()
        .enumerate()
        .filter(|(_, &r)| (r - center).abs() > width)
        .map(|(i, _)| i)
        .collect()
}

/// Residuals (observed − predicted) of a model with their spread.
#[derive(Debug, Clone, Serialize)]
pub struct ResidualAnalysis {
    pub residuals: Vec<f64>,
    pub predicted: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation of the residuals.
    pub std_dev: f64,
    /// `mean − 2σ`.
    pub lower_band: f64,
    /// `mean + 2σ`.
    pub upper_band: f64,
    /// Row indices outside the ±2σ band.
    pub outliers: Vec<usize>,
    /// Residuals divided by the model's residual standard error.
    pub standardized: Vec<f64>,
}

impl ResidualAnalysis {
    /// Analyse `observed − predicted`, standardizing with `mse`.
    pub fn new(observed: &[f64], predicted: &[f64], mse: f64) -> Self {
        let residuals: Vec<f64> = observed
            .iter()
            .zip(predicted)
            .map(|(&y, &p)| y - p)
            .collect();
        let mean = mean(&residuals);
        let std_dev = population_std(&residuals);
        let outliers = residual_outliers(&residuals, mean, 2.0 * std_dev);
        let standardized =
            standardized_residuals(&Col::from_fn(residuals.len(), |i| residuals[i]), mse)
                .iter()
                .copied()
                .collect();

        Self {
            predicted: predicted.to_vec(),
            mean,
            std_dev,
            lower_band: mean - 2.0 * std_dev,
            upper_band: mean + 2.0 * std_dev,
            outliers,
            standardized,
            residuals,
        }
    }

    /// Residuals of a fitted model on the data `x`, `y`.
    pub fn from_fit<F: FittedRegressor>(fitted: &F, x: &Mat<f64>, y: &Col<f64>) -> Self {
        let predicted: Vec<f64> = fitted.predict(x).iter().copied().collect();
        let observed: Vec<f64> = y.iter().copied().collect();
        Self::new(&observed, &predicted, fitted.result().mse)
    }

    pub fn len(&self) -> usize {
        self.residuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residuals.is_empty()
    }

    /// Sum of the residuals; zero up to rounding for a fit with intercept.
    pub fn sum(&self) -> f64 {
        self.residuals.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standardized_residuals() {
        let residuals = Col::from_fn(10, |i| (i as f64 - 4.5));
        let mse = 10.0;

        let std_resid = standardized_residuals(&residuals, mse);

        let s = mse.sqrt();
        for i in 0..10 {
            let expected = residuals[i] / s;
            assert!((std_resid[i] - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_standardized_residuals_perfect_fit() {
        let residuals = Col::from_fn(3, |_| 0.0);
        let std_resid = standardized_residuals(&residuals, 0.0);
        assert!(std_resid.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_outlier_detection() {
        let residuals: Vec<f64> = (0..10)
            .map(|i| if i == 5 { 4.0 } else { (i as f64 - 4.5) * 0.1 })
            .collect();

        assert_eq!(residual_outliers(&residuals, 0.0, 2.0), vec![5]);
    }

    #[test]
    fn test_analysis_band() {
        let observed = [1.0, 2.0, 3.0, 4.0, 30.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let predicted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

        let analysis = ResidualAnalysis::new(&observed, &predicted, 1.0);

        assert_relative_eq!(analysis.mean, 2.5, epsilon = 1e-12);
        assert_relative_eq!(analysis.std_dev, 7.5, epsilon = 1e-12);
        assert_relative_eq!(analysis.upper_band, 17.5, epsilon = 1e-12);
        assert_eq!(analysis.outliers, vec![4]);
        assert_eq!(analysis.standardized[4], 25.0);
    }
}
