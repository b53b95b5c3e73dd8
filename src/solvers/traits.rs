//! Fit and predict seams shared by the least squares and stepwise models.

use crate::core::RegressionResult;
use faer::{Col, Mat};
use thiserror::Error;

/// Why a model could not be fitted.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("matrix is singular or nearly singular")]
    SingularMatrix,

    #[error("expected {expected} feature names, got {got}")]
    FeatureNameMismatch { expected: usize, got: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] crate::core::OptionsError),
}

/// Something that fits a target column on a design matrix.
///
/// The estimator holds only options; fitting returns an immutable model.
pub trait Regressor {
    type Fitted: FittedRegressor;

    /// Fit `y` on the columns of `x`. An intercept is always included.
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

/// A fitted model.
pub trait FittedRegressor {
    /// Predicted target for rows of `x`, whose columns match the fitted ones.
    fn predict(&self, x: &Mat<f64>) -> Col<f64>;

    fn result(&self) -> &RegressionResult;

    /// Slopes, one per fitted column.
    fn coefficients(&self) -> &Col<f64> {
        &self.result().coefficients
    }

    fn intercept(&self) -> f64 {
        self.result().intercept
    }

    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }

    /// R² of the predictions against held-out observations.
    fn score(&self, x: &Mat<f64>, y: &Col<f64>) -> f64 {
        let predictions = self.predict(x);
        let n = y.nrows();

        let y_mean: f64 = y.iter().sum::<f64>() / n as f64;

        let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        let rss: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(&yi, &pi)| (yi - pi).powi(2))
            .sum();

        if tss == 0.0 {
            if rss == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - rss / tss
        }
    }
}
