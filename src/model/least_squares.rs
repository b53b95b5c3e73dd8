//! Small least-squares fits for ad hoc views (COD → BOD5, polynomial trends).

use crate::core::RegressionOptions;
use crate::diagnostics::pearson;
use crate::solvers::{FittedRegressor, OlsRegressor, RegressionError, Regressor};
use crate::utils::{column_matrix, to_col};
use faer::Mat;
use serde::Serialize;

/// Ordinary least squares fit with intercept over one or more predictors.
#[derive(Debug, Clone, Serialize)]
pub struct LeastSquaresFit {
    pub slopes: Vec<f64>,
    pub intercept: f64,
    pub r_squared: f64,
    pub residual_std_error: f64,
    pub n_observations: usize,
}

impl LeastSquaresFit {
    /// Fit `y` on the columns of `x`.
    pub fn fit(x: &Mat<f64>, y: &[f64]) -> Result<Self, RegressionError> {
        let options = RegressionOptions::builder()
            .compute_inference(false)
            .build_unchecked();
        let fitted = OlsRegressor::new(options).fit(x, &to_col(y))?;
        let result = fitted.result();

        Ok(Self {
            slopes: result.coefficients.iter().copied().collect(),
            intercept: result.intercept,
            r_squared: result.r_squared,
            residual_std_error: result.rmse,
            n_observations: result.n_observations,
        })
    }

    /// Fit `y` on a single predictor.
    pub fn fit_single(x: &[f64], y: &[f64]) -> Result<Self, RegressionError> {
        Self::fit(&column_matrix(x), y)
    }

    /// Prediction for one row of predictor values.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + self.slopes.iter().zip(row).map(|(b, v)| b * v).sum::<f64>()
    }

    pub fn predict(&self, x: &Mat<f64>) -> Vec<f64> {
        (0..x.nrows())
            .map(|i| {
                self.intercept
                    + self
                        .slopes
                        .iter()
                        .enumerate()
                        .map(|(j, b)| b * x[(i, j)])
                        .sum::<f64>()
            })
            .collect()
    }
}

/// Straight-line fit of one parameter on another together with Pearson's r.
#[derive(Debug, Clone, Serialize)]
pub struct PairwiseFit {
    pub fit: LeastSquaresFit,
    pub r: f64,
}

/// Line fit and correlation of `y` against `x`.
pub fn pairwise_fit(x: &[f64], y: &[f64]) -> Result<PairwiseFit, RegressionError> {
    Ok(PairwiseFit {
        fit: LeastSquaresFit::fit_single(x, y)?,
        r: pearson(x, y),
    })
}

/// Polynomial in ascending powers: `c[0] + c[1]·x + c[2]·x² + …`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polynomial {
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
}

impl Polynomial {
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }
}

/// Least-squares polynomial of `degree` through `(x, y)`.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial, RegressionError> {
    if x.len() != y.len() {
        return Err(RegressionError::DimensionMismatch {
            x_rows: x.len(),
            y_len: y.len(),
        });
    }

    let powers = Mat::from_fn(x.len(), degree, |i, j| x[i].powi(j as i32 + 1));
    let fit = LeastSquaresFit::fit(&powers, y)?;

    let mut coefficients = Vec::with_capacity(degree + 1);
    coefficients.push(fit.intercept);
    coefficients.extend(fit.slopes);

    Ok(Polynomial {
        coefficients,
        r_squared: fit.r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_single_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 1.0).collect();

        let fit = LeastSquaresFit::fit_single(&x, &y).unwrap();
        assert_relative_eq!(fit.slopes[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(fit.intercept, -1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.predict_row(&[10.0]), 29.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polyfit_quadratic() {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 - v + 0.5 * v * v).collect();

        let poly = polyfit(&x, &y, 2).unwrap();
        assert_eq!(poly.degree(), 2);
        assert_relative_eq!(poly.coefficients[0], 2.0, epsilon = 1e-8);
        assert_relative_eq!(poly.coefficients[1], -1.0, epsilon = 1e-8);
        assert_relative_eq!(poly.coefficients[2], 0.5, epsilon = 1e-8);
        assert_relative_eq!(poly.evaluate(10.0), 42.0, epsilon = 1e-6);
    }

    #[test]
    fn test_polyfit_degree_zero_is_mean() {
        let poly = polyfit(&[0.0, 1.0, 2.0], &[1.0, 2.0, 6.0], 0).unwrap();
        assert_eq!(poly.coefficients.len(), 1);
        assert_relative_eq!(poly.evaluate(7.0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polyfit_length_mismatch() {
        let result = polyfit(&[0.0, 1.0], &[1.0], 1);
        assert!(matches!(result, Err(RegressionError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_pairwise_fit() {
        let cod = [20.0, 40.0, 60.0, 80.0];
        let bod5 = [5.0, 11.0, 15.0, 22.0];
        let pf = pairwise_fit(&cod, &bod5).unwrap();
        assert!(pf.r > 0.99);
        assert!(pf.fit.slopes[0] > 0.0);
    }
}
