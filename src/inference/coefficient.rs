//! Coefficient inference calculations.

use crate::solvers::RegressionError;
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Diagonal of R below which `(X'X)` is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Compute standard errors for both intercept and coefficients from the
    /// augmented design matrix `[1 | X]`.
    ///
    /// SE(β_j) = sqrt(σ² · (X_aug'X_aug)⁻¹_{jj})
    ///
    /// Returns (coefficient_SE, intercept_SE).
    pub fn standard_errors_with_intercept(
        x: &Mat<f64>,
        mse: f64,
    ) -> Result<(Col<f64>, f64), RegressionError> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        let x_aug = Mat::from_fn(n_samples, n_features + 1, |i, j| {
            if j == 0 {
                1.0
            } else {
                x[(i, j - 1)]
            }
        });
        let xtx_aug = x_aug.transpose() * &x_aug;
        let xtx_aug_inv = invert(&xtx_aug)?;

        let se_intercept = (mse * xtx_aug_inv[(0, 0)]).max(0.0).sqrt();
        let se_coef = Col::from_fn(n_features, |j| {
            let var = mse * xtx_aug_inv[(j + 1, j + 1)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        });

        Ok((se_coef, se_intercept))
    }

    /// Compute the t-statistic of a single estimate.
    ///
    /// A zero standard error on a nonzero estimate (exact fit) yields an
    /// infinite statistic; a zero estimate with zero error yields NaN.
    pub fn t_statistic(estimate: f64, std_error: f64) -> f64 {
        if std_error.is_nan() {
            f64::NAN
        } else if std_error == 0.0 {
            if estimate == 0.0 {
                f64::NAN
            } else {
                f64::INFINITY.copysign(estimate)
            }
        } else {
            estimate / std_error
        }
    }

    /// Compute t-statistics for coefficients.
    ///
    /// t_j = β_j / SE(β_j)
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        Col::from_fn(coefficients.nrows(), |j| {
            Self::t_statistic(coefficients[j], std_errors[j])
        })
    }

    /// Two-tailed p-value of a t-statistic with `df` degrees of freedom.
    pub fn p_value(t: f64, df: f64) -> f64 {
        if t.is_nan() || df <= 0.0 {
            return f64::NAN;
        }
        if t.is_infinite() {
            return 0.0;
        }
        match StudentsT::new(0.0, 1.0, df) {
            // Lower tail keeps precision for large |t|
            Ok(dist) => (2.0 * dist.cdf(-t.abs())).clamp(0.0, 1.0),
            Err(_) => f64::NAN,
        }
    }

    /// Compute p-values from t-statistics.
    ///
    /// p_j = 2 · P(|T| > |t_j|) where T ~ t(df)
    pub fn p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
        Col::from_fn(t_statistics.nrows(), |j| Self::p_value(t_statistics[j], df))
    }

    /// Compute confidence intervals for coefficients.
    ///
    /// CI_j = β_j ± t_{α/2, df} · SE(β_j)
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        df: f64,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let n = coefficients.nrows();
        let t_crit = if df > 0.0 {
            StudentsT::new(0.0, 1.0, df)
                .map(|d| d.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0))
                .unwrap_or(f64::NAN)
        } else {
            f64::NAN
        };

        let lower = Col::from_fn(n, |j| coefficients[j] - t_crit * std_errors[j]);
        let upper = Col::from_fn(n, |j| coefficients[j] + t_crit * std_errors[j]);
        (lower, upper)
    }
}

/// Invert a small square matrix through its QR decomposition.
fn invert(matrix: &Mat<f64>) -> Result<Mat<f64>, RegressionError> {
    let n = matrix.nrows();

    let qr = matrix.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    for i in 0..n {
        if r[(i, i)].abs() < SINGULAR_TOLERANCE {
            return Err(RegressionError::SingularMatrix);
        }
    }

    // Solve R · X = Q' column by column
    let qt = q.transpose();
    let mut inv = Mat::zeros(n, n);
    for col in 0..n {
        for i in (0..n).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..n {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Ok(inv)
}
