//! Least squares fit of one measured parameter on a set of others.

use crate::core::{RegressionOptions, RegressionOptionsBuilder, RegressionResult};
use crate::inference::CoefficientInference;
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{center_columns, center_vector, detect_constant_columns};
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Ordinary Least Squares regression estimator with intercept.
///
/// The centered design matrix is checked for full column rank with a
/// column-pivoted QR decomposition. A rank-deficient matrix (a constant
/// column, or two perfectly collinear columns) is rejected with
/// [`RegressionError::SingularMatrix`] rather than silently aliased, so
/// callers can decide which column to drop.
///
/// # Example
///
/// ```rust,ignore
/// use wq_regress::data::{load_observations, Parameter};
/// use wq_regress::solvers::{FittedRegressor, OlsRegressor, Regressor};
///
/// let table = load_observations("rio.csv")?;
/// let x = table.design_matrix(&[Parameter::Cod, Parameter::DissolvedOxygen]);
/// let y = table.target(Parameter::Bod5);
///
/// let fitted = OlsRegressor::default().fit(&x, &y)?;
/// println!("BOD5 = {:.3} + {:?}", fitted.intercept(), fitted.coefficients());
/// ```
#[derive(Debug, Clone, Default)]
pub struct OlsRegressor {
    options: RegressionOptions,
}

impl OlsRegressor {
    /// Regressor using `options`.
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    /// Start from default options.
    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }

    /// Numerical rank of `x` from the diagonal of its column-pivoted R.
    pub fn numerical_rank(x: &Mat<f64>, tolerance: f64) -> usize {
        let k = x.ncols().min(x.nrows());
        if k == 0 {
            return 0;
        }

        let qr = x.col_piv_qr();
        let r = qr.R();

        // Pivoting sorts |r_ii| in decreasing order
        let threshold = tolerance * r[(0, 0)].abs().max(1.0);
        (0..k).take_while(|&i| r[(i, i)].abs() > threshold).count()
    }

    /// True when no column of `x` is a linear combination of the others.
    pub fn is_full_rank(x: &Mat<f64>) -> bool {
        Self::numerical_rank(x, 1e-10) == x.ncols()
    }
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if x.nrows() != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: x.nrows(),
                y_len: y.nrows(),
            });
        }

        let n_params = n_features + 1;
        let needed = n_params.max(2);
        if n_samples < needed {
            return Err(RegressionError::InsufficientObservations {
                needed,
                got: n_samples,
            });
        }

        if n_features == 0 {
            return Ok(FittedOls {
                options: self.options.clone(),
                result: RegressionResult::intercept_only(y),
            });
        }

        // A constant column duplicates the intercept
        let constant_cols = detect_constant_columns(x, self.options.rank_tolerance);
        if constant_cols.iter().any(|&c| c) {
            return Err(RegressionError::SingularMatrix);
        }

        let (x_centered, x_means) = center_columns(x);
        let (y_centered, y_mean) = center_vector(y);

        let rank = Self::numerical_rank(&x_centered, self.options.rank_tolerance);
        if rank < n_features {
            return Err(RegressionError::SingularMatrix);
        }

        let coefficients = solve_full_rank(&x_centered, &y_centered)?;

        // intercept = y_mean - x_means' * coefficients
        let intercept = y_mean
            - (0..n_features)
                .map(|j| x_means[j] * coefficients[j])
                .sum::<f64>();

        let fitted_values = Col::from_fn(n_samples, |i| {
            intercept
                + (0..n_features)
                    .map(|j| x[(i, j)] * coefficients[j])
                    .sum::<f64>()
        });
        let residuals = Col::from_fn(n_samples, |i| y[i] - fitted_values[i]);

        let result = self.compute_statistics(
            x,
            y,
            coefficients,
            intercept,
            residuals,
            fitted_values,
            rank,
        );

        Ok(FittedOls {
            options: self.options.clone(),
            result,
        })
    }
}

/// Solve a full-rank least squares problem with a QR decomposition and
/// back-substitution on R.
fn solve_full_rank(x: &Mat<f64>, y: &Col<f64>) -> Result<Col<f64>, RegressionError> {
    let p = x.ncols();

    let qr = x.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    let qty = q.transpose() * y;

    let mut beta = Col::zeros(p);
    for i in (0..p).rev() {
        let diag = r[(i, i)];
        if diag == 0.0 || !diag.is_finite() {
            return Err(RegressionError::SingularMatrix);
        }
        let mut sum = qty[i];
        for j in (i + 1)..p {
            sum -= r[(i, j)] * beta[j];
        }
        beta[i] = sum / diag;
    }

    Ok(beta)
}

impl OlsRegressor {
    /// Goodness of fit, the overall F test, and coefficient inference when enabled.
    #[allow(clippy::too_many_arguments)]
    fn compute_statistics(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        coefficients: Col<f64>,
        intercept: f64,
        residuals: Col<f64>,
        fitted_values: Col<f64>,
        rank: usize,
    ) -> RegressionResult {
        let n = y.nrows();
        let n_params = rank + 1;

        let y_mean: f64 = y.iter().sum::<f64>() / n as f64;
        let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        let rss: f64 = residuals.iter().map(|&r| r.powi(2)).sum();

        let r_squared = if tss > 0.0 {
            (1.0 - rss / tss).clamp(0.0, 1.0)
        } else if rss < 1e-10 {
            1.0
        } else {
            0.0
        };

        let df_total = (n - 1) as f64;
        let df_resid = (n - n_params) as f64;
        let adj_r_squared = if df_resid > 0.0 && df_total > 0.0 {
            1.0 - (1.0 - r_squared) * df_total / df_resid
        } else {
            f64::NAN
        };

        let mse = if df_resid > 0.0 {
            rss / df_resid
        } else {
            f64::NAN
        };
        let rmse = mse.sqrt();

        let ess = tss - rss;
        let df_model = rank as f64;
        let f_statistic = if df_model > 0.0 && df_resid > 0.0 && mse > 0.0 {
            (ess / df_model) / mse
        } else {
            f64::NAN
        };

        let f_pvalue = if f_statistic.is_finite() {
            FisherSnedecor::new(df_model, df_resid)
                .map_or(f64::NAN, |d| 1.0 - d.cdf(f_statistic))
        } else {
            f64::NAN
        };

        let mut result = RegressionResult::empty(x.ncols(), n);
        result.coefficients = coefficients;
        result.intercept = intercept;
        result.residuals = residuals;
        result.fitted_values = fitted_values;
        result.rank = rank;
        result.n_parameters = n_params;
        result.r_squared = r_squared;
        result.adj_r_squared = adj_r_squared;
        result.mse = mse;
        result.rmse = rmse;
        result.f_statistic = f_statistic;
        result.f_pvalue = f_pvalue;
        result.confidence_level = self.options.confidence_level;

        if self.options.compute_inference {
            self.compute_inference(x, &mut result);
        }

        result
    }

    /// Standard errors, t statistics, two-sided p-values and intervals.
    ///
    /// Left as `None` when there are no residual degrees of freedom.
    fn compute_inference(&self, x: &Mat<f64>, result: &mut RegressionResult) {
        let df = result.residual_df() as f64;

        if df <= 0.0 || !result.mse.is_finite() {
            return;
        }

        let Ok((se, se_int)) =
            CoefficientInference::standard_errors_with_intercept(x, result.mse)
        else {
            return;
        };

        let t_stats = CoefficientInference::t_statistics(&result.coefficients, &se);
        let p_vals = CoefficientInference::p_values(&t_stats, df);
        let (ci_lower, ci_upper) = CoefficientInference::confidence_intervals(
            &result.coefficients,
            &se,
            df,
            self.options.confidence_level,
        );

        let t_int = CoefficientInference::t_statistic(result.intercept, se_int);

        result.std_errors = Some(se);
        result.t_statistics = Some(t_stats);
        result.p_values = Some(p_vals);
        result.conf_interval_lower = Some(ci_lower);
        result.conf_interval_upper = Some(ci_upper);
        result.intercept_std_error = Some(se_int);
        result.intercept_t_statistic = Some(t_int);
        result.intercept_p_value = Some(CoefficientInference::p_value(t_int, df));
    }
}

/// Least squares model fitted to one target.
#[derive(Debug, Clone)]
pub struct FittedOls {
    options: RegressionOptions,
    result: RegressionResult,
}

impl FittedOls {
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    pub fn into_result(self) -> RegressionResult {
        self.result
    }
}

impl FittedRegressor for FittedOls {
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let n_features = self.result.coefficients.nrows().min(x.ncols());
        Col::from_fn(x.nrows(), |i| {
            self.result.intercept
                + (0..n_features)
                    .map(|j| x[(i, j)] * self.result.coefficients[j])
                    .sum::<f64>()
        })
    }

    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for [`OlsRegressor`].
#[derive(Debug, Clone, Default)]
pub struct OlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip standard errors and p-values when `false`.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Relative threshold on the pivoted R diagonal below which a column counts as redundant.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    pub fn build(self) -> OlsRegressor {
        OlsRegressor::new(self.builder.build_unchecked())
    }
}
