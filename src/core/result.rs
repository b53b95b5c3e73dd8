//! Outcome of one least squares fit.

use faer::Col;

/// Everything a fit of the target on its predictors produced.
///
/// The `Option` fields stay `None` when inference was disabled or the fit
/// left no residual degrees of freedom.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    /// Estimated slope coefficients, one per design-matrix column.
    pub coefficients: Col<f64>,

    /// Intercept term.
    pub intercept: f64,

    /// Observed minus fitted target.
    pub residuals: Col<f64>,

    /// Target predicted for the rows the model was fitted on.
    pub fitted_values: Col<f64>,

    /// Numerical rank of the centered design matrix.
    pub rank: usize,

    /// Number of parameters including the intercept.
    pub n_parameters: usize,

    /// Number of observations.
    pub n_observations: usize,

    /// Share of target variance explained, in [0, 1].
    pub r_squared: f64,

    /// Adjusted R².
    pub adj_r_squared: f64,

    /// Mean squared error (RSS / residual df).
    pub mse: f64,

    /// Root mean squared error, the residual standard error.
    pub rmse: f64,

    /// F statistic against the intercept-only model.
    pub f_statistic: f64,

    pub f_pvalue: f64,

    /// Per-slope standard errors.
    pub std_errors: Option<Col<f64>>,

    pub intercept_std_error: Option<f64>,

    pub t_statistics: Option<Col<f64>>,

    pub intercept_t_statistic: Option<f64>,

    /// Two-sided p-values; stepwise selection compares these to its thresholds.
    pub p_values: Option<Col<f64>>,

    pub intercept_p_value: Option<f64>,

    /// Interval bounds at `confidence_level`.
    pub conf_interval_lower: Option<Col<f64>>,

    pub conf_interval_upper: Option<Col<f64>>,

    pub confidence_level: f64,
}

impl RegressionResult {
    /// Zeroed result the solvers fill in.
    pub(crate) fn empty(n_features: usize, n_observations: usize) -> Self {
        Self {
            coefficients: Col::zeros(n_features),
            intercept: 0.0,
            residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            rank: 0,
            n_parameters: 1,
            n_observations,
            r_squared: 0.0,
            adj_r_squared: 0.0,
            mse: 0.0,
            rmse: 0.0,
            f_statistic: f64::NAN,
            f_pvalue: f64::NAN,
            std_errors: None,
            intercept_std_error: None,
            t_statistics: None,
            intercept_t_statistic: None,
            p_values: None,
            intercept_p_value: None,
            conf_interval_lower: None,
            conf_interval_upper: None,
            confidence_level: 0.95,
        }
    }

    /// Intercept-only fit: every prediction is the mean of `y`.
    pub(crate) fn intercept_only(y: &Col<f64>) -> Self {
        let n = y.nrows();
        let mean = if n > 0 {
            y.iter().sum::<f64>() / n as f64
        } else {
            f64::NAN
        };

        let mut result = Self::empty(0, n);
        result.intercept = mean;
        result.fitted_values = Col::from_fn(n, |_| mean);
        result.residuals = Col::from_fn(n, |i| y[i] - mean);

        let rss = result.rss();
        result.mse = if n > 1 { rss / (n - 1) as f64 } else { f64::NAN };
        result.rmse = result.mse.sqrt();
        result.adj_r_squared = 0.0;
        result
    }

    /// Residual degrees of freedom (n - p).
    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Model degrees of freedom (p - 1).
    pub fn model_df(&self) -> usize {
        self.n_parameters.saturating_sub(1)
    }

    /// P-value of coefficient `index`, if inference was computed.
    pub fn p_value(&self, index: usize) -> Option<f64> {
        self.p_values
            .as_ref()
            .filter(|p| index < p.nrows())
            .map(|p| p[index])
    }

    /// Total sum of squares (TSS).
    pub fn tss(&self) -> f64 {
        let n = self.n_observations as f64;
        let y_mean = (self.fitted_values.iter().sum::<f64>() + self.residuals.iter().sum::<f64>())
            / n;

        self.residuals
            .iter()
            .zip(self.fitted_values.iter())
            .map(|(&r, &f)| (f + r - y_mean).powi(2))
            .sum()
    }

    /// Sum of squared residuals.
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|&r| r.powi(2)).sum()
    }

    /// Explained sum of squares (ESS = TSS - RSS).
    pub fn ess(&self) -> f64 {
        self.tss() - self.rss()
    }

    /// True when the residuals vanish relative to the spread of the target.
    pub fn is_exact_fit(&self) -> bool {
        let tss = self.tss();
        tss > 0.0 && self.rss() <= tss * 1e-12
    }
}
