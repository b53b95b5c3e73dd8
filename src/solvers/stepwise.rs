//! Stepwise (forward/backward) predictor selection on top of OLS.

use crate::core::{
    RegressionOptions, RegressionResult, StepAction, StepwiseOptions, StepwiseTrace,
};
use crate::solvers::ols::OlsRegressor;
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::select_columns;
use faer::{Col, Mat};
use serde::Serialize;
use std::fmt;

/// Stepwise regression estimator.
///
/// Alternates a forward step, which adds the excluded predictor with the
/// smallest p-value below `threshold_in`, and a backward step, which removes
/// the included predictor with the largest p-value above `threshold_out`,
/// until a pass changes nothing or `max_iterations` passes have run.
///
/// Policy details:
/// - candidates are scanned in column order and ties keep the earliest
///   column, so the procedure is deterministic;
/// - the predictor added in a pass is not a removal candidate in that same
///   pass;
/// - a rank-deficient candidate fit skips the candidate; a rank-deficient
///   fit of the included set drops the most recently added predictor and
///   retries. Neither surfaces as an error.
///
/// # Example
///
/// ```rust,ignore
/// use wq_regress::solvers::{StepwiseRegressor, FittedRegressor};
///
/// let fitted = StepwiseRegressor::builder()
///     .threshold_in(0.05)
///     .threshold_out(0.10)
///     .build()?
///     .fit_named(&x, &y, &["pH_CAMPO", "DQO_TOT", "OD_mg/L", "SST", "TEMP_AGUA"])?;
///
/// println!("{}", fitted.trace());
/// println!("selected: {:?}", fitted.selected_names());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepwiseRegressor {
    options: StepwiseOptions,
    regression: RegressionOptions,
}

impl StepwiseRegressor {
    /// Create a regressor from validated options.
    pub fn new(options: StepwiseOptions) -> Result<Self, RegressionError> {
        options.validate()?;
        Ok(Self {
            options,
            regression: RegressionOptions::default(),
        })
    }

    /// Create a builder for configuring the regressor.
    pub fn builder() -> StepwiseRegressorBuilder {
        StepwiseRegressorBuilder::default()
    }

    pub fn options(&self) -> &StepwiseOptions {
        &self.options
    }

    /// Run stepwise selection with named predictor columns.
    pub fn fit_named<S: AsRef<str>>(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        names: &[S],
    ) -> Result<FittedStepwise, RegressionError> {
        if names.len() != x.ncols() {
            return Err(RegressionError::FeatureNameMismatch {
                expected: x.ncols(),
                got: names.len(),
            });
        }
        if x.nrows() != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: x.nrows(),
                y_len: y.nrows(),
            });
        }
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_owned()).collect();
        if y.nrows() < 2 {
            return Ok(self.too_few_rows(y, names));
        }

        let mut run = Selection {
            regressor: self,
            x,
            y,
            names: &names,
            included: Vec::new(),
            trace: StepwiseTrace::new(),
        };

        let mut converged = false;
        let mut iterations = 0;
        while iterations < self.options.max_iterations {
            iterations += 1;

            let added = run.forward_step(iterations);
            if let Some(j) = added {
                run.included.push(j);
            }
            let removed = run.backward_step(iterations, added)?;

            if added.is_none() && !removed {
                run.trace.push(
                    iterations,
                    StepAction::Converged,
                    None,
                    None,
                    "no predictor added or removed",
                );
                converged = true;
                break;
            }
        }

        if !converged {
            run.trace.push(
                iterations,
                StepAction::IterationLimit,
                None,
                None,
                format!(
                    "stopped after {} passes without reaching a fixed point",
                    self.options.max_iterations
                ),
            );
        }

        let result = run.fit_included(iterations)?;
        if run.included.is_empty() {
            run.trace.push(
                iterations,
                StepAction::InterceptOnly,
                None,
                None,
                format!(
                    "no predictor met threshold_in {}; model predicts the target mean {:.4}",
                    self.options.threshold_in, result.intercept
                ),
            );
        }

        let Selection {
            included: selected,
            trace,
            ..
        } = run;
        tracing::info!(
            selected = ?selected.iter().map(|&j| names[j].as_str()).collect::<Vec<_>>(),
            r_squared = result.r_squared,
            iterations,
            converged,
            "stepwise selection finished"
        );

        Ok(FittedStepwise {
            trace,
            feature_names: names,
            selected,
            result,
            iterations,
            converged,
        })
    }

    /// Intercept-only model for fewer than two rows; nothing can be tested.
    fn too_few_rows(&self, y: &Col<f64>, names: Vec<String>) -> FittedStepwise {
        let mut result = RegressionResult::intercept_only(y);
        result.r_squared = f64::NAN;
        result.adj_r_squared = f64::NAN;
        result.confidence_level = self.regression.confidence_level;

        let mut trace = StepwiseTrace::new();
        trace.push(
            0,
            StepAction::InterceptOnly,
            None,
            None,
            format!("{} rows; at least 2 are needed to select predictors", y.nrows()),
        );
        tracing::warn!(rows = y.nrows(), "too few rows for stepwise selection");

        FittedStepwise {
            trace,
            feature_names: names,
            selected: Vec::new(),
            result,
            iterations: 0,
            converged: false,
        }
    }

    fn fit_columns(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        columns: &[usize],
    ) -> Result<RegressionResult, RegressionError> {
        let design = select_columns(x, columns);
        OlsRegressor::new(self.regression.clone())
            .fit(&design, y)
            .map(|fitted| fitted.into_result())
    }
}

impl Regressor for StepwiseRegressor {
    type Fitted = FittedStepwise;

    /// Fit with generated column names `x0`, `x1`, ...
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        let names: Vec<String> = (0..x.ncols()).map(|j| format!("x{}", j)).collect();
        self.fit_named(x, y, &names)
    }
}

/// Mutable state of one selection run.
struct Selection<'a> {
    regressor: &'a StepwiseRegressor,
    x: &'a Mat<f64>,
    y: &'a Col<f64>,
    names: &'a [String],
    included: Vec<usize>,
    trace: StepwiseTrace,
}

impl Selection<'_> {
    /// Evaluate every excluded predictor; return the one to add, if any.
    fn forward_step(&mut self, iteration: usize) -> Option<usize> {
        if !self.included.is_empty() {
            if let Ok(current) = self.regressor.fit_columns(self.x, self.y, &self.included) {
                if current.is_exact_fit() {
                    self.trace.push(
                        iteration,
                        StepAction::ExactFit,
                        None,
                        None,
                        "included predictors reproduce the target exactly; forward search stopped",
                    );
                    return None;
                }
            }
        }

        let mut best: Option<(usize, f64)> = None;
        for j in 0..self.x.ncols() {
            if self.included.contains(&j) {
                continue;
            }
            let name = self.names[j].as_str();

            let mut columns = self.included.clone();
            columns.push(j);
            match self.regressor.fit_columns(self.x, self.y, &columns) {
                Ok(result) => {
                    let p = result.p_value(columns.len() - 1).unwrap_or(f64::NAN);
                    let decision = if p.is_nan() {
                        "p-value undefined"
                    } else if p < self.regressor.options.threshold_in {
                        "below threshold_in"
                    } else {
                        "above threshold_in"
                    };
                    self.trace.push(
                        iteration,
                        StepAction::Evaluate,
                        Some(name),
                        Some(p).filter(|p| !p.is_nan()),
                        decision,
                    );
                    if p.is_finite() && best.map_or(true, |(_, best_p)| p < best_p) {
                        best = Some((j, p));
                    }
                }
                Err(RegressionError::SingularMatrix) => {
                    self.trace.push(
                        iteration,
                        StepAction::Singular,
                        Some(name),
                        None,
                        "collinear with the included predictors; skipped",
                    );
                }
                Err(err) => {
                    self.trace.push(
                        iteration,
                        StepAction::Evaluate,
                        Some(name),
                        None,
                        format!("skipped: {}", err),
                    );
                }
            }
        }

        match best {
            Some((j, p)) if p < self.regressor.options.threshold_in => {
                self.trace.push(
                    iteration,
                    StepAction::Add,
                    Some(self.names[j].as_str()),
                    Some(p),
                    format!("entered (threshold_in {})", self.regressor.options.threshold_in),
                );
                Some(j)
            }
            _ => None,
        }
    }

    /// Remove the least significant included predictor if it exceeds
    /// `threshold_out`. Returns whether `included` changed.
    fn backward_step(
        &mut self,
        iteration: usize,
        just_added: Option<usize>,
    ) -> Result<bool, RegressionError> {
        let before = self.included.len();
        let result = self.fit_included(iteration)?;
        let dropped = self.included.len() != before;

        let mut worst: Option<(usize, f64)> = None;
        for (pos, &j) in self.included.iter().enumerate() {
            if Some(j) == just_added {
                continue;
            }
            let Some(p) = result.p_value(pos).filter(|p| !p.is_nan()) else {
                continue;
            };
            if worst.map_or(true, |(_, worst_p)| p > worst_p) {
                worst = Some((pos, p));
            }
        }

        match worst {
            Some((pos, p)) if p > self.regressor.options.threshold_out => {
                let j = self.included.remove(pos);
                self.trace.push(
                    iteration,
                    StepAction::Remove,
                    Some(self.names[j].as_str()),
                    Some(p),
                    format!("removed (threshold_out {})", self.regressor.options.threshold_out),
                );
                Ok(true)
            }
            _ => Ok(dropped),
        }
    }

    /// Fit the included set, dropping the most recently added predictor
    /// while the fit fails.
    ///
    /// The forward step only adds a column whose fit with the included set
    /// succeeded, and removals keep the set full rank, so during a selection
    /// run the first attempt succeeds. The retry loop guards the final fit.
    fn fit_included(&mut self, iteration: usize) -> Result<RegressionResult, RegressionError> {
        loop {
            match self.regressor.fit_columns(self.x, self.y, &self.included) {
                Ok(result) => return Ok(result),
                Err(err) => {
                    let Some(j) = self.included.pop() else {
                        return Err(err);
                    };
                    self.trace.push(
                        iteration,
                        StepAction::Dropped,
                        Some(self.names[j].as_str()),
                        None,
                        format!("{}; dropped the most recently added predictor", err),
                    );
                }
            }
        }
    }
}

/// A fitted stepwise model.
///
/// Coefficients in [`FittedRegressor::result`] follow the order of
/// [`FittedStepwise::selected_names`]. [`FittedRegressor::predict`] takes a
/// matrix with all the columns the selection ran on.
#[derive(Debug, Clone)]
pub struct FittedStepwise {
    feature_names: Vec<String>,
    selected: Vec<usize>,
    result: RegressionResult,
    trace: StepwiseTrace,
    iterations: usize,
    converged: bool,
}

impl FittedStepwise {
    /// Names of every candidate column, in input order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Column indices of the selected predictors, in selection order.
    pub fn selected_indices(&self) -> &[usize] {
        &self.selected
    }

    /// Names of the selected predictors, in selection order.
    pub fn selected_names(&self) -> Vec<&str> {
        self.selected
            .iter()
            .map(|&j| self.feature_names[j].as_str())
            .collect()
    }

    /// Position of a selected predictor in the coefficient vector.
    fn position(&self, name: &str) -> Option<usize> {
        self.selected
            .iter()
            .position(|&j| self.feature_names[j] == name)
    }

    /// Coefficient of a selected predictor.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.position(name).map(|pos| self.result.coefficients[pos])
    }

    /// P-value of a selected predictor in the final fit.
    pub fn p_value(&self, name: &str) -> Option<f64> {
        self.position(name).and_then(|pos| self.result.p_value(pos))
    }

    pub fn trace(&self) -> &StepwiseTrace {
        &self.trace
    }

    pub fn is_intercept_only(&self) -> bool {
        self.selected.is_empty()
    }

    /// Number of forward/backward passes that ran.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// False when the pass limit stopped the procedure.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Tabular summary of the final fit.
    pub fn summary(&self) -> ModelSummary {
        let r = &self.result;
        let terms = self
            .selected
            .iter()
            .enumerate()
            .map(|(pos, &j)| TermSummary {
                name: self.feature_names[j].clone(),
                coefficient: r.coefficients[pos],
                std_error: r.std_errors.as_ref().map(|s| s[pos]),
                t_statistic: r.t_statistics.as_ref().map(|t| t[pos]),
                p_value: r.p_value(pos),
            })
            .collect();

        ModelSummary {
            intercept: r.intercept,
            intercept_std_error: r.intercept_std_error,
            intercept_p_value: r.intercept_p_value,
            terms,
            r_squared: r.r_squared,
            adj_r_squared: r.adj_r_squared,
            residual_std_error: r.rmse,
            f_statistic: r.f_statistic,
            f_pvalue: r.f_pvalue,
            n_observations: r.n_observations,
        }
    }
}

impl FittedRegressor for FittedStepwise {
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        Col::from_fn(x.nrows(), |i| {
            self.result.intercept
                + self
                    .selected
                    .iter()
                    .enumerate()
                    .map(|(pos, &j)| x[(i, j)] * self.result.coefficients[pos])
                    .sum::<f64>()
        })
    }

    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// One predictor row of a [`ModelSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct TermSummary {
    pub name: String,
    pub coefficient: f64,
    pub std_error: Option<f64>,
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
}

/// Coefficient table and fit statistics of a stepwise model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub intercept: f64,
    pub intercept_std_error: Option<f64>,
    pub intercept_p_value: Option<f64>,
    pub terms: Vec<TermSummary>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub residual_std_error: f64,
    pub f_statistic: f64,
    pub f_pvalue: f64,
    pub n_observations: usize,
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{:.6}", v))
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<14} {:>14} {:>14} {:>14}",
            "term", "coefficient", "std error", "p-value"
        )?;
        writeln!(
            f,
            "{:<14} {:>14.6} {:>14} {:>14}",
            "(intercept)",
            self.intercept,
            fmt_opt(self.intercept_std_error),
            fmt_opt(self.intercept_p_value)
        )?;
        for term in &self.terms {
            writeln!(
                f,
                "{:<14} {:>14.6} {:>14} {:>14}",
                term.name,
                term.coefficient,
                fmt_opt(term.std_error),
                fmt_opt(term.p_value)
            )?;
        }
        writeln!(
            f,
            "R² = {:.4}  adj. R² = {:.4}  residual std error = {:.4}  n = {}",
            self.r_squared, self.adj_r_squared, self.residual_std_error, self.n_observations
        )?;
        write!(
            f,
            "F = {:.4}  p(F) = {}",
            self.f_statistic,
            fmt_opt(Some(self.f_pvalue).filter(|p| p.is_finite()))
        )
    }
}

/// Builder for `StepwiseRegressor`.
#[derive(Debug, Clone, Default)]
pub struct StepwiseRegressorBuilder {
    options: StepwiseOptions,
    regression: RegressionOptions,
}

impl StepwiseRegressorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// P-value below which a candidate enters.
    pub fn threshold_in(mut self, threshold: f64) -> Self {
        self.options.threshold_in = threshold;
        self
    }

    /// P-value above which an included predictor leaves.
    pub fn threshold_out(mut self, threshold: f64) -> Self {
        self.options.threshold_out = threshold;
        self
    }

    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.options.max_iterations = max_iter;
        self
    }

    /// Options for every OLS fit performed during selection.
    pub fn regression_options(mut self, options: RegressionOptions) -> Self {
        self.regression = options;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<StepwiseRegressor, RegressionError> {
        self.options.validate()?;
        self.regression.validate()?;
        Ok(StepwiseRegressor {
            options: self.options,
            regression: self.regression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic noise in [-0.5, 0.5), independent across salts.
    fn noise(i: usize, salt: u64) -> f64 {
        let mut z = (i as u64).wrapping_add(salt.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64 - 0.5
    }

    #[test]
    fn test_selects_the_informative_column() {
        let n = 40;
        let x = Mat::from_fn(n, 3, |i, j| match j {
            1 => i as f64,
            _ => noise(i, j as u64 + 1),
        });
        let y = Col::from_fn(n, |i| 4.0 + 0.5 * i as f64);

        let fitted = StepwiseRegressor::default()
            .fit_named(&x, &y, &["a", "b", "c"])
            .unwrap();

        assert_eq!(fitted.selected_names(), vec!["b"]);
        assert!((fitted.coefficient("b").unwrap() - 0.5).abs() < 1e-8);
        assert!(fitted.converged());
        assert!(fitted.trace().contains(StepAction::Add));
    }

    #[test]
    fn test_intercept_only_when_nothing_qualifies() {
        let n = 30;
        let x = Mat::from_fn(n, 2, |i, j| noise(i, j as u64 + 11));
        let y = Col::from_fn(n, |i| noise(i, 97));

        let fitted = StepwiseRegressor::builder()
            .threshold_in(1e-6)
            .threshold_out(1e-5)
            .build()
            .unwrap()
            .fit(&x, &y)
            .unwrap();

        assert!(fitted.is_intercept_only());
        assert!(fitted.trace().contains(StepAction::InterceptOnly));

        let mean = y.iter().sum::<f64>() / n as f64;
        let preds = fitted.predict(&x);
        assert!(preds.iter().all(|&p| (p - mean).abs() < 1e-12));
    }

    #[test]
    fn test_singular_included_set_drops_latest() {
        let n = 20;
        // Column "b" is twice column "a"
        let x = Mat::from_fn(n, 3, |i, j| match j {
            0 => i as f64,
            1 => 2.0 * i as f64,
            _ => noise(i, 31),
        });
        let y = Col::from_fn(n, |i| 1.0 + 0.3 * i as f64 + noise(i, 32));
        let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let regressor = StepwiseRegressor::default();

        let mut run = Selection {
            regressor: &regressor,
            x: &x,
            y: &y,
            names: &names,
            included: vec![0, 1],
            trace: StepwiseTrace::new(),
        };
        let result = run.fit_included(4).unwrap();

        assert_eq!(run.included, vec![0]);
        assert_eq!(result.coefficients.nrows(), 1);
        let dropped: Vec<_> = run.trace.with_action(StepAction::Dropped).collect();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].feature.as_deref(), Some("b"));
        assert_eq!(dropped[0].iteration, 4);
    }

    #[test]
    fn test_name_mismatch() {
        let x = Mat::from_fn(5, 2, |i, j| (i + j) as f64);
        let y = Col::from_fn(5, |i| i as f64);

        let result = StepwiseRegressor::default().fit_named(&x, &y, &["only"]);
        assert!(matches!(
            result,
            Err(RegressionError::FeatureNameMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_builder_rejects_inverted_thresholds() {
        let result = StepwiseRegressor::builder()
            .threshold_in(0.2)
            .threshold_out(0.1)
            .build();
        assert!(matches!(result, Err(RegressionError::InvalidOptions(_))));
    }

    #[test]
    fn test_summary_display() {
        let n = 20;
        let x = Mat::from_fn(n, 1, |i, _| i as f64);
        let y = Col::from_fn(n, |i| 1.0 + 2.0 * i as f64 + noise(i, 5) * 0.1);

        let fitted = StepwiseRegressor::default()
            .fit_named(&x, &y, &["DQO_TOT"])
            .unwrap();
        let text = fitted.summary().to_string();

        assert!(text.contains("(intercept)"));
        assert!(text.contains("DQO_TOT"));
        assert!(text.contains("R²"));
    }
}
