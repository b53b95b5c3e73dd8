//! Explicit application state shared by analysis calls.

use crate::core::StepwiseOptions;
use crate::data::{DataLoadError, LoadSummary, Loader, ObservationTable, Parameter, TimeSeries};
use crate::diagnostics::{correlation_report, CorrelationReport, ResidualAnalysis};
use crate::model::{Bod5Formula, ComparisonSeries, TrendAnalysis};
use crate::solvers::{FittedStepwise, RegressionError, StepwiseRegressor};
use std::path::Path;
use thiserror::Error;

/// Errors from [`Session`] calls.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no data loaded")]
    NoData,

    #[error("no regression model has been fitted")]
    NoModel,

    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error(transparent)]
    Regression(#[from] RegressionError),
}

/// Currently loaded table and the model fitted on it.
///
/// The regression target defaults to BOD5; every other parameter is a
/// candidate predictor.
///
/// ```rust,ignore
/// use wq_regress::session::Session;
///
/// let mut session = Session::new();
/// session.load_path("rio.csv")?;
/// let model = session.run_stepwise(&Default::default())?;
/// let residuals = session.residuals()?;
/// ```
#[derive(Debug)]
pub struct Session {
    table: Option<ObservationTable>,
    model: Option<FittedStepwise>,
    target: Parameter,
    formula: Bod5Formula,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            table: None,
            model: None,
            target: Parameter::TARGET,
            formula: Bod5Formula::default(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session over an already loaded table.
    pub fn with_table(table: ObservationTable) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }

    /// Load a file with `loader`, replacing the table and discarding the
    /// model. On error the session is left as it was.
    pub fn load_with(
        &mut self,
        loader: &Loader,
        path: impl AsRef<Path>,
    ) -> Result<LoadSummary, SessionError> {
        let outcome = loader.load_path(path)?;
        self.table = Some(outcome.table);
        self.model = None;
        Ok(outcome.summary)
    }

    /// Load a file keeping every complete row.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary, SessionError> {
        self.load_with(&Loader::new(), path)
    }

    pub fn table(&self) -> Option<&ObservationTable> {
        self.table.as_ref()
    }

    pub fn model(&self) -> Option<&FittedStepwise> {
        self.model.as_ref()
    }

    pub fn target(&self) -> Parameter {
        self.target
    }

    /// Change the regression target. Discards the current model.
    pub fn set_target(&mut self, target: Parameter) {
        if target != self.target {
            self.target = target;
            self.model = None;
        }
    }

    pub fn formula(&self) -> &Bod5Formula {
        &self.formula
    }

    pub fn set_formula(&mut self, formula: Bod5Formula) {
        self.formula = formula;
    }

    fn require_table(&self) -> Result<&ObservationTable, SessionError> {
        self.table.as_ref().ok_or(SessionError::NoData)
    }

    /// Correlation report of the current target.
    pub fn correlation(&self) -> Result<CorrelationReport, SessionError> {
        Ok(correlation_report(self.require_table()?, self.target))
    }

    /// Run stepwise selection of the target on the remaining parameters;
    /// the result replaces any previous model.
    pub fn run_stepwise(
        &mut self,
        options: &StepwiseOptions,
    ) -> Result<&FittedStepwise, SessionError> {
        let table = self.require_table()?;
        let predictors = Parameter::predictors_for(self.target);
        let x = table.design_matrix(&predictors);
        let y = table.target(self.target);
        let names: Vec<&str> = predictors.iter().map(|p| p.header()).collect();

        let fitted = StepwiseRegressor::new(options.clone())?.fit_named(&x, &y, &names)?;
        Ok(&*self.model.insert(fitted))
    }

    /// Residuals of the current model on the current table.
    pub fn residuals(&self) -> Result<ResidualAnalysis, SessionError> {
        let table = self.require_table()?;
        let model = self.model.as_ref().ok_or(SessionError::NoModel)?;
        let x = table.design_matrix(&Parameter::predictors_for(self.target));
        let y = table.target(self.target);
        Ok(ResidualAnalysis::from_fit(model, &x, &y))
    }

    /// Measured vs formula-predicted BOD5, optionally for one year.
    pub fn formula_comparison(
        &self,
        year: Option<i32>,
    ) -> Result<ComparisonSeries, SessionError> {
        Ok(self.formula.comparison(self.require_table()?, year))
    }

    /// Chronological series of one parameter.
    pub fn series(
        &self,
        parameter: Parameter,
        year: Option<i32>,
    ) -> Result<TimeSeries, SessionError> {
        Ok(TimeSeries::from_table(self.require_table()?, parameter, year))
    }

    /// Trend and projection of one parameter over `years` future years.
    pub fn trend(&self, parameter: Parameter, years: usize) -> Result<TrendAnalysis, SessionError> {
        Ok(TrendAnalysis::analyze(self.require_table()?, parameter, years)?)
    }
}
