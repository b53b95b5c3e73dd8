//! Regression solvers.

mod traits;
mod ols;
mod stepwise;

pub use traits::{FittedRegressor, Regressor, RegressionError};
pub use ols::{FittedOls, OlsRegressor, OlsRegressorBuilder};
pub use stepwise::{
    FittedStepwise, ModelSummary, StepwiseRegressor, StepwiseRegressorBuilder, TermSummary,
};
