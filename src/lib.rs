//! Regression analysis of river water-quality measurements.
//!
//! The crate loads field measurements (pH, COD, dissolved oxygen, suspended
//! solids, water temperature and BOD5), explores how the parameters relate,
//! selects a BOD5 model by stepwise regression with full statistical
//! inference, and evaluates a fixed BOD5 formula and per-parameter trends.
//!
//! # Example
//!
//! ```rust,ignore
//! use wq_regress::prelude::*;
//!
//! let table = load_observations("rio.csv")?;
//! println!("{}", correlation_report(&table, Parameter::Bod5));
//!
//! let x = table.design_matrix(&Parameter::PREDICTORS);
//! let y = table.target(Parameter::Bod5);
//! let names: Vec<&str> = Parameter::PREDICTORS.iter().map(|p| p.header()).collect();
//!
//! let fitted = StepwiseRegressor::default().fit_named(&x, &y, &names)?;
//! println!("{}", fitted.trace());
//! println!("{}", fitted.summary());
//! ```

pub mod cli;
pub mod core;
pub mod data;
pub mod diagnostics;
pub mod inference;
pub mod model;
pub mod session;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        RegressionOptions, RegressionOptionsBuilder, RegressionResult, StepAction, StepRecord,
        StepwiseOptions, StepwiseTrace,
    };
    pub use crate::data::{
        load_observations, load_validation_observations, Loader, Observation, ObservationTable,
        Parameter, TimeSeries,
    };
    pub use crate::diagnostics::{correlation_report, pearson, CorrelationReport, ResidualAnalysis};
    pub use crate::model::{polyfit, Bod5Formula, LeastSquaresFit, QualityBand, TrendAnalysis};
    pub use crate::session::{Session, SessionError};
    pub use crate::solvers::{
        FittedOls, FittedRegressor, FittedStepwise, OlsRegressor, Regressor, StepwiseRegressor,
    };
}

pub use crate::core::{RegressionOptions, RegressionResult, StepwiseOptions, StepwiseTrace};
pub use crate::data::{DataLoadError, ObservationTable, Parameter};
pub use crate::session::{Session, SessionError};
pub use crate::solvers::{FittedRegressor, RegressionError, Regressor};
