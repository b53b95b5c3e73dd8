//! Core types for regression analysis.

mod options;
mod result;
mod trace;

pub use options::{
    OptionsError, RegressionOptions, RegressionOptionsBuilder, StepwiseOptions,
};
pub use result::RegressionResult;
pub use trace::{StepAction, StepRecord, StepwiseTrace};
