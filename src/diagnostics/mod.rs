//! Diagnostics on loaded data and fitted models.
//!
//! - **Correlation**: Pearson matrix over the measured parameters and the
//!   ranking of features against the target
//! - **Residuals**: residual spread, the ±2σ band and standardized residuals
//!
//! # Example
//!
//! ```rust,ignore
//! use wq_regress::diagnostics::{correlation_report, ResidualAnalysis};
//! use wq_regress::data::Parameter;
//!
//! let report = correlation_report(&table, Parameter::Bod5);
//! println!("{}", report);
//!
//! let residuals = ResidualAnalysis::from_fit(&fitted, &x, &y);
//! println!("{} points outside ±2σ", residuals.outliers.len());
//! ```

mod correlation;
mod residuals;

pub use correlation::{
    correlation_report, pearson, CorrelationMatrix, CorrelationReport, TargetCorrelation,
};
pub use residuals::{residual_outliers, standardized_residuals, ResidualAnalysis};
