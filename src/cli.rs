//! CLI argument parsing for wq-report

use crate::core::StepwiseOptions;
use crate::data::Parameter;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "wq-report")]
#[command(version)]
#[command(about = "Correlation, stepwise regression and trend report for river water-quality data", long_about = None)]
pub struct Cli {
    /// Measurement file (CSV, `,` or `;` separated)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Regression target column (header or short name)
    #[arg(short, long, default_value = "DBO5")]
    pub target: Parameter,

    /// P-value below which a predictor enters the model
    #[arg(long = "threshold-in", value_name = "P", default_value = "0.05")]
    pub threshold_in: f64,

    /// P-value above which a predictor leaves the model
    #[arg(long = "threshold-out", value_name = "P", default_value = "0.10")]
    pub threshold_out: f64,

    /// Maximum forward/backward passes
    #[arg(long = "max-iterations", value_name = "N", default_value = "100")]
    pub max_iterations: usize,

    /// Restrict the formula comparison and series to one year
    #[arg(short, long, value_name = "YYYY")]
    pub year: Option<i32>,

    /// Load only the 2012/2013 validation rows
    #[arg(long)]
    pub validation: bool,

    /// Add a trend projection for this parameter
    #[arg(long, value_name = "PARAM")]
    pub trend: Option<Parameter>,

    /// Projection horizon in years (1-4)
    #[arg(long, value_name = "N", default_value = "2")]
    pub years: usize,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing on stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Stepwise options from the threshold flags.
    pub fn stepwise_options(&self) -> StepwiseOptions {
        StepwiseOptions {
            threshold_in: self.threshold_in,
            threshold_out: self.threshold_out,
            max_iterations: self.max_iterations,
        }
    }
}
