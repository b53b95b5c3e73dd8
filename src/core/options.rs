//! Regression and selection options.

use thiserror::Error;

/// Options shared by every least-squares fit.
///
/// Every fit in this crate includes an intercept term; the options only
/// control inference and rank detection.
#[derive(Debug, Clone)]
pub struct RegressionOptions {
    /// Whether to compute standard errors, t-statistics and p-values.
    pub compute_inference: bool,

    /// Confidence level for coefficient intervals (e.g., 0.95).
    pub confidence_level: f64,

    /// Tolerance on the diagonal of R below which a column is treated as
    /// linearly dependent on the previous ones.
    pub rank_tolerance: f64,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            compute_inference: true,
            confidence_level: 0.95,
            rank_tolerance: 1e-10,
        }
    }
}

/// Errors raised when options fail validation.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("rank_tolerance must be positive, got {0}")]
    InvalidRankTolerance(f64),

    #[error("{name} must be in (0, 1), got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("threshold_in ({threshold_in}) must be below threshold_out ({threshold_out})")]
    ThresholdOrder {
        threshold_in: f64,
        threshold_out: f64,
    },

    #[error("max_iterations must be at least 1, got {0}")]
    InvalidMaxIterations(usize),
}

impl RegressionOptions {
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.confidence_level <= 0.0 || self.confidence_level >= 1.0 {
            return Err(OptionsError::InvalidConfidenceLevel(self.confidence_level));
        }
        if self.rank_tolerance <= 0.0 || !self.rank_tolerance.is_finite() {
            return Err(OptionsError::InvalidRankTolerance(self.rank_tolerance));
        }
        Ok(())
    }
}

/// Builder for [`RegressionOptions`].
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.options.compute_inference = compute;
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

/// Entry/exit significance thresholds and the iteration bound of stepwise
/// selection.
#[derive(Debug, Clone)]
pub struct StepwiseOptions {
    /// A candidate enters when its p-value is below this threshold.
    pub threshold_in: f64,

    /// An included predictor leaves when its p-value exceeds this threshold.
    pub threshold_out: f64,

    /// Upper bound on forward/backward passes.
    pub max_iterations: usize,
}

impl Default for StepwiseOptions {
    fn default() -> Self {
        Self {
            threshold_in: 0.05,
            threshold_out: 0.10,
            max_iterations: 100,
        }
    }
}

impl StepwiseOptions {
    /// Validate thresholds.
    ///
    /// `threshold_in` must be strictly below `threshold_out`, otherwise a
    /// predictor could enter and leave on consecutive passes forever.
    pub fn validate(&self) -> Result<(), OptionsError> {
        for (name, value) in [
            ("threshold_in", self.threshold_in),
            ("threshold_out", self.threshold_out),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(OptionsError::InvalidThreshold { name, value });
            }
        }
        if self.threshold_in >= self.threshold_out {
            return Err(OptionsError::ThresholdOrder {
                threshold_in: self.threshold_in,
                threshold_out: self.threshold_out,
            });
        }
        if self.max_iterations < 1 {
            return Err(OptionsError::InvalidMaxIterations(self.max_iterations));
        }
        Ok(())
    }
}
