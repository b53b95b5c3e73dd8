//! Structured trace of a stepwise selection run.

use serde::Serialize;
use std::fmt;

/// What happened at one step of the selection procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    /// A candidate was fit and its p-value recorded.
    Evaluate,
    /// The best candidate entered the model.
    Add,
    /// An included predictor left the model.
    Remove,
    /// A candidate fit was rank-deficient and the candidate was skipped.
    Singular,
    /// The fit of the included set was rank-deficient; the latest
    /// predictor was dropped before retrying.
    Dropped,
    /// The included set already reproduces the target exactly.
    ExactFit,
    /// A full pass neither added nor removed a predictor.
    Converged,
    /// The pass limit was reached before convergence.
    IterationLimit,
    /// No predictor was selected; the model is the target mean.
    InterceptOnly,
}

impl StepAction {
    fn label(self) -> &'static str {
        match self {
            StepAction::Evaluate => "Evaluate",
            StepAction::Add => "Add",
            StepAction::Remove => "Remove",
            StepAction::Singular => "Singular",
            StepAction::Dropped => "Dropped",
            StepAction::ExactFit => "Exact fit",
            StepAction::Converged => "Converged",
            StepAction::IterationLimit => "Iteration limit",
            StepAction::InterceptOnly => "Intercept only",
        }
    }
}

/// One record of the trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    /// 1-based pass number; 0 when no pass ran.
    pub iteration: usize,
    pub action: StepAction,
    /// Predictor the record is about, if any.
    pub feature: Option<String>,
    /// Significance statistic (p-value) that drove the decision.
    pub p_value: Option<f64>,
    /// Human-readable decision.
    pub decision: String,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}] {:<15}", self.iteration, self.action.label())?;
        match &self.feature {
            Some(name) => write!(f, " {:<12}", name)?,
            None => write!(f, " {:<12}", "-")?,
        }
        match self.p_value {
            Some(p) => write!(f, " p-value {:<12.6}", p)?,
            None => write!(f, " {:<20}", "")?,
        }
        write!(f, " {}", self.decision)
    }
}

/// Ordered list of step records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepwiseTrace {
    records: Vec<StepRecord>,
}

impl StepwiseTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and mirror it to the `tracing` subscriber.
    pub(crate) fn push(
        &mut self,
        iteration: usize,
        action: StepAction,
        feature: Option<&str>,
        p_value: Option<f64>,
        decision: impl Into<String>,
    ) {
        let record = StepRecord {
            iteration,
            action,
            feature: feature.map(str::to_owned),
            p_value,
            decision: decision.into(),
        };
        tracing::debug!(
            iteration,
            action = ?record.action,
            feature = record.feature.as_deref().unwrap_or("-"),
            p_value = record.p_value.unwrap_or(f64::NAN),
            "{}",
            record.decision
        );
        self.records.push(record);
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with the given action, in order.
    pub fn with_action(&self, action: StepAction) -> impl Iterator<Item = &StepRecord> {
        self.records.iter().filter(move |r| r.action == action)
    }

    /// True if any record has the given action.
    pub fn contains(&self, action: StepAction) -> bool {
        self.records.iter().any(|r| r.action == action)
    }
}

impl fmt::Display for StepwiseTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}
