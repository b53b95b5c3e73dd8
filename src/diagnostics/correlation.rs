//! Pearson correlation between measured parameters.

use crate::data::{ObservationTable, Parameter};
use crate::utils::{is_constant, mean};
use faer::Mat;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Pearson correlation coefficient of two equally long slices.
///
/// Returns NaN when either slice has zero variance or fewer than two
/// values. The result is clamped to [-1, 1].
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let (x, y) = (&x[..n], &y[..n]);
    if is_constant(x, 0.0) || is_constant(y, 0.0) {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Square, symmetric matrix of pairwise correlations with named rows.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Mat<f64>,
}

impl CorrelationMatrix {
    /// Correlations of the given columns. The diagonal is 1.0.
    pub fn from_columns(names: Vec<String>, columns: &[Vec<f64>]) -> Self {
        let p = columns.len();
        let mut values = Mat::zeros(p, p);
        for i in 0..p {
            values[(i, i)] = 1.0;
            for j in (i + 1)..p {
                let r = pearson(&columns[i], &columns[j]);
                values[(i, j)] = r;
                values[(j, i)] = r;
            }
        }
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Mat<f64> {
        &self.values
    }

    pub fn dim(&self) -> usize {
        self.names.len()
    }

    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[(i, j)])
    }

    /// True when every pair of entries mirrors, NaN matching NaN.
    pub fn is_symmetric(&self) -> bool {
        let p = self.dim();
        (0..p).all(|i| {
            (0..p).all(|j| {
                let (a, b) = (self.values[(i, j)], self.values[(j, i)]);
                a == b || (a.is_nan() && b.is_nan())
            })
        })
    }

    fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.dim())
            .map(|i| (0..self.dim()).map(|j| self.values[(i, j)]).collect())
            .collect()
    }
}

impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CorrelationMatrix", 2)?;
        state.serialize_field("names", &self.names)?;
        state.serialize_field("values", &self.rows())?;
        state.end()
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10}", "")?;
        for name in &self.names {
            write!(f, " {:>10}", name)?;
        }
        for (i, name) in self.names.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{:<10}", name)?;
            for j in 0..self.dim() {
                let r = self.values[(i, j)];
                if r.is_nan() {
                    write!(f, " {:>10}", "NaN")?;
                } else {
                    write!(f, " {:>10.4}", r)?;
                }
            }
        }
        Ok(())
    }
}

/// Correlation of one feature with the target.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TargetCorrelation {
    pub parameter: Parameter,
    pub r: f64,
}

/// Full matrix plus the features ranked by strength of association with the
/// target.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CorrelationReport {
    pub target: Parameter,
    pub matrix: CorrelationMatrix,
    /// Non-target features by descending |r|; NaN entries last.
    pub ranking: Vec<TargetCorrelation>,
}

impl fmt::Display for CorrelationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.matrix)?;
        writeln!(f)?;
        write!(f, "correlation with {}:", self.target)?;
        for entry in &self.ranking {
            write!(f, "\n  {:<10} {:>8.4}", entry.parameter.header(), entry.r)?;
        }
        Ok(())
    }
}

/// Correlation matrix over all six parameters and the target ranking.
pub fn correlation_report(table: &ObservationTable, target: Parameter) -> CorrelationReport {
    let columns: Vec<Vec<f64>> = Parameter::ALL.iter().map(|&p| table.column(p)).collect();
    let names = Parameter::ALL.iter().map(|p| p.header().to_owned()).collect();
    let matrix = CorrelationMatrix::from_columns(names, &columns);

    let t = target.index();
    let mut ranking: Vec<TargetCorrelation> = Parameter::ALL
        .iter()
        .filter(|&&p| p != target)
        .map(|&p| TargetCorrelation {
            parameter: p,
            r: matrix.values[(p.index(), t)],
        })
        .collect();

    // Stable sort keeps column order among equal magnitudes
    ranking.sort_by(|a, b| match (a.r.is_nan(), b.r.is_nan()) {
        (false, false) => b.r.abs().total_cmp(&a.r.abs()),
        (x, y) => x.cmp(&y),
    });

    tracing::debug!(target_parameter = %target, "correlation report computed");
    CorrelationReport {
        target,
        matrix,
        ranking,
    }
}
