//! Fixed linear formula estimating BOD5 from dissolved oxygen and COD.

use crate::data::{ObservationTable, Parameter};
use crate::diagnostics::pearson;
use crate::utils::{mean, r_squared};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Manual calculator input that is not a finite number.
#[derive(Debug, Error, PartialEq)]
#[error("invalid value for {field}: '{value}' is not a number")]
pub struct InvalidInputError {
    pub field: &'static str,
    pub value: String,
}

/// Water quality class of a BOD5 concentration (mg/L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QualityBand {
    /// Below 3 mg/L.
    Excellent,
    /// 3 to 6 mg/L.
    Good,
    /// 6 to 30 mg/L.
    Acceptable,
    /// 30 to 100 mg/L.
    Polluted,
    /// 100 mg/L and above.
    HeavilyPolluted,
}

impl QualityBand {
    pub fn from_bod5(bod5: f64) -> Self {
        if bod5 < 3.0 {
            QualityBand::Excellent
        } else if bod5 < 6.0 {
            QualityBand::Good
        } else if bod5 < 30.0 {
            QualityBand::Acceptable
        } else if bod5 < 100.0 {
            QualityBand::Polluted
        } else {
            QualityBand::HeavilyPolluted
        }
    }

    /// Label used in field reports.
    pub fn label(self) -> &'static str {
        match self {
            QualityBand::Excellent => "Excelente",
            QualityBand::Good => "Buena",
            QualityBand::Acceptable => "Aceptable",
            QualityBand::Polluted => "Contaminada",
            QualityBand::HeavilyPolluted => "Muy contaminada",
        }
    }
}

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `BOD5 = a·DO + b·COD + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bod5Formula {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for Bod5Formula {
    fn default() -> Self {
        Self {
            a: -6.6283,
            b: 0.3407,
            c: 21.3075,
        }
    }
}

/// One calculator result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bod5Estimate {
    pub dissolved_oxygen: f64,
    pub cod: f64,
    pub bod5: f64,
    pub band: QualityBand,
}

impl Bod5Formula {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Estimated BOD5 in mg/L.
    pub fn estimate(&self, dissolved_oxygen: f64, cod: f64) -> f64 {
        self.a * dissolved_oxygen + self.b * cod + self.c
    }

    /// Estimate plus quality band.
    pub fn calculate(&self, dissolved_oxygen: f64, cod: f64) -> Bod5Estimate {
        let bod5 = self.estimate(dissolved_oxygen, cod);
        Bod5Estimate {
            dissolved_oxygen,
            cod,
            bod5,
            band: QualityBand::from_bod5(bod5),
        }
    }

    /// Estimate from text entered by a user.
    pub fn estimate_from_input(
        &self,
        dissolved_oxygen: &str,
        cod: &str,
    ) -> Result<Bod5Estimate, InvalidInputError> {
        let dissolved_oxygen = parse_input("DO", dissolved_oxygen)?;
        let cod = parse_input("COD", cod)?;
        Ok(self.calculate(dissolved_oxygen, cod))
    }

    /// Formula predictions for every row of `table`.
    pub fn predict_table(&self, table: &ObservationTable) -> Vec<f64> {
        table
            .rows()
            .iter()
            .map(|r| self.estimate(r.get(Parameter::DissolvedOxygen), r.get(Parameter::Cod)))
            .collect()
    }

    /// Compare predictions against the measured BOD5 of `table`.
    pub fn evaluate(&self, table: &ObservationTable) -> FormulaEvaluation {
        FormulaEvaluation::new(table.column(Parameter::Bod5), self.predict_table(table))
    }

    /// Measured and predicted BOD5 in chronological order, optionally for
    /// one year.
    pub fn comparison(&self, table: &ObservationTable, year: Option<i32>) -> ComparisonSeries {
        let sorted = table.filter_year(year).sorted_by_date();
        let labels = sorted
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| match row.date {
                Some(date) => date.format("%d/%m/%Y").to_string(),
                None => (i + 1).to_string(),
            })
            .collect();

        ComparisonSeries {
            year,
            labels,
            evaluation: self.evaluate(&sorted),
        }
    }
}

fn parse_input(field: &'static str, raw: &str) -> Result<f64, InvalidInputError> {
    let cell = raw.trim();
    cell.parse::<f64>()
        .ok()
        .or_else(|| cell.replacen(',', ".", 1).parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| InvalidInputError {
            field,
            value: raw.to_owned(),
        })
}

/// Error metrics of formula predictions against measured values.
#[derive(Debug, Clone, Serialize)]
pub struct FormulaEvaluation {
    pub measured: Vec<f64>,
    pub predicted: Vec<f64>,
    pub mae: f64,
    pub rmse: f64,
    /// NaN when the measured values are constant.
    pub r_squared: f64,
    /// Pearson correlation of measured and predicted; NaN when either is constant.
    pub r: f64,
}

impl FormulaEvaluation {
    pub fn new(measured: Vec<f64>, predicted: Vec<f64>) -> Self {
        let errors: Vec<f64> = measured
            .iter()
            .zip(&predicted)
            .map(|(&m, &p)| m - p)
            .collect();
        let mae = mean(&errors.iter().map(|e| e.abs()).collect::<Vec<_>>());
        let rmse = mean(&errors.iter().map(|e| e * e).collect::<Vec<_>>()).sqrt();
        let r_squared = r_squared(&measured, &predicted);
        let r = pearson(&measured, &predicted);

        Self {
            measured,
            predicted,
            mae,
            rmse,
            r_squared,
            r,
        }
    }

    pub fn len(&self) -> usize {
        self.measured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measured.is_empty()
    }
}

/// Measured vs predicted BOD5 over time.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSeries {
    /// Year filter applied, `None` for all years.
    pub year: Option<i32>,
    pub labels: Vec<String>,
    pub evaluation: FormulaEvaluation,
}
