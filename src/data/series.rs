//! Labelled single-parameter series for plotting and export.

use super::columns::Parameter;
use super::table::ObservationTable;
use serde::Serialize;

/// Values of one parameter in chronological order.
///
/// Labels are `dd/mm/yyyy` for dated rows and the 1-based row position
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub parameter: Parameter,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    /// Series of `parameter`, optionally restricted to one year.
    pub fn from_table(table: &ObservationTable, parameter: Parameter, year: Option<i32>) -> Self {
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

        Self {
            parameter,
            labels,
            values: sorted.column(parameter),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
