//! In-memory table of cleaned observations.

use super::columns::Parameter;
use chrono::{Datelike, NaiveDate};
use faer::{Col, Mat};

/// One sampling event with every required parameter present.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Sampling date, when the source had a parseable one.
    pub date: Option<NaiveDate>,
    values: [f64; 6],
}

impl Observation {
    /// Build an observation from values in [`Parameter::ALL`] order.
    pub fn new(date: Option<NaiveDate>, values: [f64; 6]) -> Self {
        Self { date, values }
    }

    pub fn get(&self, parameter: Parameter) -> f64 {
        self.values[parameter.index()]
    }

    pub fn values(&self) -> &[f64; 6] {
        &self.values
    }

    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }

    /// True when every value is a finite number.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// Ordered rows of observations.
///
/// Tables are never mutated in place by analysis code; filters and sorts
/// return new tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one parameter, in row order.
    pub fn column(&self, parameter: Parameter) -> Vec<f64> {
        self.rows.iter().map(|r| r.get(parameter)).collect()
    }

    /// Values of one parameter as a column vector.
    pub fn target(&self, parameter: Parameter) -> Col<f64> {
        Col::from_fn(self.rows.len(), |i| self.rows[i].get(parameter))
    }

    /// Design matrix with one column per parameter, in the given order.
    pub fn design_matrix(&self, parameters: &[Parameter]) -> Mat<f64> {
        Mat::from_fn(self.rows.len(), parameters.len(), |i, j| {
            self.rows[i].get(parameters[j])
        })
    }

    /// True if at least one row carries a date.
    pub fn has_dates(&self) -> bool {
        self.rows.iter().any(|r| r.date.is_some())
    }

    /// Distinct years present, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().filter_map(Observation::year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.rows.iter().filter_map(Observation::year).max()
    }

    /// Rows from one year, or every row when `year` is `None`.
    pub fn filter_year(&self, year: Option<i32>) -> ObservationTable {
        match year {
            None => self.clone(),
            Some(y) => self.filter_years(&[y]),
        }
    }

    /// Rows whose year is one of `years`; undated rows are excluded.
    pub fn filter_years(&self, years: &[i32]) -> ObservationTable {
        self.rows
            .iter()
            .filter(|r| r.year().is_some_and(|y| years.contains(&y)))
            .cloned()
            .collect()
    }

    /// Chronological order; undated rows keep their relative order at the end.
    pub fn sorted_by_date(&self) -> ObservationTable {
        let mut rows = self.rows.clone();
        rows.sort_by_key(|r| (r.date.is_none(), r.date));
        Self { rows }
    }

    /// Ascending order of one parameter.
    pub fn sorted_by(&self, parameter: Parameter) -> ObservationTable {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.get(parameter).total_cmp(&b.get(parameter)));
        Self { rows }
    }
}

impl FromIterator<Observation> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: Option<(i32, u32, u32)>, bod5: f64) -> Observation {
        let date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        Observation::new(date, [7.0, 50.0, 6.0, 10.0, 20.0, bod5])
    }

    #[test]
    fn test_years_and_filters() {
        let table: ObservationTable = vec![
            obs(Some((2013, 5, 1)), 3.0),
            obs(Some((2012, 1, 15)), 4.0),
            obs(None, 5.0),
            obs(Some((2013, 2, 1)), 6.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.available_years(), vec![2012, 2013]);
        assert_eq!(table.latest_year(), Some(2013));
        assert_eq!(table.filter_year(Some(2013)).len(), 2);
        assert_eq!(table.filter_year(None).len(), 4);
        assert_eq!(table.filter_years(&[2011]).len(), 0);
    }

    #[test]
    fn test_sorted_by_date_puts_undated_last() {
        let table = ObservationTable::new(vec![
            obs(None, 1.0),
            obs(Some((2013, 5, 1)), 2.0),
            obs(Some((2012, 1, 15)), 3.0),
        ]);

        let sorted = table.sorted_by_date();
        assert_eq!(sorted.column(Parameter::Bod5), vec![3.0, 2.0, 1.0]);
        assert_eq!(sorted.rows()[0].month(), Some(1));
    }

    #[test]
    fn test_design_matrix_follows_parameter_order() {
        let table = ObservationTable::new(vec![obs(None, 3.5)]);
        let x = table.design_matrix(&[Parameter::Bod5, Parameter::Ph]);

        assert_eq!(x.ncols(), 2);
        assert_eq!(x[(0, 0)], 3.5);
        assert_eq!(x[(0, 1)], 7.0);
    }

    #[test]
    fn test_sorted_by_parameter() {
        let table = ObservationTable::new(vec![obs(None, 9.0), obs(None, 1.0), obs(None, 4.0)]);
        assert_eq!(
            table.sorted_by(Parameter::Bod5).column(Parameter::Bod5),
            vec![1.0, 4.0, 9.0]
        );
    }
}
