//! Loading and cleaning of delimited measurement files.

use super::columns::{Parameter, DATE_HEADER, SENTINEL_TOKENS, VALIDATION_YEARS};
use super::table::{Observation, ObservationTable};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a measurement file. None of them is retried.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input: {0}")]
    Read(#[source] std::io::Error),

    #[error("input is not valid tabular data: {0}")]
    Csv(#[from] csv::Error),

    #[error("input has no header row")]
    NoHeader,

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),
}

/// Row counts of one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Data rows in the source.
    pub rows_read: usize,
    /// Rows dropped for a missing required value.
    pub rows_incomplete: usize,
    /// Complete rows excluded by the year filter.
    pub rows_filtered: usize,
    /// Rows in the resulting table.
    pub rows_kept: usize,
}

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: ObservationTable,
    pub summary: LoadSummary,
}

/// Configurable loader.
///
/// ```rust,ignore
/// use wq_regress::data::Loader;
///
/// let outcome = Loader::new().load_path("rio.csv")?;
/// println!("{} rows kept", outcome.summary.rows_kept);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Loader {
    years: Option<Vec<i32>>,
}

impl Loader {
    /// Loader keeping every complete row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader restricted to the held-out validation years.
    pub fn validation() -> Self {
        Self::new().with_years(&VALIDATION_YEARS)
    }

    /// Keep only rows dated in one of `years`.
    pub fn with_years(mut self, years: &[i32]) -> Self {
        self.years = Some(years.to_vec());
        self
    }

    /// Load a file. The file is read fully and closed before parsing.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadOutcome, DataLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let outcome = self.parse(&bytes)?;
        tracing::info!(
            path = %path.display(),
            rows_read = outcome.summary.rows_read,
            rows_incomplete = outcome.summary.rows_incomplete,
            rows_filtered = outcome.summary.rows_filtered,
            rows_kept = outcome.summary.rows_kept,
            "loaded observations"
        );
        Ok(outcome)
    }

    /// Load from any reader.
    pub fn load_reader<R: Read>(&self, mut reader: R) -> Result<LoadOutcome, DataLoadError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(DataLoadError::Read)?;
        self.parse(&bytes)
    }

    fn parse(&self, bytes: &[u8]) -> Result<LoadOutcome, DataLoadError> {
        let delimiter = detect_delimiter(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| decode(h).trim_start_matches('\u{feff}').to_owned())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(DataLoadError::NoHeader);
        }

        let mut indices = [0usize; 6];
        for parameter in Parameter::ALL {
            indices[parameter.index()] = headers
                .iter()
                .position(|h| h == parameter.header())
                .ok_or(DataLoadError::MissingColumn(parameter.header()))?;
        }
        let date_index = headers.iter().position(|h| h == DATE_HEADER);
        let decimal_comma = delimiter == b';';

        let mut summary = LoadSummary::default();
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            summary.rows_read += 1;

            let field = |idx: usize| record.get(idx).map(decode).unwrap_or_default();

            let date = date_index.and_then(|idx| parse_date(&field(idx)));
            let mut values = [f64::NAN; 6];
            for (slot, &idx) in values.iter_mut().zip(indices.iter()) {
                *slot = parse_value(&field(idx), decimal_comma);
            }

            let observation = Observation::new(date, values);
            if !observation.is_complete() {
                summary.rows_incomplete += 1;
                continue;
            }
            if let Some(years) = &self.years {
                if !observation.year().is_some_and(|y| years.contains(&y)) {
                    summary.rows_filtered += 1;
                    continue;
                }
            }
            rows.push(observation);
        }

        summary.rows_kept = rows.len();
        if summary.rows_read > 0 && summary.rows_kept == 0 {
            tracing::warn!(rows_read = summary.rows_read, "no complete rows left after cleaning");
        }

        Ok(LoadOutcome {
            table: ObservationTable::new(rows),
            summary,
        })
    }
}

/// Load and clean a measurement file.
pub fn load_observations(path: impl AsRef<Path>) -> Result<ObservationTable, DataLoadError> {
    Loader::new().load_path(path).map(|o| o.table)
}

/// Load and clean a measurement file, keeping only the validation years.
pub fn load_validation_observations(
    path: impl AsRef<Path>,
) -> Result<ObservationTable, DataLoadError> {
    Loader::validation().load_path(path).map(|o| o.table)
}

/// Load and clean measurements from any reader.
pub fn load_from_reader<R: Read>(reader: R) -> Result<ObservationTable, DataLoadError> {
    Loader::new().load_reader(reader).map(|o| o.table)
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// `;` when the header line has more semicolons than commas, else `,`.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let commas = header.iter().filter(|&&b| b == b',').count();
    let semicolons = header.iter().filter(|&&b| b == b';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Numeric value of a cell; NaN marks a missing value.
fn parse_value(raw: &str, decimal_comma: bool) -> f64 {
    let cell = raw.trim();
    if cell.is_empty() || SENTINEL_TOKENS.contains(&cell) {
        return f64::NAN;
    }

    let parsed = cell.parse::<f64>().ok().or_else(|| {
        if decimal_comma && cell.matches(',').count() == 1 {
            cell.replacen(',', ".", 1).parse::<f64>().ok()
        } else {
            None
        }
    });

    match parsed {
        Some(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

const DAY_FIRST_FORMATS: [&str; 5] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"];
const SHORT_YEAR_FORMATS: [&str; 3] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];
const TIME_SUFFIXES: [&str; 4] = ["", " %H:%M:%S", " %H:%M", "T%H:%M:%S"];

/// Parse a day-first date, ignoring any time of day.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cell = raw.trim();
    if cell.is_empty() {
        return None;
    }

    let attempt = |format: &str, suffix: &str| -> Option<NaiveDate> {
        if suffix.is_empty() {
            NaiveDate::parse_from_str(cell, format).ok()
        } else {
            NaiveDateTime::parse_from_str(cell, &format!("{}{}", format, suffix))
                .ok()
                .map(|dt| dt.date())
        }
    };

    // A four-digit format also accepts "12" as year 12
    for format in DAY_FIRST_FORMATS {
        for suffix in TIME_SUFFIXES {
            if let Some(date) = attempt(format, suffix).filter(|d| d.year() >= 1000) {
                return Some(date);
            }
        }
    }
    for format in SHORT_YEAR_FORMATS {
        for suffix in TIME_SUFFIXES {
            if let Some(date) = attempt(format, suffix) {
                return Some(date);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_missing() {
        assert!(parse_value("<1", false).is_nan());
        assert!(parse_value(" <10 ", false).is_nan());
        assert!(parse_value("", false).is_nan());
    }

    #[test]
    fn test_only_listed_sentinels() {
        // Not a sentinel, but still not a number
        assert!(parse_value("<100", false).is_nan());
        assert_eq!(parse_value("100", false), 100.0);
    }

    #[test]
    fn test_non_finite_is_missing() {
        assert!(parse_value("inf", false).is_nan());
        assert!(parse_value("NaN", false).is_nan());
        assert!(parse_value("abc", false).is_nan());
    }

    #[test]
    fn test_decimal_comma_only_with_semicolons() {
        assert_eq!(parse_value("7,25", true), 7.25);
        assert!(parse_value("7,25", false).is_nan());
        assert_eq!(parse_value("1e2", false), 100.0);
    }

    #[test]
    fn test_parse_day_first_dates() {
        let d = parse_date("05/03/2012").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2012, 3, 5));

        let d = parse_date("5-3-2013 10:30").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2013, 3, 5));

        let d = parse_date("2014-11-02").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2014, 11, 2));

        let d = parse_date("05/03/12").unwrap();
        assert_eq!(d.year(), 2012);

        assert!(parse_date("not a date").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"a;b;c\n1,5;2;3"), b';');
        assert_eq!(detect_delimiter(b"a,b,c\n1;2,3,4"), b',');
    }

    #[test]
    fn test_missing_column() {
        let csv = "pH_CAMPO,DQO_TOT,OD_mg/L,SST,TEMP_AGUA\n7,50,6,10,20\n";
        let result = Loader::new().load_reader(csv.as_bytes());
        assert!(matches!(result, Err(DataLoadError::MissingColumn("DBO5"))));
    }
}
