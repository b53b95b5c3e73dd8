//! Descriptive statistics, trend direction and multi-year projection of a
//! single parameter.

use super::least_squares::{polyfit, Polynomial};
use crate::data::{ObservationTable, Parameter};
use crate::solvers::RegressionError;
use crate::utils::{mean, median, population_std};
use serde::Serialize;
use std::fmt;

/// Slope magnitude (per sample) below which a series counts as stable.
pub const STABLE_SLOPE: f64 = 0.1;

/// Longest projection horizon, in years.
pub const MAX_PROJECTION_YEARS: usize = 4;

/// Projected values per future year.
pub const MONTHS_PER_YEAR: usize = 12;

/// First year assumed as "latest" when the data carries no dates.
pub const FALLBACK_LATEST_YEAR: i32 = 2024;

/// Summary statistics of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub range: f64,
}

impl DescriptiveStats {
    pub fn from_values(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (min, max) = if values.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            (min, max)
        };

        Self {
            count: values.len(),
            mean: mean(values),
            std_dev: population_std(values),
            min,
            max,
            median: median(values),
            range: max - min,
        }
    }
}

/// Direction of a linear trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > STABLE_SLOPE {
            TrendDirection::Rising
        } else if slope < -STABLE_SLOPE {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    }

    /// Whether the direction improves water quality for `parameter`.
    ///
    /// Rising dissolved oxygen is favourable; for every other parameter a
    /// falling value is. `None` for a stable series.
    pub fn is_favourable_for(self, parameter: Parameter) -> Option<bool> {
        let rising_is_good = parameter == Parameter::DissolvedOxygen;
        match self {
            TrendDirection::Stable => None,
            TrendDirection::Rising => Some(rising_is_good),
            TrendDirection::Falling => Some(!rising_is_good),
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendDirection::Rising => "Ascendente",
            TrendDirection::Falling => "Descendente",
            TrendDirection::Stable => "Estable",
        })
    }
}

/// Verbal grade of a coefficient of determination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitQuality {
    Excellent,
    Good,
    Moderate,
    Weak,
}

impl FitQuality {
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared > 0.8 {
            FitQuality::Excellent
        } else if r_squared > 0.6 {
            FitQuality::Good
        } else if r_squared > 0.4 {
            FitQuality::Moderate
        } else {
            FitQuality::Weak
        }
    }
}

/// Expected water quality class for a projected yearly mean.
///
/// Defined for dissolved oxygen, COD and BOD5 only.
pub fn expected_quality(parameter: Parameter, value: f64) -> Option<&'static str> {
    let label = match parameter {
        Parameter::DissolvedOxygen if value > 6.0 => "Buena",
        Parameter::DissolvedOxygen if value > 4.0 => "Aceptable",
        Parameter::DissolvedOxygen => "Deficiente",
        Parameter::Cod if value < 40.0 => "Buena",
        Parameter::Cod if value < 100.0 => "Moderada",
        Parameter::Cod => "Alta",
        Parameter::Bod5 if value < 3.0 => "Excelente",
        Parameter::Bod5 if value < 6.0 => "Buena",
        Parameter::Bod5 if value < 30.0 => "Aceptable",
        Parameter::Bod5 => "Contaminada",
        _ => return None,
    };
    Some(label)
}

/// Projected monthly values of one future year.
#[derive(Debug, Clone, Serialize)]
pub struct YearProjection {
    pub year: i32,
    pub monthly: Vec<f64>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub quality: Option<&'static str>,
}

/// Trend of one parameter over the sample index.
#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    pub parameter: Parameter,
    pub stats: DescriptiveStats,
    pub linear: Polynomial,
    /// `None` when there are too few points for a quadratic.
    pub quadratic_r_squared: Option<f64>,
    pub fit_quality: FitQuality,
    pub direction: TrendDirection,
    pub favourable: Option<bool>,
    pub projections: Vec<YearProjection>,
    /// Relative change of the projected mean against the historical mean,
    /// in percent.
    pub projected_change_percent: f64,
}

impl TrendAnalysis {
    /// Slope of the linear trend per sample.
    pub fn slope(&self) -> f64 {
        self.linear.coefficients.get(1).copied().unwrap_or(0.0)
    }

    /// Analyse `parameter` in table order and project `years` ahead.
    ///
    /// `years` is clamped to `1..=4`.
    pub fn analyze(
        table: &ObservationTable,
        parameter: Parameter,
        years: usize,
    ) -> Result<Self, RegressionError> {
        let values = table.column(parameter);
        let index: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();

        let linear = polyfit(&index, &values, 1)?;
        let quadratic_r_squared = polyfit(&index, &values, 2).ok().map(|q| q.r_squared);
        let fit_r_squared = quadratic_r_squared.unwrap_or(linear.r_squared);

        let latest = table.latest_year().unwrap_or(FALLBACK_LATEST_YEAR);
        let years = years.clamp(1, MAX_PROJECTION_YEARS);
        let n = values.len();

        let projections: Vec<YearProjection> = (0..years)
            .map(|k| {
                let start = n + k * MONTHS_PER_YEAR;
                let monthly: Vec<f64> = (start..start + MONTHS_PER_YEAR)
                    .map(|t| linear.evaluate(t as f64))
                    .collect();
                let stats = DescriptiveStats::from_values(&monthly);
                YearProjection {
                    year: latest + k as i32 + 1,
                    quality: expected_quality(parameter, stats.mean),
                    mean: stats.mean,
                    min: stats.min,
                    max: stats.max,
                    monthly,
                }
            })
            .collect();

        let stats = DescriptiveStats::from_values(&values);
        let projected: Vec<f64> = projections
            .iter()
            .flat_map(|p| p.monthly.iter().copied())
            .collect();
        let projected_change_percent = (mean(&projected) - stats.mean) / stats.mean * 100.0;

        let slope = linear.coefficients.get(1).copied().unwrap_or(0.0);
        let direction = TrendDirection::from_slope(slope);
        tracing::debug!(
            parameter = %parameter,
            ?direction,
            years,
            "trend analysed"
        );

        Ok(Self {
            parameter,
            stats,
            fit_quality: FitQuality::from_r_squared(fit_r_squared),
            quadratic_r_squared,
            direction,
            favourable: direction.is_favourable_for(parameter),
            linear,
            projections,
            projected_change_percent,
        })
    }
}
