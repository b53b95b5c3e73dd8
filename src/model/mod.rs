//! Simple predictive models built on the OLS core.

mod formula;
mod least_squares;
mod trend;

pub use formula::{
    Bod5Estimate, Bod5Formula, ComparisonSeries, FormulaEvaluation, InvalidInputError,
    QualityBand,
};
pub use least_squares::{pairwise_fit, polyfit, LeastSquaresFit, PairwiseFit, Polynomial};
pub use trend::{
    expected_quality, DescriptiveStats, FitQuality, TrendAnalysis, TrendDirection,
    YearProjection, FALLBACK_LATEST_YEAR, MAX_PROJECTION_YEARS, MONTHS_PER_YEAR, STABLE_SLOPE,
};
