//! Measurement loading, cleaning, and tabular access.

mod columns;
mod loader;
mod series;
mod table;

pub use columns::{Parameter, UnknownParameter, DATE_HEADER, SENTINEL_TOKENS, VALIDATION_YEARS};
pub use loader::{
    load_from_reader, load_observations, load_validation_observations, DataLoadError,
    LoadOutcome, LoadSummary, Loader,
};
pub use series::TimeSeries;
pub use table::{Observation, ObservationTable};
