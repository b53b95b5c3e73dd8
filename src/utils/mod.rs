//! Shared numeric helpers.

mod matrix;
mod stats;

pub use matrix::{
    center_columns, center_vector, column_matrix, detect_constant_columns, select_columns, to_col,
};
pub use stats::{is_constant, mean, median, population_std, r_squared};
