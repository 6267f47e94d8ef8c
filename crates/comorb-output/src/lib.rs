//! Output writers for comorbidity results.

pub mod csv;
pub mod error;

pub use crate::csv::{
    SCORE_COLUMN, default_risk_output_path, write_matrix_csv, write_risk_series_csv,
};
pub use error::{OutputError, Result};
