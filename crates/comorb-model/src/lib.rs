//! Data model for comorbidity index computation.
//!
//! Diagnosis records come in, patient × category matrices and patient × month
//! risk tables come out. Everything here is in-memory and recomputed per run.

pub mod categories;
pub mod diagnosis;
pub mod enums;
pub mod error;
pub mod matrix;
pub mod risk;

pub use categories::{
    CHARLSON_CATEGORIES, ELIXHAUSER_CATEGORIES, categories_for, category_label,
};
pub use diagnosis::{CodeRow, DiagnosisRecord, month_start};
pub use enums::{IcdVersion, ScoreType, WeightScheme};
pub use error::{ModelError, Result};
pub use matrix::ComorbidityMatrix;
pub use risk::{PATIENT_ID_COLUMN, PatientScore, RiskScoreSeries, risk_column_label};
