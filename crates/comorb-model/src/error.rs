use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("patient '{patient_id}' appears more than once in the matrix")]
    DuplicatePatient { patient_id: String },
    #[error("row for patient '{patient_id}' has {found} values, expected {expected}")]
    RowWidth {
        patient_id: String,
        expected: usize,
        found: usize,
    },
    #[error("matrix has {patient_ids} patient ids but {rows} rows")]
    RowCount { patient_ids: usize, rows: usize },
    #[error("month {month} is not after the last risk column {last}")]
    MonthOrder { month: NaiveDate, last: NaiveDate },
    #[error("unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
