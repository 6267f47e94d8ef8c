//! Diagnosis table ingestion.
//!
//! Reads a delimited extract, normalizes headers to lowercase and turns each
//! usable row into a [`comorb_model::DiagnosisRecord`].

pub mod csv_table;
pub mod datetime;
pub mod diagnoses;
pub mod error;

pub use csv_table::{
    CsvTable, IngestOptions, normalize_header, read_csv_table, read_csv_table_with_options,
};
pub use datetime::parse_timestamp;
pub use diagnoses::{
    DiagnosisColumns, DiagnosisTable, diagnoses_from_table, load_diagnoses, parse_icd_version,
};
pub use error::{IngestError, Result};
