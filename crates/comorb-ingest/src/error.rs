//! Error types for diagnosis ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a diagnosis table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("diagnosis file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to open or read the file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Malformed CSV record.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// File has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    // === Diagnosis Errors ===
    /// Required column not present after header normalization.
    #[error("required column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },

    /// Cell value could not be interpreted.
    #[error("invalid {field} value '{value}' on line {line}")]
    InvalidValue {
        field: &'static str,
        value: String,
        line: usize,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/Diagnosis.txt"),
        };
        assert_eq!(err.to_string(), "diagnosis file not found: /data/Diagnosis.txt");
    }

    #[test]
    fn test_invalid_value_names_line() {
        let err = IngestError::InvalidValue {
            field: "diagnosis_datetime",
            value: "yesterday".to_string(),
            line: 7,
        };
        assert_eq!(
            err.to_string(),
            "invalid diagnosis_datetime value 'yesterday' on line 7"
        );
    }
}
