//! Diagnosis table loading.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use comorb_model::{DiagnosisRecord, IcdVersion, month_start};

use crate::csv_table::{CsvTable, IngestOptions, normalize_header, read_csv_table_with_options};
use crate::datetime::parse_timestamp;
use crate::error::{IngestError, Result};

/// Source column names for the four diagnosis attributes.
///
/// Names are compared after header normalization, so `ICD_TYPE` and
/// `icd_type` are equivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisColumns {
    pub patient_id: String,
    pub icd_code: String,
    /// Column holding the ICD revision (9 or 10).
    pub icd_type: String,
    pub diagnosis_datetime: String,
}

impl Default for DiagnosisColumns {
    fn default() -> Self {
        Self {
            patient_id: "patient_id".to_string(),
            icd_code: "icd_code".to_string(),
            icd_type: "icd_type".to_string(),
            diagnosis_datetime: "diagnosis_datetime".to_string(),
        }
    }
}

impl DiagnosisColumns {
    #[must_use]
    pub fn with_patient_id(mut self, name: impl Into<String>) -> Self {
        self.patient_id = name.into();
        self
    }

    #[must_use]
    pub fn with_icd_code(mut self, name: impl Into<String>) -> Self {
        self.icd_code = name.into();
        self
    }

    #[must_use]
    pub fn with_icd_type(mut self, name: impl Into<String>) -> Self {
        self.icd_type = name.into();
        self
    }

    #[must_use]
    pub fn with_diagnosis_datetime(mut self, name: impl Into<String>) -> Self {
        self.diagnosis_datetime = name.into();
        self
    }
}

/// Parsed diagnosis records plus counts of rows left out.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisTable {
    pub records: Vec<DiagnosisRecord>,
    /// Rows whose ICD type is neither 9 nor 10.
    pub skipped_unknown_version: usize,
    /// Rows with a blank ICD code.
    pub skipped_blank_code: usize,
    /// Sorted distinct months of skipped rows with a readable timestamp.
    ///
    /// Skipped rows are not scored but still count as diagnosis months.
    pub unscored_months: Vec<NaiveDate>,
}

impl DiagnosisTable {
    pub fn count_by_version(&self, version: IcdVersion) -> usize {
        self.records
            .iter()
            .filter(|record| record.icd_version == version)
            .count()
    }
}

/// Reads a delimited diagnosis file into typed records.
pub fn load_diagnoses(
    path: &Path,
    columns: &DiagnosisColumns,
    options: &IngestOptions,
) -> Result<DiagnosisTable> {
    let table = read_csv_table_with_options(path, options)?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.headers.len(),
        "read diagnosis table"
    );
    diagnoses_from_table(&table, columns)
}

/// Converts an already-read table into diagnosis records.
pub fn diagnoses_from_table(table: &CsvTable, columns: &DiagnosisColumns) -> Result<DiagnosisTable> {
    let patient_idx = require_column(table, &columns.patient_id)?;
    let code_idx = require_column(table, &columns.icd_code)?;
    let type_idx = require_column(table, &columns.icd_type)?;
    let datetime_idx = require_column(table, &columns.diagnosis_datetime)?;

    let mut out = DiagnosisTable::default();
    for (row, &line) in table.rows.iter().zip(&table.lines) {
        let raw_datetime = row[datetime_idx].as_str();
        let icd_type = row[type_idx].as_str();
        let Some(icd_version) = parse_icd_version(icd_type) else {
            out.skipped_unknown_version += 1;
            out.unscored_months.extend(row_month(raw_datetime));
            continue;
        };
        let icd_code = row[code_idx].as_str();
        if icd_code.is_empty() {
            out.skipped_blank_code += 1;
            out.unscored_months.extend(row_month(raw_datetime));
            continue;
        }
        let patient_id = row[patient_idx].as_str();
        if patient_id.is_empty() {
            return Err(IngestError::InvalidValue {
                field: "patient_id",
                value: String::new(),
                line,
            });
        }
        let diagnosed_at =
            parse_timestamp(raw_datetime).ok_or_else(|| IngestError::InvalidValue {
                field: "diagnosis_datetime",
                value: raw_datetime.to_string(),
                line,
            })?;
        out.records.push(DiagnosisRecord::new(
            patient_id,
            icd_code,
            icd_version,
            diagnosed_at,
        ));
    }

    out.unscored_months.sort_unstable();
    out.unscored_months.dedup();
    if out.skipped_unknown_version > 0 {
        warn!(
            rows = out.skipped_unknown_version,
            column = %columns.icd_type,
            "skipped rows with an ICD type other than 9 or 10"
        );
    }
    if out.skipped_blank_code > 0 {
        warn!(rows = out.skipped_blank_code, "skipped rows with a blank ICD code");
    }
    Ok(out)
}

fn row_month(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|at| month_start(at.date()))
}

fn require_column(table: &CsvTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| IngestError::MissingColumn {
            column: normalize_header(name),
            available: table.headers.join(", "),
        })
}

/// Reads an ICD revision cell: `9`, `10`, `9.0`, `ICD10`, `icd-9`.
pub fn parse_icd_version(value: &str) -> Option<IcdVersion> {
    let lowered = value.trim().to_lowercase();
    let digits = lowered
        .strip_prefix("icd")
        .map_or(lowered.as_str(), |rest| rest.trim_start_matches(['-', ' ']));
    let number = match digits.parse::<i64>() {
        Ok(number) => number,
        Err(_) => {
            let float = digits.parse::<f64>().ok()?;
            if float.fract() != 0.0 {
                return None;
            }
            float as i64
        }
    };
    IcdVersion::from_number(number)
}
