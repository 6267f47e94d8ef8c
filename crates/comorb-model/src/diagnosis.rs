use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::enums::IcdVersion;

/// One diagnosis event from the source table.
///
/// `patient_id` is not unique across records; a patient usually carries
/// several diagnoses over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub patient_id: String,
    pub icd_code: String,
    pub icd_version: IcdVersion,
    pub diagnosed_at: NaiveDateTime,
}

impl DiagnosisRecord {
    pub fn new(
        patient_id: impl Into<String>,
        icd_code: impl Into<String>,
        icd_version: IcdVersion,
        diagnosed_at: NaiveDateTime,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            icd_code: icd_code.into(),
            icd_version,
            diagnosed_at,
        }
    }

    /// First day of the month the diagnosis falls in.
    pub fn year_month(&self) -> NaiveDate {
        month_start(self.diagnosed_at.date())
    }

    pub fn code_row(&self) -> CodeRow {
        CodeRow {
            patient_id: self.patient_id.clone(),
            icd_code: self.icd_code.clone(),
        }
    }
}

/// `(patient_id, icd_code)` pair handed to the external scorer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeRow {
    pub patient_id: String,
    pub icd_code: String,
}

impl CodeRow {
    pub fn new(patient_id: impl Into<String>, icd_code: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            icd_code: icd_code.into(),
        }
    }
}

/// Truncates a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
