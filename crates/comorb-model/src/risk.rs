//! Per-patient risk scores across monthly cutoffs.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{ModelError, Result};

/// Header of the patient identifier column in risk outputs.
pub const PATIENT_ID_COLUMN: &str = "patient_id";

/// Column label for a month boundary, e.g. `Risk_2021-02-01`.
pub fn risk_column_label(month: NaiveDate) -> String {
    format!("Risk_{}", month.format("%Y-%m-01"))
}

/// One patient's scalar risk score for a single month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientScore {
    pub patient_id: String,
    pub score: f64,
}

impl PatientScore {
    pub fn new(patient_id: impl Into<String>, score: f64) -> Self {
        Self {
            patient_id: patient_id.into(),
            score,
        }
    }
}

/// Patient × month table of risk scores.
///
/// Columns are appended chronologically, one month at a time. A month merge
/// behaves like an outer join on patient id: patients missing from the new
/// month get `0.0` for it, and patients first seen in the new month get `0.0`
/// for every earlier month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskScoreSeries {
    months: Vec<NaiveDate>,
    patient_ids: Vec<String>,
    scores: Vec<Vec<f64>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RiskScoreSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    pub fn column_labels(&self) -> Vec<String> {
        self.months.iter().copied().map(risk_column_label).collect()
    }

    pub fn patient_ids(&self) -> &[String] {
        &self.patient_ids
    }

    pub fn patient_count(&self) -> usize {
        self.patient_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Scores for a patient, one per month column.
    pub fn scores_for(&self, patient_id: &str) -> Option<&[f64]> {
        self.index
            .get(patient_id)
            .map(|&idx| self.scores[idx].as_slice())
    }

    pub fn score(&self, patient_id: &str, month: NaiveDate) -> Option<f64> {
        let col = self.months.iter().position(|m| *m == month)?;
        self.scores_for(patient_id).map(|row| row[col])
    }

    /// Iterates `(patient_id, scores)` in row order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.patient_ids
            .iter()
            .zip(&self.scores)
            .map(|(id, scores)| (id.as_str(), scores.as_slice()))
    }

    /// Outer-merges one month of scores into the series.
    ///
    /// Existing rows keep their position; new patients are appended in the
    /// order given. A month must be later than every existing column and a
    /// patient may appear only once per month.
    pub fn merge_month(&mut self, month: NaiveDate, month_scores: &[PatientScore]) -> Result<()> {
        if let Some(last) = self.months.last()
            && month <= *last
        {
            return Err(ModelError::MonthOrder {
                month,
                last: *last,
            });
        }
        let mut seen = HashSet::with_capacity(month_scores.len());
        for entry in month_scores {
            if !seen.insert(entry.patient_id.as_str()) {
                return Err(ModelError::DuplicatePatient {
                    patient_id: entry.patient_id.clone(),
                });
            }
        }

        let earlier = self.months.len();
        self.months.push(month);
        for row in &mut self.scores {
            row.push(0.0);
        }
        for entry in month_scores {
            match self.index.get(&entry.patient_id) {
                Some(&idx) => self.scores[idx][earlier] = entry.score,
                None => {
                    let mut row = vec![0.0; earlier + 1];
                    row[earlier] = entry.score;
                    self.index
                        .insert(entry.patient_id.clone(), self.patient_ids.len());
                    self.patient_ids.push(entry.patient_id.clone());
                    self.scores.push(row);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, m, 1).expect("valid date")
    }

    #[test]
    fn column_label_uses_first_of_month() {
        let date = NaiveDate::from_ymd_opt(2021, 2, 17).expect("valid date");
        assert_eq!(risk_column_label(date), "Risk_2021-02-01");
    }

    #[test]
    fn merge_zero_fills_both_directions() {
        let mut series = RiskScoreSeries::new();
        series
            .merge_month(month(2021, 2), &[PatientScore::new("P1", 3.0)])
            .expect("first month");
        series
            .merge_month(month(2021, 3), &[PatientScore::new("P2", 5.0)])
            .expect("second month");

        assert_eq!(series.patient_ids(), ["P1", "P2"]);
        assert_eq!(series.scores_for("P1"), Some(&[3.0, 0.0][..]));
        assert_eq!(series.scores_for("P2"), Some(&[0.0, 5.0][..]));
    }

    #[test]
    fn merge_rejects_out_of_order_months() {
        let mut series = RiskScoreSeries::new();
        series.merge_month(month(2021, 3), &[]).expect("first month");
        assert!(series.merge_month(month(2021, 2), &[]).is_err());
    }

    #[test]
    fn merge_rejects_duplicate_patient_in_month() {
        let mut series = RiskScoreSeries::new();
        let scores = [PatientScore::new("P1", 1.0), PatientScore::new("P1", 2.0)];
        assert!(matches!(
            series.merge_month(month(2021, 2), &scores),
            Err(ModelError::DuplicatePatient { .. })
        ));
    }
}
