//! Monthly risk-score aggregation over a cumulative diagnosis window.
//!
//! Diagnoses are bucketed by calendar month. For every month after the first
//! one the cohort pipeline runs on all diagnoses up to the end of that month,
//! the scorer turns the combined matrix into one risk value per patient, and
//! the values become that month's column of the [`RiskScoreSeries`].
//!
//! Rows that were read but cannot be scored (an ICD type other than 9 or 10,
//! a blank code) still occupy their month, so callers pass those months in
//! alongside the scorable records.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, info_span, warn};

use comorb_model::{
    DiagnosisRecord, PatientScore, RiskScoreSeries, month_start, risk_column_label,
};

use crate::cohort::build_combined_matrix;
use crate::error::{PipelineError, Result};
use crate::options::ScoringOptions;
use crate::scorer::ComorbidityScorer;

/// Progress of the monthly loop, reported before each month is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthProgress {
    /// Zero-based position among the scored months.
    pub index: usize,
    /// Number of months that will be scored.
    pub total: usize,
    pub month: NaiveDate,
}

/// Sorted distinct month buckets (first day of month) present in `diagnoses`.
pub fn distinct_months(diagnoses: &[DiagnosisRecord]) -> Vec<NaiveDate> {
    distinct_months_with(diagnoses, &[])
}

/// Like [`distinct_months`], also counting the months of unscored rows.
pub fn distinct_months_with(
    diagnoses: &[DiagnosisRecord],
    unscored_months: &[NaiveDate],
) -> Vec<NaiveDate> {
    diagnoses
        .iter()
        .map(DiagnosisRecord::year_month)
        .chain(unscored_months.iter().copied().map(month_start))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Months that receive a risk column: every bucket except the earliest.
pub fn scored_months(diagnoses: &[DiagnosisRecord]) -> Vec<NaiveDate> {
    scored_months_with(diagnoses, &[])
}

pub fn scored_months_with(
    diagnoses: &[DiagnosisRecord],
    unscored_months: &[NaiveDate],
) -> Vec<NaiveDate> {
    distinct_months_with(diagnoses, unscored_months)
        .into_iter()
        .skip(1)
        .collect()
}

/// Builds the patient × month risk table.
pub fn build_risk_series<S>(
    diagnoses: &[DiagnosisRecord],
    options: &ScoringOptions,
    scorer: &S,
) -> Result<RiskScoreSeries>
where
    S: ComorbidityScorer + ?Sized,
{
    build_risk_series_with_progress(diagnoses, options, scorer, |_| {})
}

/// [`build_risk_series`] with a callback invoked before each month.
pub fn build_risk_series_with_progress<S, F>(
    diagnoses: &[DiagnosisRecord],
    options: &ScoringOptions,
    scorer: &S,
    on_month: F,
) -> Result<RiskScoreSeries>
where
    S: ComorbidityScorer + ?Sized,
    F: FnMut(MonthProgress),
{
    build_risk_series_over_months(diagnoses, &[], options, scorer, on_month)
}

/// Builds the risk table with month buckets taken from `diagnoses` plus
/// `unscored_months`.
///
/// A month whose window holds no scorable record gets a column with no
/// patient scores; existing rows are zero-filled as usual. Any failure aborts
/// the whole run; no partial series is returned.
pub fn build_risk_series_over_months<S, F>(
    diagnoses: &[DiagnosisRecord],
    unscored_months: &[NaiveDate],
    options: &ScoringOptions,
    scorer: &S,
    mut on_month: F,
) -> Result<RiskScoreSeries>
where
    S: ComorbidityScorer + ?Sized,
    F: FnMut(MonthProgress),
{
    options.validate()?;
    let mapping = options.scoring_mapping();

    let mut ordered: Vec<&DiagnosisRecord> = diagnoses.iter().collect();
    ordered.sort_by_key(|record| record.diagnosed_at);

    let months = scored_months_with(diagnoses, unscored_months);
    let mut series = RiskScoreSeries::new();
    if months.is_empty() {
        warn!(
            records = diagnoses.len(),
            unscored_months = unscored_months.len(),
            "fewer than two distinct diagnosis months, no risk columns to compute"
        );
        return Ok(series);
    }
    info!(
        score_type = %options.score_type,
        weights = %options.weights,
        months = months.len(),
        records = diagnoses.len(),
        "computing risk over time"
    );

    let total = months.len();
    let mut window_end = 0usize;
    for (index, month) in months.into_iter().enumerate() {
        on_month(MonthProgress {
            index,
            total,
            month,
        });
        let label = risk_column_label(month);
        let span = info_span!("month", month = %label);
        let _guard = span.enter();
        let start = Instant::now();

        // Records are time-ordered, so the cumulative window only grows.
        while window_end < ordered.len() && ordered[window_end].year_month() <= month {
            window_end += 1;
        }
        let window = &ordered[..window_end];
        if window.is_empty() {
            series.merge_month(month, &[])?;
            debug!("no scorable records up to this month");
            continue;
        }

        let matrix = build_combined_matrix(
            window.iter().copied(),
            options.score_type,
            options.cohort_policy,
            scorer,
        )?;
        let scores = scorer.risk_scores(&matrix, options.weights, &mapping)?;
        if scores.len() != matrix.height() {
            return Err(PipelineError::ScoreLengthMismatch {
                expected: matrix.height(),
                found: scores.len(),
            });
        }
        let month_scores: Vec<PatientScore> = matrix
            .patient_ids()
            .iter()
            .zip(scores)
            .map(|(patient_id, score)| PatientScore::new(patient_id.as_str(), score))
            .collect();
        series.merge_month(month, &month_scores)?;

        debug!(
            records = window.len(),
            patients = month_scores.len(),
            series_patients = series.patient_count(),
            duration_ms = start.elapsed().as_millis(),
            "month scored"
        );
    }

    info!(
        patients = series.patient_count(),
        columns = series.months().len(),
        "risk over time complete"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use comorb_model::IcdVersion;

    fn record(patient: &str, date: &str) -> DiagnosisRecord {
        let at = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid date");
        DiagnosisRecord::new(patient, "I10", IcdVersion::Icd10, at)
    }

    #[test]
    fn months_are_sorted_and_distinct() {
        let records = [
            record("P1", "2021-03-09"),
            record("P1", "2021-01-05"),
            record("P2", "2021-03-01"),
            record("P2", "2021-02-28"),
        ];
        let months: Vec<String> = distinct_months(&records)
            .into_iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2021-01-01", "2021-02-01", "2021-03-01"]);
        assert_eq!(scored_months(&records).len(), 2);
    }

    #[test]
    fn single_month_has_nothing_to_score() {
        let records = [record("P1", "2021-01-05"), record("P2", "2021-01-20")];
        assert!(scored_months(&records).is_empty());
        assert!(scored_months(&[]).is_empty());
    }

    #[test]
    fn unscored_months_join_the_buckets() {
        let records = [record("P1", "2021-02-05"), record("P1", "2021-03-05")];
        let unscored = [NaiveDate::from_ymd_opt(2021, 1, 2).expect("valid date")];
        let months: Vec<String> = scored_months_with(&records, &unscored)
            .into_iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2021-02-01", "2021-03-01"]);
        assert_eq!(scored_months(&records).len(), 1);
    }
}
