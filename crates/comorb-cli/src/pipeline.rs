//! Pipeline stages behind the CLI commands.
//!
//! Every stage is generic over the scorer so the commands run against R while
//! tests drive the same code with the in-process fakes.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, info_span, trace};

use comorb_core::{
    ComorbidityScorer, MonthProgress, PipelineError, ScoringOptions, build_combined_matrix,
    build_risk_series_over_months,
};
use comorb_ingest::{DiagnosisColumns, DiagnosisTable, IngestOptions, load_diagnoses};
use comorb_model::{
    ComorbidityMatrix, DiagnosisRecord, IcdVersion, RiskScoreSeries, category_label,
};
use comorb_output::{write_matrix_csv, write_risk_series_csv};

use crate::logging::redact_value;

/// Combined matrix of a cohort and one risk score per matrix row.
#[derive(Debug, Clone)]
pub struct MatrixOutcome {
    pub matrix: ComorbidityMatrix,
    pub scores: Vec<f64>,
}

/// Patients flagged in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub label: String,
    pub patients: usize,
}

/// Distribution of a score vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreStats {
    pub count: usize,
    pub nonzero: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ScoreStats {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let sum: f64 = scores.iter().sum();
        Self {
            count: scores.len(),
            nonzero: scores.iter().filter(|score| **score != 0.0).count(),
            mean: sum / scores.len() as f64,
            min: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

pub fn ingest(
    input: &Path,
    columns: &DiagnosisColumns,
    options: &IngestOptions,
) -> Result<DiagnosisTable> {
    let span = info_span!("ingest", path = %input.display());
    let _guard = span.enter();
    let start = Instant::now();
    let table = load_diagnoses(input, columns, options)
        .with_context(|| format!("load diagnoses from {}", input.display()))?;
    info!(
        records = table.records.len(),
        icd9 = table.count_by_version(IcdVersion::Icd9),
        icd10 = table.count_by_version(IcdVersion::Icd10),
        skipped = table.skipped_unknown_version + table.skipped_blank_code,
        duration_ms = start.elapsed().as_millis(),
        "diagnoses loaded"
    );
    Ok(table)
}

/// Builds the combined matrix of all records and scores it.
pub fn score_cohort<S>(
    records: &[DiagnosisRecord],
    options: &ScoringOptions,
    scorer: &S,
) -> Result<MatrixOutcome>
where
    S: ComorbidityScorer + ?Sized,
{
    let span = info_span!("score", score_type = %options.score_type, weights = %options.weights);
    let _guard = span.enter();
    options.validate()?;

    let matrix = build_combined_matrix(
        records,
        options.score_type,
        options.cohort_policy,
        scorer,
    )
    .context("build combined comorbidity matrix")?;
    let scores = scorer
        .risk_scores(&matrix, options.weights, &options.scoring_mapping())
        .context("compute risk scores")?;
    if scores.len() != matrix.height() {
        return Err(PipelineError::ScoreLengthMismatch {
            expected: matrix.height(),
            found: scores.len(),
        }
        .into());
    }
    for (patient_id, score) in matrix.patient_ids().iter().zip(&scores) {
        trace!(patient_id = redact_value(patient_id), score, "patient scored");
    }
    info!(patients = matrix.height(), "cohort scored");
    Ok(MatrixOutcome { matrix, scores })
}

/// Monthly risk series over a loaded table.
///
/// Skipped rows take part in month bucketing through
/// [`DiagnosisTable::unscored_months`].
pub fn risk_over_time<S, F>(
    table: &DiagnosisTable,
    options: &ScoringOptions,
    scorer: &S,
    on_month: F,
) -> Result<RiskScoreSeries>
where
    S: ComorbidityScorer + ?Sized,
    F: FnMut(MonthProgress),
{
    let span = info_span!("risk_series", score_type = %options.score_type);
    let _guard = span.enter();
    let series = build_risk_series_over_months(
        &table.records,
        &table.unscored_months,
        options,
        scorer,
        on_month,
    )
    .context("compute risk over time")?;
    Ok(series)
}

/// Patients per category, in catalog order.
pub fn category_counts(matrix: &ComorbidityMatrix) -> Vec<CategoryCount> {
    matrix
        .categories()
        .iter()
        .zip(matrix.prevalence())
        .map(|(category, patients)| CategoryCount {
            category: category.clone(),
            label: category_label(category).map_or_else(|| category.clone(), str::to_string),
            patients,
        })
        .collect()
}

/// Scores of the most recent month column.
pub fn latest_scores(series: &RiskScoreSeries) -> Vec<f64> {
    series
        .rows()
        .filter_map(|(_, scores)| scores.last().copied())
        .collect()
}

pub fn output_matrix(path: &Path, outcome: &MatrixOutcome) -> Result<()> {
    write_matrix_csv(path, &outcome.matrix, Some(&outcome.scores))
        .with_context(|| format!("write matrix to {}", path.display()))
}

pub fn output_series(path: &Path, series: &RiskScoreSeries) -> Result<()> {
    write_risk_series_csv(path, series)
        .with_context(|| format!("write risk series to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_empty_scores_are_zero() {
        assert_eq!(ScoreStats::from_scores(&[]), ScoreStats::default());
    }

    #[test]
    fn stats_summarize_scores() {
        let stats = ScoreStats::from_scores(&[0.0, 2.0, 4.0]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.nonzero, 2);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 4.0);
    }
}
