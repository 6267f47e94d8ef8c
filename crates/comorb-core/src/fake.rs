//! Deterministic in-process scorers.
//!
//! Neither fake knows the real Charlson or Elixhauser tables. They return
//! whatever the caller configured and record every call so pipeline tests can
//! check what the scorer was asked.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use comorb_model::{
    CodeRow, ComorbidityMatrix, IcdVersion, ScoreType, WeightScheme, categories_for,
};

use crate::error::ScorerError;
use crate::scorer::ComorbidityScorer;

/// One recorded scorer invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ScorerCall {
    Matrix {
        icd_version: IcdVersion,
        score_type: ScoreType,
        rows: Vec<CodeRow>,
    },
    Risk {
        weights: WeightScheme,
        mapping: String,
        patient_ids: Vec<String>,
    },
}

#[derive(Debug, Default)]
struct CallLog(Mutex<Vec<ScorerCall>>);

impl CallLog {
    fn push(&self, call: ScorerCall) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn snapshot(&self) -> Vec<ScorerCall> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Scorer driven by a code → category table.
///
/// A patient gets `1` in a category when any of their codes maps to it, one
/// row per distinct patient in first-appearance order. The risk score is the
/// weighted sum of a row (weights default to `1.0`).
#[derive(Debug)]
pub struct LookupScorer {
    categories: Vec<String>,
    codes: HashMap<(IcdVersion, String), Vec<usize>>,
    weights: Vec<f64>,
    calls: CallLog,
}

impl LookupScorer {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        let weights = vec![1.0; categories.len()];
        Self {
            categories,
            codes: HashMap::new(),
            weights,
            calls: CallLog::default(),
        }
    }

    /// Uses the full category set of an index.
    pub fn for_score(score_type: ScoreType) -> Self {
        Self::new(categories_for(score_type).iter().copied())
    }

    /// Maps a code of one ICD revision to a category. Unknown categories are ignored.
    #[must_use]
    pub fn with_code(mut self, version: IcdVersion, code: &str, category: &str) -> Self {
        if let Some(idx) = self.categories.iter().position(|c| c == category) {
            self.codes
                .entry((version, code.to_string()))
                .or_default()
                .push(idx);
        }
        self
    }

    #[must_use]
    pub fn with_weight(mut self, category: &str, weight: f64) -> Self {
        if let Some(idx) = self.categories.iter().position(|c| c == category) {
            self.weights[idx] = weight;
        }
        self
    }

    pub fn calls(&self) -> Vec<ScorerCall> {
        self.calls.snapshot()
    }
}

impl ComorbidityScorer for LookupScorer {
    fn comorbidity_matrix(
        &self,
        rows: &[CodeRow],
        icd_version: IcdVersion,
        score_type: ScoreType,
    ) -> Result<ComorbidityMatrix, ScorerError> {
        self.calls.push(ScorerCall::Matrix {
            icd_version,
            score_type,
            rows: rows.to_vec(),
        });

        let mut order: Vec<&str> = Vec::new();
        let mut flags: HashMap<&str, Vec<i64>> = HashMap::new();
        for row in rows {
            let cells = flags.entry(row.patient_id.as_str()).or_insert_with(|| {
                order.push(row.patient_id.as_str());
                vec![0; self.categories.len()]
            });
            if let Some(indices) = self.codes.get(&(icd_version, row.icd_code.clone())) {
                for &idx in indices {
                    cells[idx] = 1;
                }
            }
        }

        let mut matrix = ComorbidityMatrix::new(self.categories.iter().cloned());
        for patient_id in order {
            let cells = flags.remove(patient_id).unwrap_or_default();
            matrix.push_row(patient_id, cells)?;
        }
        Ok(matrix)
    }

    fn risk_scores(
        &self,
        matrix: &ComorbidityMatrix,
        weights: WeightScheme,
        mapping: &str,
    ) -> Result<Vec<f64>, ScorerError> {
        self.calls.push(ScorerCall::Risk {
            weights,
            mapping: mapping.to_string(),
            patient_ids: matrix.patient_ids().to_vec(),
        });
        if matrix.categories() != self.categories.as_slice() {
            return Err(ScorerError::Output(format!(
                "matrix categories [{}] do not match the lookup table",
                matrix.categories().join(", ")
            )));
        }
        Ok(matrix
            .rows()
            .map(|(_, values)| {
                values
                    .iter()
                    .zip(&self.weights)
                    .map(|(&value, weight)| value as f64 * weight)
                    .sum()
            })
            .collect())
    }
}

/// Scorer returning caller-specified matrices per ICD revision.
///
/// Risk scores are the configured vector when set, otherwise each row's cell
/// total.
#[derive(Debug, Default)]
pub struct FixedScorer {
    matrices: HashMap<IcdVersion, ComorbidityMatrix>,
    scores: Option<Vec<f64>>,
    calls: CallLog,
}

impl FixedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_matrix(mut self, version: IcdVersion, matrix: ComorbidityMatrix) -> Self {
        self.matrices.insert(version, matrix);
        self
    }

    #[must_use]
    pub fn with_scores(mut self, scores: Vec<f64>) -> Self {
        self.scores = Some(scores);
        self
    }

    pub fn calls(&self) -> Vec<ScorerCall> {
        self.calls.snapshot()
    }

    /// Number of matrix requests per ICD revision.
    pub fn matrix_calls(&self, version: IcdVersion) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(call, ScorerCall::Matrix { icd_version, .. } if *icd_version == version)
            })
            .count()
    }
}

impl ComorbidityScorer for FixedScorer {
    fn comorbidity_matrix(
        &self,
        rows: &[CodeRow],
        icd_version: IcdVersion,
        score_type: ScoreType,
    ) -> Result<ComorbidityMatrix, ScorerError> {
        self.calls.push(ScorerCall::Matrix {
            icd_version,
            score_type,
            rows: rows.to_vec(),
        });
        self.matrices.get(&icd_version).cloned().ok_or_else(|| {
            ScorerError::Unavailable(format!("no fixed matrix configured for {icd_version}"))
        })
    }

    fn risk_scores(
        &self,
        matrix: &ComorbidityMatrix,
        weights: WeightScheme,
        mapping: &str,
    ) -> Result<Vec<f64>, ScorerError> {
        self.calls.push(ScorerCall::Risk {
            weights,
            mapping: mapping.to_string(),
            patient_ids: matrix.patient_ids().to_vec(),
        });
        Ok(match &self.scores {
            Some(scores) => scores.clone(),
            None => matrix
                .row_totals()
                .into_iter()
                .map(|total| total as f64)
                .collect(),
        })
    }
}

/// Distinct patients across recorded matrix calls, for assertions.
pub fn patients_in_calls(calls: &[ScorerCall]) -> HashSet<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            ScorerCall::Matrix { rows, .. } => Some(rows),
            ScorerCall::Risk { .. } => None,
        })
        .flatten()
        .map(|row| row.patient_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_scorer_flags_and_weights() {
        let scorer = LookupScorer::new(["chf", "diab"])
            .with_code(IcdVersion::Icd10, "I50", "chf")
            .with_code(IcdVersion::Icd10, "E11", "diab")
            .with_weight("chf", 2.0);
        let rows = [
            CodeRow::new("P2", "E11"),
            CodeRow::new("P1", "I50"),
            CodeRow::new("P1", "I50"),
            CodeRow::new("P2", "ZZZ"),
        ];
        let matrix = scorer
            .comorbidity_matrix(&rows, IcdVersion::Icd10, ScoreType::Charlson)
            .expect("matrix");
        assert_eq!(matrix.patient_ids(), ["P2", "P1"]);
        assert_eq!(matrix.row("P1"), Some(&[1, 0][..]));
        assert_eq!(matrix.row("P2"), Some(&[0, 1][..]));

        let scores = scorer
            .risk_scores(&matrix, WeightScheme::Charlson, "charlson_icd10_quan")
            .expect("scores");
        assert_eq!(scores, vec![1.0, 2.0]);
        assert_eq!(scorer.calls().len(), 2);
    }

    #[test]
    fn lookup_scorer_respects_icd_version() {
        let scorer =
            LookupScorer::new(["hypunc"]).with_code(IcdVersion::Icd10, "I10", "hypunc");
        let matrix = scorer
            .comorbidity_matrix(&[CodeRow::new("P1", "I10")], IcdVersion::Icd9, ScoreType::Elixhauser)
            .expect("matrix");
        assert_eq!(matrix.row("P1"), Some(&[0][..]));
    }

    #[test]
    fn fixed_scorer_without_matrix_is_unavailable() {
        let scorer = FixedScorer::new();
        let err = scorer
            .comorbidity_matrix(&[], IcdVersion::Icd9, ScoreType::Charlson)
            .unwrap_err();
        assert!(matches!(err, ScorerError::Unavailable(_)));
        assert_eq!(scorer.matrix_calls(IcdVersion::Icd9), 1);
    }
}
