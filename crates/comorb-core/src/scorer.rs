//! Boundary to the external comorbidity scorer.
//!
//! Grouping ICD codes into categories and weighting categories into a score
//! both happen outside this workspace. The pipeline only talks to the scorer
//! through [`ComorbidityScorer`], which lets tests swap in the deterministic
//! fakes from [`crate::fake`].

use comorb_model::{CodeRow, ComorbidityMatrix, IcdVersion, ScoreType, WeightScheme};

use crate::error::ScorerError;

pub trait ComorbidityScorer {
    /// Groups diagnosis codes of one ICD revision into a patient × category matrix.
    ///
    /// Implementations return one row per distinct patient in `rows` and the
    /// fixed category set of `score_type`.
    fn comorbidity_matrix(
        &self,
        rows: &[CodeRow],
        icd_version: IcdVersion,
        score_type: ScoreType,
    ) -> Result<ComorbidityMatrix, ScorerError>;

    /// Reduces a matrix to one risk score per patient, aligned to row order.
    fn risk_scores(
        &self,
        matrix: &ComorbidityMatrix,
        weights: WeightScheme,
        mapping: &str,
    ) -> Result<Vec<f64>, ScorerError>;
}

impl<T: ComorbidityScorer + ?Sized> ComorbidityScorer for &T {
    fn comorbidity_matrix(
        &self,
        rows: &[CodeRow],
        icd_version: IcdVersion,
        score_type: ScoreType,
    ) -> Result<ComorbidityMatrix, ScorerError> {
        (**self).comorbidity_matrix(rows, icd_version, score_type)
    }

    fn risk_scores(
        &self,
        matrix: &ComorbidityMatrix,
        weights: WeightScheme,
        mapping: &str,
    ) -> Result<Vec<f64>, ScorerError> {
        (**self).risk_scores(matrix, weights, mapping)
    }
}
