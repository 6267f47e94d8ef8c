//! Cohort pipeline: split diagnoses by ICD revision, score each half, combine.

use comorb_model::{CodeRow, ComorbidityMatrix, DiagnosisRecord, IcdVersion, ScoreType};
use tracing::{debug, info_span};

use crate::combine::combine;
use crate::error::{PipelineError, Result};
use crate::options::CohortPolicy;
use crate::scorer::ComorbidityScorer;

/// Diagnosis codes of one cohort, partitioned by ICD revision.
///
/// Each subset keeps the relative order of the source records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortSplit {
    pub icd9: Vec<CodeRow>,
    pub icd10: Vec<CodeRow>,
}

impl CohortSplit {
    pub fn rows(&self, version: IcdVersion) -> &[CodeRow] {
        match version {
            IcdVersion::Icd9 => &self.icd9,
            IcdVersion::Icd10 => &self.icd10,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.icd9.is_empty() && self.icd10.is_empty()
    }
}

/// Partitions diagnoses into ICD-9 and ICD-10 `(patient_id, icd_code)` rows.
pub fn split_by_version<'a, I>(diagnoses: I) -> CohortSplit
where
    I: IntoIterator<Item = &'a DiagnosisRecord>,
{
    let mut split = CohortSplit::default();
    for record in diagnoses {
        match record.icd_version {
            IcdVersion::Icd9 => split.icd9.push(record.code_row()),
            IcdVersion::Icd10 => split.icd10.push(record.code_row()),
        }
    }
    split
}

/// Builds the combined comorbidity matrix for a set of diagnoses.
///
/// Under [`CohortPolicy::Lenient`] an empty subset is skipped and the other
/// subset's matrix is returned as the scorer produced it. Under
/// [`CohortPolicy::Strict`] both subsets must be present, checked before the
/// scorer is called.
pub fn build_combined_matrix<'a, I, S>(
    diagnoses: I,
    score_type: ScoreType,
    policy: CohortPolicy,
    scorer: &S,
) -> Result<ComorbidityMatrix>
where
    I: IntoIterator<Item = &'a DiagnosisRecord>,
    S: ComorbidityScorer + ?Sized,
{
    let split = split_by_version(diagnoses);
    build_from_split(&split, score_type, policy, scorer)
}

/// Same as [`build_combined_matrix`] for an already partitioned cohort.
pub fn build_from_split<S>(
    split: &CohortSplit,
    score_type: ScoreType,
    policy: CohortPolicy,
    scorer: &S,
) -> Result<ComorbidityMatrix>
where
    S: ComorbidityScorer + ?Sized,
{
    let span = info_span!(
        "cohort",
        score_type = %score_type,
        icd9_rows = split.icd9.len(),
        icd10_rows = split.icd10.len()
    );
    let _guard = span.enter();

    if split.is_empty() {
        return Err(PipelineError::EmptyCohort);
    }
    if policy == CohortPolicy::Strict {
        for version in IcdVersion::ALL {
            if split.rows(version).is_empty() {
                return Err(PipelineError::MissingIcdSubset { version });
            }
        }
    }

    match (split.icd9.is_empty(), split.icd10.is_empty()) {
        (true, _) => {
            debug!("no ICD-9 codes, using the ICD-10 matrix as is");
            Ok(scorer.comorbidity_matrix(&split.icd10, IcdVersion::Icd10, score_type)?)
        }
        (_, true) => {
            debug!("no ICD-10 codes, using the ICD-9 matrix as is");
            Ok(scorer.comorbidity_matrix(&split.icd9, IcdVersion::Icd9, score_type)?)
        }
        (false, false) => {
            let icd9 = scorer.comorbidity_matrix(&split.icd9, IcdVersion::Icd9, score_type)?;
            let icd10 = scorer.comorbidity_matrix(&split.icd10, IcdVersion::Icd10, score_type)?;
            combine(&icd9, &icd10, score_type)
        }
    }
}
