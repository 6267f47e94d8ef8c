//! Merging ICD-9 and ICD-10 derived comorbidity matrices.

use comorb_model::{ComorbidityMatrix, IcdVersion, ScoreType};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Combines the ICD-9 and ICD-10 matrices of one cohort into a single matrix.
///
/// Patients are outer-joined: a patient missing from one side counts as all
/// zeros for that side. Result rows list ICD-9 patients in their original
/// order followed by patients only present in the ICD-10 matrix.
///
/// For [`ScoreType::Charlson`] cell sums are kept as counts. For
/// [`ScoreType::Elixhauser`] both inputs must be presence flags (no cell above
/// one) and every positive sum is clamped to one, so a category flagged from
/// both revisions is not counted twice.
pub fn combine(
    icd9: &ComorbidityMatrix,
    icd10: &ComorbidityMatrix,
    score_type: ScoreType,
) -> Result<ComorbidityMatrix> {
    if icd9.categories() != icd10.categories() {
        return Err(PipelineError::SchemaMismatch {
            icd9: icd9.categories().join(", "),
            icd10: icd10.categories().join(", "),
        });
    }
    if score_type.is_binary() {
        ensure_presence_flags(icd9, IcdVersion::Icd9)?;
        ensure_presence_flags(icd10, IcdVersion::Icd10)?;
    }

    let width = icd9.categories().len();
    let zeros = vec![0; width];
    let mut combined = ComorbidityMatrix::new(icd9.categories().iter().cloned());

    for (patient_id, left) in icd9.rows() {
        let right = icd10.row(patient_id).unwrap_or(zeros.as_slice());
        combined.push_row(patient_id, sum_cells(left, right, score_type))?;
    }
    let mut icd10_only = 0usize;
    for (patient_id, right) in icd10.rows() {
        if icd9.contains(patient_id) {
            continue;
        }
        icd10_only += 1;
        combined.push_row(patient_id, sum_cells(&zeros, right, score_type))?;
    }

    debug!(
        score_type = %score_type,
        icd9_patients = icd9.height(),
        icd10_patients = icd10.height(),
        icd10_only,
        combined_patients = combined.height(),
        "combined comorbidity matrices"
    );
    Ok(combined)
}

fn ensure_presence_flags(matrix: &ComorbidityMatrix, side: IcdVersion) -> Result<()> {
    match matrix.first_value_above(1) {
        Some((patient_id, category, value)) => Err(PipelineError::CategoryOverflow {
            side,
            patient_id: patient_id.to_string(),
            category: category.to_string(),
            value,
        }),
        None => Ok(()),
    }
}

fn sum_cells(left: &[i64], right: &[i64], score_type: ScoreType) -> Vec<i64> {
    left.iter()
        .zip(right)
        .map(|(a, b)| {
            let sum = a + b;
            if score_type.is_binary() {
                i64::from(sum > 0)
            } else {
                sum
            }
        })
        .collect()
}
