//! Cohort pipeline behaviour with fixed scorer matrices.

use chrono::NaiveDate;

use comorb_core::{
    CohortPolicy, FixedScorer, PipelineError, ScorerCall, build_combined_matrix,
};
use comorb_model::{ComorbidityMatrix, DiagnosisRecord, IcdVersion, ScoreType};

fn record(patient: &str, code: &str, version: IcdVersion) -> DiagnosisRecord {
    let at = NaiveDate::from_ymd_opt(2021, 3, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid timestamp");
    DiagnosisRecord::new(patient, code, version, at)
}

fn matrix(rows: &[(&str, [i64; 2])]) -> ComorbidityMatrix {
    ComorbidityMatrix::from_rows(
        ["chf", "diabunc"],
        rows.iter()
            .map(|(id, values)| ((*id).to_string(), values.to_vec()))
            .collect(),
    )
    .expect("valid matrix")
}

#[test]
fn all_icd9_input_returns_icd9_matrix_unchanged() {
    let icd9 = matrix(&[("P1", [1, 0]), ("P2", [0, 1])]);
    let scorer = FixedScorer::new().with_matrix(IcdVersion::Icd9, icd9.clone());
    let records = [
        record("P1", "4280", IcdVersion::Icd9),
        record("P2", "25000", IcdVersion::Icd9),
    ];

    let combined =
        build_combined_matrix(&records, ScoreType::Elixhauser, CohortPolicy::Lenient, &scorer)
            .expect("combined matrix");

    assert_eq!(combined, icd9);
    assert_eq!(scorer.matrix_calls(IcdVersion::Icd9), 1);
    assert_eq!(scorer.matrix_calls(IcdVersion::Icd10), 0);
}

#[test]
fn all_icd10_input_returns_icd10_matrix_unchanged() {
    let icd10 = matrix(&[("P3", [1, 1])]);
    let scorer = FixedScorer::new().with_matrix(IcdVersion::Icd10, icd10.clone());
    let records = [record("P3", "I50", IcdVersion::Icd10)];

    let combined =
        build_combined_matrix(&records, ScoreType::Elixhauser, CohortPolicy::Lenient, &scorer)
            .expect("combined matrix");

    assert_eq!(combined, icd10);
    assert_eq!(scorer.matrix_calls(IcdVersion::Icd9), 0);
}

#[test]
fn empty_cohort_fails_before_scoring() {
    let scorer = FixedScorer::new();
    let err = build_combined_matrix(&[], ScoreType::Elixhauser, CohortPolicy::Lenient, &scorer)
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptyCohort));
    assert!(scorer.calls().is_empty());
}

#[test]
fn strict_policy_requires_both_versions() {
    let scorer = FixedScorer::new().with_matrix(IcdVersion::Icd10, matrix(&[("P1", [1, 0])]));
    let records = [record("P1", "I50", IcdVersion::Icd10)];
    let err = build_combined_matrix(&records, ScoreType::Charlson, CohortPolicy::Strict, &scorer)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingIcdSubset {
            version: IcdVersion::Icd9
        }
    ));
    assert!(scorer.calls().is_empty());
}

#[test]
fn lenient_charlson_passes_single_subset_through() {
    let icd10 = matrix(&[("P1", [2, 0])]);
    let scorer = FixedScorer::new().with_matrix(IcdVersion::Icd10, icd10.clone());
    let records = [record("P1", "I50", IcdVersion::Icd10)];
    let combined =
        build_combined_matrix(&records, ScoreType::Charlson, CohortPolicy::Lenient, &scorer)
            .expect("combined matrix");
    assert_eq!(combined, icd10);
}

#[test]
fn mixed_cohort_is_split_and_combined() {
    let scorer = FixedScorer::new()
        .with_matrix(IcdVersion::Icd9, matrix(&[("P1", [1, 0])]))
        .with_matrix(IcdVersion::Icd10, matrix(&[("P1", [1, 1]), ("P2", [0, 1])]));
    let records = [
        record("P1", "I50", IcdVersion::Icd10),
        record("P1", "4280", IcdVersion::Icd9),
        record("P2", "E119", IcdVersion::Icd10),
    ];

    let combined =
        build_combined_matrix(&records, ScoreType::Elixhauser, CohortPolicy::Lenient, &scorer)
            .expect("combined matrix");
    assert_eq!(combined.row("P1"), Some(&[1, 1][..]));
    assert_eq!(combined.row("P2"), Some(&[0, 1][..]));

    let calls = scorer.calls();
    let ScorerCall::Matrix { rows, .. } = &calls[0] else {
        panic!("expected a matrix call first");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].icd_code, "4280");
    let ScorerCall::Matrix { rows, icd_version, .. } = &calls[1] else {
        panic!("expected a second matrix call");
    };
    assert_eq!(*icd_version, IcdVersion::Icd10);
    assert_eq!(rows.len(), 2);
}

#[test]
fn elixhauser_rejects_scorer_counts() {
    let scorer = FixedScorer::new()
        .with_matrix(IcdVersion::Icd9, matrix(&[("P1", [2, 0])]))
        .with_matrix(IcdVersion::Icd10, matrix(&[("P1", [1, 0])]));
    let records = [
        record("P1", "4280", IcdVersion::Icd9),
        record("P1", "I50", IcdVersion::Icd10),
    ];
    let err =
        build_combined_matrix(&records, ScoreType::Elixhauser, CohortPolicy::Lenient, &scorer)
            .unwrap_err();
    assert!(matches!(err, PipelineError::CategoryOverflow { .. }));
}
