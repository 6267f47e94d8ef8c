//! Integration tests for the CLI pipeline stages, run against the fake scorer.

use std::path::PathBuf;

use tempfile::TempDir;

use comorb_cli::pipeline::{
    category_counts, ingest, latest_scores, output_matrix, output_series, risk_over_time,
    score_cohort,
};
use comorb_core::{CohortPolicy, LookupScorer, ScoringOptions};
use comorb_ingest::{DiagnosisColumns, IngestOptions};
use comorb_model::{IcdVersion, ScoreType};

const EXTRACT: &str = "\
Patient_ID,ICD_Code,ICD_Type,Diagnosis_Datetime
P4,Z00,11,2020-12-15
P1,I10,10,2021-01-05 10:00:00
P1,E11,10,2021-02-10 08:15:00
P2,4019,9,2021-02-20
P3,Z00,11,2021-02-21
";

fn write_extract(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("Diagnosis.csv");
    std::fs::write(&path, text).expect("write extract");
    path
}

fn scorer() -> LookupScorer {
    LookupScorer::for_score(ScoreType::Elixhauser)
        .with_code(IcdVersion::Icd10, "I10", "hypunc")
        .with_code(IcdVersion::Icd10, "E11", "diabunc")
        .with_code(IcdVersion::Icd9, "4019", "hypunc")
        .with_weight("diabunc", 2.0)
}

#[test]
fn ingest_normalizes_headers_and_skips_unknown_types() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_extract(&dir, EXTRACT);
    let table = ingest(&path, &DiagnosisColumns::default(), &IngestOptions::default())
        .expect("ingest");
    assert_eq!(table.records.len(), 3);
    assert_eq!(table.skipped_unknown_version, 2);
    assert_eq!(table.count_by_version(IcdVersion::Icd9), 1);
    let months: Vec<String> = table
        .unscored_months
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(months, vec!["2020-12-01", "2021-02-01"]);
}

#[test]
fn missing_file_error_names_the_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.csv");
    let err = ingest(&path, &DiagnosisColumns::default(), &IngestOptions::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"), "{err:#}");
}

#[test]
fn matrix_run_scores_every_patient_and_writes_csv() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_extract(&dir, EXTRACT);
    let table = ingest(&path, &DiagnosisColumns::default(), &IngestOptions::default())
        .expect("ingest");

    let options = ScoringOptions::new(ScoreType::Elixhauser);
    let outcome = score_cohort(&table.records, &options, &scorer()).expect("score");
    assert_eq!(outcome.matrix.patient_ids(), ["P2", "P1"]);
    assert_eq!(outcome.scores, vec![1.0, 3.0]);

    let counts = category_counts(&outcome.matrix);
    let hypunc = counts
        .iter()
        .find(|count| count.category == "hypunc")
        .expect("hypunc listed");
    assert_eq!(hypunc.patients, 2);
    assert_eq!(counts.len(), 31);

    let out = dir.path().join("matrix.csv");
    output_matrix(&out, &outcome).expect("write matrix");
    let text = std::fs::read_to_string(&out).expect("read matrix");
    let header = text.lines().next().unwrap_or_default();
    assert!(header.starts_with("patient_id,chf,carit,"), "{header}");
    assert!(header.ends_with(",depre,score"), "{header}");
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn strict_charlson_needs_both_revisions() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_extract(
        &dir,
        "patient_id,icd_code,icd_type,diagnosis_datetime\nP1,I50,10,2021-01-05\n",
    );
    let table = ingest(&path, &DiagnosisColumns::default(), &IngestOptions::default())
        .expect("ingest");
    let scorer = LookupScorer::for_score(ScoreType::Charlson);

    let strict = ScoringOptions::new(ScoreType::Charlson);
    let err = score_cohort(&table.records, &strict, &scorer).unwrap_err();
    assert!(format!("{err:#}").contains("no icd9 diagnosis codes"), "{err:#}");

    let lenient = strict.with_cohort_policy(CohortPolicy::Lenient);
    let outcome = score_cohort(&table.records, &lenient, &scorer).expect("lenient score");
    assert_eq!(outcome.matrix.height(), 1);
}

#[test]
fn risk_series_is_written_with_month_columns() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_extract(&dir, EXTRACT);
    let table = ingest(&path, &DiagnosisColumns::default(), &IngestOptions::default())
        .expect("ingest");

    let mut months = Vec::new();
    let series = risk_over_time(
        &table,
        &ScoringOptions::new(ScoreType::Elixhauser),
        &scorer(),
        |progress| months.push(progress.month),
    )
    .expect("risk series");
    assert_eq!(months.len(), 2);
    assert_eq!(series.patient_ids(), ["P1", "P2"]);
    assert_eq!(series.scores_for("P1"), Some(&[1.0, 3.0][..]));
    assert_eq!(series.scores_for("P2"), Some(&[0.0, 1.0][..]));
    assert_eq!(latest_scores(&series), vec![3.0, 1.0]);

    let out = dir.path().join("elixhauser_risk_over_time.csv");
    output_series(&out, &series).expect("write series");
    let text = std::fs::read_to_string(&out).expect("read series");
    let header = text.lines().next().unwrap_or_default();
    insta::assert_snapshot!(header, @"patient_id,Risk_2021-01-01,Risk_2021-02-01");
}

#[test]
fn unknown_type_rows_still_open_the_first_month() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_extract(
        &dir,
        "patient_id,icd_code,icd_type,diagnosis_datetime\n\
         P3,Z00,11,2021-01-02\n\
         P1,I10,10,2021-02-05\n\
         P1,E11,10,2021-03-05\n",
    );
    let table = ingest(&path, &DiagnosisColumns::default(), &IngestOptions::default())
        .expect("ingest");

    let series = risk_over_time(
        &table,
        &ScoringOptions::new(ScoreType::Elixhauser),
        &scorer(),
        |_| {},
    )
    .expect("risk series");

    assert_eq!(
        series.column_labels(),
        vec!["Risk_2021-02-01", "Risk_2021-03-01"]
    );
    assert_eq!(series.scores_for("P1"), Some(&[1.0, 3.0][..]));
    assert!(series.scores_for("P3").is_none());
}

#[test]
fn custom_column_names_and_row_limit() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_extract(
        &dir,
        "pid;code;rev;when\nA;I10;10;2021-01-05\nB;E11;10;2021-02-05\nC;I10;10;2021-03-05\n",
    );
    let columns = DiagnosisColumns::default()
        .with_patient_id("PID")
        .with_icd_code("code")
        .with_icd_type("rev")
        .with_diagnosis_datetime("when");
    let options = IngestOptions::default()
        .with_delimiter(b';')
        .with_max_rows(Some(2));
    let table = ingest(&path, &columns, &options).expect("ingest");
    let patients: Vec<&str> = table
        .records
        .iter()
        .map(|record| record.patient_id.as_str())
        .collect();
    assert_eq!(patients, vec!["A", "B"]);
}
