//! End-to-end loading of diagnosis files.

use std::io::Write;

use comorb_ingest::{DiagnosisColumns, IngestError, IngestOptions, load_diagnoses};
use comorb_model::IcdVersion;

fn write_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write file");
    file
}

#[test]
fn loads_mixed_case_extract() {
    let file = write_file(
        "Patient_ID,ICD_Code,ICD_Type,Diagnosis_DateTime\n\
         1001,I10,10,2021-01-05 09:00:00\n\
         1001,E11,10,2021-02-10 14:30:00\n\
         1002,4019,9,2021-02-20\n",
    );
    let table = load_diagnoses(
        file.path(),
        &DiagnosisColumns::default(),
        &IngestOptions::default(),
    )
    .expect("load diagnoses");

    assert_eq!(table.records.len(), 3);
    assert_eq!(table.count_by_version(IcdVersion::Icd10), 2);
    assert_eq!(table.records[2].patient_id, "1002");
    assert_eq!(table.records[2].icd_code, "4019");
}

#[test]
fn max_rows_truncates_before_parsing() {
    let file = write_file(
        "patient_id,icd_code,icd_type,diagnosis_datetime\n\
         1,I10,10,2021-01-05\n\
         2,I10,10,not-a-date\n",
    );
    let options = IngestOptions::default().with_max_rows(Some(1));
    let table =
        load_diagnoses(file.path(), &DiagnosisColumns::default(), &options).expect("load");
    assert_eq!(table.records.len(), 1);

    let err = load_diagnoses(
        file.path(),
        &DiagnosisColumns::default(),
        &IngestOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::InvalidValue { line: 3, .. }));
}
