//! [`ComorbidityScorer`] implementation running the R `comorbidity` package.
//!
//! Every call exchanges CSV files with `Rscript` inside its own temporary
//! directory, removed when the call returns.

use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use polars::prelude::{
    CsvReadOptions, CsvWriter, DataFrame, DataType, Schema, SerReader, SerWriter,
};
use tempfile::TempDir;
use tracing::{debug, info_span};

use comorb_core::{
    ComorbidityScorer, ScorerError, matrix_from_frame, matrix_to_frame, scores_from_frame,
};
use comorb_model::{
    CodeRow, ComorbidityMatrix, IcdVersion, PATIENT_ID_COLUMN, ScoreType, WeightScheme,
    categories_for,
};

use crate::runtime::RRuntime;

/// Column holding diagnosis codes in the scorer input.
pub const ICD_CODE_COLUMN: &str = "icd_code";
/// Column holding risk scores in the scorer output.
pub const SCORE_COLUMN: &str = "score";

/// Scorer backed by the process-wide [`RRuntime`].
#[derive(Debug, Clone, Copy)]
pub struct RScorer {
    runtime: &'static RRuntime,
}

impl RScorer {
    pub fn new(runtime: &'static RRuntime) -> Self {
        Self { runtime }
    }

    /// Scorer over the already initialized runtime.
    pub fn from_initialized() -> Result<Self, ScorerError> {
        RRuntime::get().map(Self::new).ok_or_else(|| {
            ScorerError::Unavailable("R runtime has not been initialized".to_string())
        })
    }

    pub fn runtime(&self) -> &'static RRuntime {
        self.runtime
    }
}

impl ComorbidityScorer for RScorer {
    fn comorbidity_matrix(
        &self,
        rows: &[CodeRow],
        icd_version: IcdVersion,
        score_type: ScoreType,
    ) -> Result<ComorbidityMatrix, ScorerError> {
        let map = score_type.mapping_name(icd_version);
        let span = info_span!("r_matrix", map = %map, rows = rows.len());
        let _guard = span.enter();
        if rows.is_empty() {
            return Ok(ComorbidityMatrix::new(categories_for(score_type).iter().copied()));
        }

        let start = Instant::now();
        let workdir = call_dir()?;
        let input = workdir.path().join("codes.csv");
        let output = workdir.path().join("matrix.csv");
        write_code_rows(&input, rows)?;

        self.runtime.run_script(
            "comorbidity matrix",
            [
                OsStr::new("matrix"),
                OsStr::new(&map),
                input.as_os_str(),
                output.as_os_str(),
            ],
        )?;
        let matrix = read_matrix(&output, score_type)?;
        debug!(
            patients = matrix.height(),
            duration_ms = start.elapsed().as_millis(),
            "comorbidity matrix computed"
        );
        Ok(matrix)
    }

    fn risk_scores(
        &self,
        matrix: &ComorbidityMatrix,
        weights: WeightScheme,
        mapping: &str,
    ) -> Result<Vec<f64>, ScorerError> {
        let span = info_span!(
            "r_score",
            weights = %weights,
            map = mapping,
            patients = matrix.height()
        );
        let _guard = span.enter();
        if matrix.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let workdir = call_dir()?;
        let input = workdir.path().join("matrix.csv");
        let output = workdir.path().join("scores.csv");
        write_matrix(&input, matrix)?;

        self.runtime.run_script(
            "comorbidity score",
            [
                OsStr::new("score"),
                OsStr::new(weights.as_str()),
                OsStr::new(mapping),
                input.as_os_str(),
                output.as_os_str(),
            ],
        )?;
        let scores = read_scores(&output)?;
        debug!(
            scores = scores.len(),
            duration_ms = start.elapsed().as_millis(),
            "risk scores computed"
        );
        Ok(scores)
    }
}

fn call_dir() -> Result<TempDir, ScorerError> {
    Ok(tempfile::Builder::new().prefix("comorb-call-").tempdir()?)
}

/// Writes `(patient_id, icd_code)` rows as the scorer input table.
pub fn write_code_rows(path: &Path, rows: &[CodeRow]) -> Result<(), ScorerError> {
    let mut writer = csv::Writer::from_path(path).map_err(std::io::Error::from)?;
    writer
        .write_record([PATIENT_ID_COLUMN, ICD_CODE_COLUMN])
        .map_err(std::io::Error::from)?;
    for row in rows {
        writer
            .write_record([row.patient_id.as_str(), row.icd_code.as_str()])
            .map_err(std::io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a matrix as `patient_id` plus one integer column per category.
pub fn write_matrix(path: &Path, matrix: &ComorbidityMatrix) -> Result<(), ScorerError> {
    let mut df = matrix_to_frame(matrix)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

/// Reads the scorer's matrix output and checks it against the category catalog.
pub fn read_matrix(path: &Path, score_type: ScoreType) -> Result<ComorbidityMatrix, ScorerError> {
    let df = read_frame(path, Some(PATIENT_ID_COLUMN))?;
    matrix_from_frame(&df, PATIENT_ID_COLUMN, Some(categories_for(score_type)))
}

/// Reads the scorer's `score` column.
pub fn read_scores(path: &Path) -> Result<Vec<f64>, ScorerError> {
    let df = read_frame(path, None)?;
    scores_from_frame(&df, SCORE_COLUMN)
}

/// Reads a CSV written by R. The id column, when given, stays textual so
/// identifiers with leading zeros survive.
fn read_frame(path: &Path, id_column: Option<&str>) -> Result<DataFrame, ScorerError> {
    if !path.exists() {
        return Err(ScorerError::Output(format!(
            "scorer did not write {}",
            path.display()
        )));
    }
    let mut options = CsvReadOptions::default().with_has_header(true);
    if let Some(id_column) = id_column {
        let mut schema = Schema::default();
        schema.with_column(id_column.into(), DataType::String);
        options = options.with_schema_overwrite(Some(Arc::new(schema)));
    }
    Ok(options
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?)
}
