//! CSV writers.

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, IntoColumn, NamedFrom, SerWriter, Series};
use tracing::info;

use comorb_core::{matrix_to_frame, risk_series_to_frame};
use comorb_model::{ComorbidityMatrix, RiskScoreSeries, ScoreType};

use crate::error::{OutputError, Result};

/// Header of the optional score column in matrix exports.
pub const SCORE_COLUMN: &str = "score";

/// `<input dir>/<score>_risk_over_time.csv`.
pub fn default_risk_output_path(input: &Path, score_type: ScoreType) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}_risk_over_time.csv", score_type.as_str()))
}

/// Writes `patient_id,Risk_<yyyy-mm-01>,...`, one row per patient.
pub fn write_risk_series_csv(path: &Path, series: &RiskScoreSeries) -> Result<()> {
    let mut df = risk_series_to_frame(series)?;
    write_frame(path, &mut df)?;
    info!(
        path = %path.display(),
        patients = series.patient_count(),
        months = series.months().len(),
        "wrote risk series"
    );
    Ok(())
}

/// Writes a matrix, optionally followed by a `score` column aligned to rows.
pub fn write_matrix_csv(
    path: &Path,
    matrix: &ComorbidityMatrix,
    scores: Option<&[f64]>,
) -> Result<()> {
    let mut df = matrix_to_frame(matrix)?;
    if let Some(scores) = scores {
        if scores.len() != matrix.height() {
            return Err(OutputError::ScoreLength {
                expected: matrix.height(),
                found: scores.len(),
            });
        }
        df.with_column(Series::new(SCORE_COLUMN.into(), scores.to_vec()).into_column())?;
    }
    write_frame(path, &mut df)?;
    info!(
        path = %path.display(),
        patients = matrix.height(),
        categories = matrix.categories().len(),
        "wrote comorbidity matrix"
    );
    Ok(())
}

fn write_frame(path: &Path, df: &mut DataFrame) -> Result<()> {
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut file = File::create(path).map_err(io_err)?;
    CsvWriter::new(&mut file).finish(df)?;
    Ok(())
}
