use std::path::PathBuf;

use serde::Serialize;

use comorb_cli::pipeline::{CategoryCount, ScoreStats};
use comorb_model::{ScoreType, WeightScheme};

/// Counts shared by every command that reads an extract.
#[derive(Debug, Serialize)]
pub struct InputSummary {
    pub path: PathBuf,
    pub records: usize,
    pub icd9_records: usize,
    pub icd10_records: usize,
    pub skipped_records: usize,
}

#[derive(Debug, Serialize)]
pub struct MatrixResult {
    pub input: InputSummary,
    pub score_type: ScoreType,
    pub weights: WeightScheme,
    pub patients: usize,
    pub categories: Vec<CategoryCount>,
    pub scores: ScoreStats,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RiskSeriesResult {
    pub input: InputSummary,
    pub score_type: ScoreType,
    pub weights: WeightScheme,
    pub patients: usize,
    /// Column labels, oldest first.
    pub months: Vec<String>,
    /// Distribution of the most recent month.
    pub latest: ScoreStats,
    pub output: PathBuf,
}
