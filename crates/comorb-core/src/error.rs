//! Error types for the scoring pipeline.

use thiserror::Error;

use comorb_model::{IcdVersion, ModelError, ScoreType, WeightScheme};

/// Failures at the external scorer boundary.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// The scorer backend has not been initialized or cannot run.
    #[error("scorer unavailable: {0}")]
    Unavailable(String),

    /// Process-wide scorer state was initialized twice.
    #[error("scorer runtime is already initialized")]
    AlreadyInitialized,

    /// The backend ran and reported failure.
    #[error("{operation} failed: {message}")]
    Failed {
        operation: &'static str,
        message: String,
    },

    /// Scorer output did not have the expected shape.
    #[error("unexpected scorer output: {0}")]
    Output(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data frame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failures while combining matrices or aggregating risk.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Elixhauser inputs must be presence flags before combination.
    #[error(
        "{side} matrix has comorbidity value {value} > 1 for patient '{patient_id}', category '{category}'"
    )]
    CategoryOverflow {
        side: IcdVersion,
        patient_id: String,
        category: String,
        value: i64,
    },

    /// Neither ICD-9 nor ICD-10 diagnoses were supplied.
    #[error("no diagnosis codes supplied: both ICD-9 and ICD-10 subsets are empty")]
    EmptyCohort,

    /// Strict cohort policy requires both ICD subsets.
    #[error("no {version} diagnosis codes supplied; the strict cohort policy requires both ICD-9 and ICD-10 codes")]
    MissingIcdSubset { version: IcdVersion },

    /// The two matrices do not share the same category columns.
    #[error("category columns differ between matrices: icd9 has [{icd9}], icd10 has [{icd10}]")]
    SchemaMismatch { icd9: String, icd10: String },

    /// Scorer returned a different number of scores than matrix rows.
    #[error("scorer returned {found} risk scores for {expected} patients")]
    ScoreLengthMismatch { expected: usize, found: usize },

    /// Weight scheme belongs to the other index family.
    #[error("weight scheme '{weights}' cannot be used with the {score_type} index")]
    IncompatibleWeights {
        weights: WeightScheme,
        score_type: ScoreType,
    },

    #[error(transparent)]
    Scorer(#[from] ScorerError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
