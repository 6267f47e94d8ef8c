//! Comorbidity pipeline core.
//!
//! - [`scorer`]: boundary trait to the external comorbidity scorer
//! - [`combine`]: merges ICD-9 and ICD-10 matrices of one cohort
//! - [`cohort`]: splits diagnoses by ICD revision and builds the combined matrix
//! - [`risk`]: cumulative monthly risk-score aggregation
//! - [`frame`]: polars conversions used at the scorer and output edges
//! - [`fake`]: deterministic scorers for tests and dry runs

pub mod cohort;
pub mod combine;
pub mod error;
pub mod fake;
pub mod frame;
pub mod options;
pub mod risk;
pub mod scorer;

pub use cohort::{CohortSplit, build_combined_matrix, build_from_split, split_by_version};
pub use combine::combine;
pub use error::{PipelineError, Result, ScorerError};
pub use fake::{FixedScorer, LookupScorer, ScorerCall};
pub use frame::{matrix_from_frame, matrix_to_frame, risk_series_to_frame, scores_from_frame};
pub use options::{CohortPolicy, ScoringOptions};
pub use risk::{
    MonthProgress, build_risk_series, build_risk_series_over_months,
    build_risk_series_with_progress, distinct_months, distinct_months_with, scored_months,
    scored_months_with,
};
pub use scorer::ComorbidityScorer;
