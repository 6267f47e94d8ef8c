//! Comorbidity scoring through R.
//!
//! [`RRuntime`] owns the one-time R setup for the process and [`RScorer`]
//! implements [`comorb_core::ComorbidityScorer`] on top of it.

pub mod runtime;
pub mod scorer;

pub use runtime::{RConfig, RRuntime};
pub use scorer::{RScorer, read_matrix, read_scores, write_code_rows, write_matrix};
