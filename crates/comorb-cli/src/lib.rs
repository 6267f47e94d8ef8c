//! Library side of the `comorbidity-risk` CLI.

pub mod logging;
pub mod pipeline;
