use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data frame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    /// Score column length differs from the matrix height.
    #[error("{found} scores supplied for a matrix of {expected} patients")]
    ScoreLength { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, OutputError>;
