//! Pipeline-specific error types.

use thiserror::Error;

/// Errors raised while editing a transform pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Unknown stage {0:?}")]
    UnknownStage(String),

    #[error("Stage {0:?} is already in the pipeline")]
    DuplicateStage(String),

    #[error("Stage {0:?} is not in the pipeline")]
    MissingStage(String),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
