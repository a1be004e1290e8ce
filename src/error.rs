// Error taxonomy for index lookups and video export.

use thiserror::Error;

use crate::engine::backend::ExportStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("index {index} out of range (count {count})")]
    OutOfRange { index: usize, count: usize },
}

/// Outcome of a failed export, delivered through the completion callback only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("export completed without an output location")]
    MissingOutput,
    #[error("export backend failed: {0}")]
    BackendFailure(String),
    #[error("failed to build the video composition")]
    CompositionBuildFailed,
    #[error("export finished with unhandled status {0:?}")]
    Unhandled(ExportStatus),
}
