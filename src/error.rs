use std::time::Duration;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised at the construction and teardown edges of a pipeline.
///
/// Stage workers themselves never fail: their only exit path is cancellation
/// or an upstream disconnect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Invalid buffer or stage configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The OS refused to start a worker thread
    #[error("Failed to spawn worker: {0}")]
    Spawn(String),

    /// A worker thread panicked
    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    /// Workers were still running when the join deadline passed
    #[error("Workers did not exit within {0:?}")]
    JoinTimeout(Duration),
}
