//! Error types for job submission, planning and the progress store.

use thiserror::Error;

pub type JobResult<T> = Result<T, JobError>;

/// Errors raised while submitting, planning or running a cutting job.
///
/// `InvalidParameters`, `EmptyCut` and `SourceNotFound` reach the submitter
/// synchronously. `ProbeFailure` and `CutterFailure` only ever end up in a
/// task record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JobError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Empty cut: start {start}s is at or past the end of a {duration}s source")]
    EmptyCut { start: f64, duration: f64 },

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("{0}")]
    ProbeFailure(String),

    #[error("Segment {index} failed: {message}")]
    CutterFailure { index: usize, message: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

impl JobError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

/// Faults of the persisted progress document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read progress document: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write progress document: {0}")]
    Write(#[source] std::io::Error),

    #[error("Progress document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Unsupported progress document version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
