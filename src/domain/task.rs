//! Task records and job requests.

use crate::domain::plan::{self, SegmentPlan};
use crate::error::{JobError, JobResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Segment length used when a request does not name one.
pub const DEFAULT_SEGMENT_SECONDS: f64 = 29.0;

/// Current layout of the persisted progress document.
pub const SCHEMA_VERSION: u32 = 1;

/// Opaque task identifier, immutable once allocated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    FullSplit,
    SingleCut,
    SplitFromOffset,
}

impl JobKind {
    /// Leading part of every output file name.
    pub fn prefix(&self) -> &'static str {
        match self {
            JobKind::FullSplit => "part",
            JobKind::SingleCut => "cut",
            JobKind::SplitFromOffset => "parte",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            JobKind::FullSplit => "Full split",
            JobKind::SingleCut => "Single cut",
            JobKind::SplitFromOffset => "Split from offset",
        }
    }

    pub fn plan(&self, duration: f64, start_offset: f64, segment_length: f64) -> JobResult<SegmentPlan> {
        match self {
            JobKind::FullSplit | JobKind::SplitFromOffset => {
                plan::plan(duration, start_offset, segment_length)
            }
            JobKind::SingleCut => plan::plan_single(duration, start_offset, segment_length),
        }
    }

    /// `<prefix>_<task_id>_<index>.<ext>`, index starting at 1.
    pub fn output_name(&self, task_id: &TaskId, index: usize, extension: &str) -> String {
        format!("{}_{}_{}.{}", self.prefix(), task_id, index, extension)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobKind::FullSplit => "full_split",
            JobKind::SingleCut => "single_cut",
            JobKind::SplitFromOffset => "split_from_offset",
        })
    }
}

/// A submission: which strategy, on which source, with which numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub kind: JobKind,
    pub source: String,
    pub start_offset: f64,
    pub segment_length: f64,
}

impl JobRequest {
    pub fn full_split(source: impl Into<String>, segment_length: f64) -> Self {
        Self {
            kind: JobKind::FullSplit,
            source: source.into(),
            start_offset: 0.0,
            segment_length,
        }
    }

    pub fn single_cut(source: impl Into<String>, start_offset: f64, segment_length: f64) -> Self {
        Self {
            kind: JobKind::SingleCut,
            source: source.into(),
            start_offset,
            segment_length,
        }
    }

    pub fn split_from_offset(source: impl Into<String>, start_offset: f64, segment_length: f64) -> Self {
        Self {
            kind: JobKind::SplitFromOffset,
            source: source.into(),
            start_offset,
            segment_length,
        }
    }

    /// Checks everything that can be checked before the source duration is known.
    pub fn validate(&self) -> JobResult<()> {
        if self.source.trim().is_empty() {
            return Err(JobError::invalid("video_file missing"));
        }
        // Same millisecond resolution the planner works in.
        plan::positive_millis(self.segment_length, "segment length")?;
        plan::to_millis(self.start_offset, "start offset")?;
        if self.kind == JobKind::FullSplit && self.start_offset != 0.0 {
            return Err(JobError::invalid("a full split always starts at 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Processing,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

/// Persisted status of one submitted job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub job_kind: JobKind,
    pub task_name: String,
    pub source_file: String,
    pub start_offset: f64,
    pub segment_length: f64,
    pub status: TaskStatus,
    pub total_segments: usize,
    pub completed_segments: usize,
    pub segment_files: Vec<String>,
    pub current_action: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TaskRecord {
    pub fn new(task_id: TaskId, request: &JobRequest, started_at: DateTime<Utc>) -> Self {
        let total_segments = match request.kind {
            JobKind::SingleCut => 1,
            _ => 0,
        };
        Self {
            task_id,
            job_kind: request.kind,
            task_name: request.kind.display_name().to_string(),
            source_file: request.source.clone(),
            start_offset: request.start_offset,
            segment_length: request.segment_length,
            status: TaskStatus::Processing,
            total_segments,
            completed_segments: 0,
            segment_files: Vec::new(),
            current_action: "Starting...".to_string(),
            started_at,
            ended_at: None,
            error_message: None,
        }
    }

    pub fn set_action(&mut self, action: impl Into<String>) {
        self.current_action = action.into();
    }

    pub fn set_total(&mut self, total_segments: usize) {
        self.total_segments = total_segments;
    }

    /// Appends an output and bumps the counter in one step.
    pub fn push_segment(&mut self, file_name: String) {
        self.segment_files.push(file_name);
        self.completed_segments = self.segment_files.len();
    }

    /// Processing -> Completed. Returns false if already terminal.
    pub fn complete(&mut self, at: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Completed;
        self.current_action = "Completed".to_string();
        self.ended_at = Some(at);
        true
    }

    /// Processing -> Error. Returns false if already terminal.
    pub fn fail(&mut self, message: impl Into<String>, at: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Error;
        self.current_action = "Failed".to_string();
        self.error_message = Some(message.into());
        self.ended_at = Some(at);
        true
    }
}

/// The whole persisted state: every task record keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressDocument {
    pub schema_version: u32,
    #[serde(default)]
    pub tasks: BTreeMap<TaskId, TaskRecord>,
}

impl ProgressDocument {
    pub fn new(tasks: BTreeMap<TaskId, TaskRecord>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            tasks,
        }
    }
}

impl Default for ProgressDocument {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}
