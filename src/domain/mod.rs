//! Domain layer - Pure business logic.

pub mod ids;
pub mod plan;
pub mod task;

pub use plan::{Boundary, SegmentPlan};
pub use task::{JobKind, JobRequest, ProgressDocument, TaskId, TaskRecord, TaskStatus};
