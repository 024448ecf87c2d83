//! Read path and retention over the progress store.

use crate::application::store::{ProgressStore, TaskMap};
use crate::domain::task::{TaskId, TaskRecord};
use crate::error::{JobError, JobResult};
use chrono::Utc;
use std::sync::Arc;

pub const INTERRUPTED_MESSAGE: &str = "interrupted by service restart";

#[derive(Clone)]
pub struct ProgressQuery {
    store: Arc<ProgressStore>,
}

impl ProgressQuery {
    pub fn new(store: Arc<ProgressStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, task_id: &TaskId) -> JobResult<TaskRecord> {
        self.store
            .get(task_id)
            .await
            .ok_or_else(|| JobError::TaskNotFound(task_id.to_string()))
    }

    /// Every record currently in the store, terminal ones included.
    pub async fn list_active(&self) -> TaskMap {
        self.store.read_all().await
    }

    /// Drop every completed or failed record; returns the removed ids.
    pub async fn cleanup(&self) -> Vec<TaskId> {
        let removed = self
            .store
            .remove_where(|record| record.status.is_terminal())
            .await;
        tracing::info!(removed = removed.len(), "Cleaned up finished tasks");
        removed
    }

    /// Dismiss one record. Succeeds whether or not it exists.
    pub async fn delete(&self, task_id: &TaskId) {
        if self.store.remove(task_id).await {
            tracing::info!(task_id = %task_id, "Task deleted from progress");
        }
    }

    /// Startup recovery: nothing from a previous process is still running.
    pub async fn recover_interrupted(&self) -> Vec<TaskId> {
        let interrupted = self
            .store
            .mark_interrupted(INTERRUPTED_MESSAGE, Utc::now())
            .await;
        if !interrupted.is_empty() {
            tracing::warn!(count = interrupted.len(), "Marked interrupted tasks as failed");
        }
        interrupted
    }
}
