//! Shared progress store.
//!
//! All task records live in one map behind a single async mutex. Every
//! mutation is applied to the map and flushed to the backend while the lock
//! is held, so concurrent workers can never interleave a read-modify-write
//! cycle. Backend faults are logged and never propagated: an unreadable
//! document opens as empty, a failed save leaves only the in-memory update.

use crate::domain::task::{ProgressDocument, TaskId, TaskRecord, TaskStatus};
use crate::ports::progress::ProgressBackend;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

pub type TaskMap = BTreeMap<TaskId, TaskRecord>;

pub struct ProgressStore {
    backend: Box<dyn ProgressBackend>,
    tasks: Mutex<TaskMap>,
}

impl ProgressStore {
    /// Load the persisted document once. Missing or unreadable data starts empty.
    pub async fn open(backend: impl ProgressBackend + 'static) -> Self {
        let tasks = match backend.load().await {
            Ok(Some(document)) => {
                tracing::info!(tasks = document.tasks.len(), "Loaded progress document");
                document.tasks
            }
            Ok(None) => TaskMap::new(),
            Err(e) => {
                tracing::error!(error = %e, "Discarding unreadable progress document");
                TaskMap::new()
            }
        };

        Self {
            backend: Box::new(backend),
            tasks: Mutex::new(tasks),
        }
    }

    /// Snapshot of every record.
    pub async fn read_all(&self) -> TaskMap {
        self.tasks.lock().await.clone()
    }

    pub async fn get(&self, task_id: &TaskId) -> Option<TaskRecord> {
        self.tasks.lock().await.get(task_id).cloned()
    }

    /// Replace the whole map.
    pub async fn write_all(&self, tasks: TaskMap) {
        let mut guard = self.tasks.lock().await;
        *guard = tasks;
        self.flush(&guard).await;
    }

    /// Insert or overwrite the record stored under its own id.
    pub async fn upsert(&self, record: TaskRecord) {
        let mut guard = self.tasks.lock().await;
        guard.insert(record.task_id.clone(), record);
        self.flush(&guard).await;
    }

    /// Replace a record only if its id is still present. Returns false when
    /// the record was removed in the meantime; nothing is inserted then.
    pub async fn update(&self, record: TaskRecord) -> bool {
        let mut guard = self.tasks.lock().await;
        match guard.get_mut(&record.task_id) {
            Some(slot) => {
                *slot = record;
                self.flush(&guard).await;
                true
            }
            None => false,
        }
    }

    /// Remove one record. Returns whether it existed; absent ids are not an error.
    pub async fn remove(&self, task_id: &TaskId) -> bool {
        let mut guard = self.tasks.lock().await;
        let existed = guard.remove(task_id).is_some();
        if existed {
            self.flush(&guard).await;
        }
        existed
    }

    /// Remove every record matching `predicate` in a single mutation.
    pub async fn remove_where<F>(&self, predicate: F) -> Vec<TaskId>
    where
        F: Fn(&TaskRecord) -> bool,
    {
        let mut guard = self.tasks.lock().await;
        let removed: Vec<TaskId> = guard
            .iter()
            .filter(|(_, record)| predicate(record))
            .map(|(id, _)| id.clone())
            .collect();
        if removed.is_empty() {
            return removed;
        }
        for id in &removed {
            guard.remove(id);
        }
        self.flush(&guard).await;
        removed
    }

    /// Fail every record still `Processing`. Only meaningful at startup,
    /// before any worker of this process exists.
    pub async fn mark_interrupted(&self, message: &str, at: DateTime<Utc>) -> Vec<TaskId> {
        let mut guard = self.tasks.lock().await;
        let mut interrupted = Vec::new();
        for (id, record) in guard.iter_mut() {
            if record.status == TaskStatus::Processing && record.fail(message, at) {
                interrupted.push(id.clone());
            }
        }
        if !interrupted.is_empty() {
            self.flush(&guard).await;
        }
        interrupted
    }

    async fn flush(&self, tasks: &TaskMap) {
        let document = ProgressDocument::new(tasks.clone());
        if let Err(e) = self.backend.save(&document).await {
            tracing::error!(error = %e, "Progress update was not persisted");
        }
    }
}
