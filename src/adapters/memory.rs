//! In-memory progress backend, for tests and ephemeral deployments.

use crate::domain::task::ProgressDocument;
use crate::error::StoreError;
use crate::ports::progress::ProgressBackend;
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: Mutex<Option<ProgressDocument>>,
    latency: Option<Duration>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: ProgressDocument) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            ..Self::default()
        }
    }

    /// Sleep this long inside every load and save.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Last successfully saved document.
    pub fn snapshot(&self) -> Option<ProgressDocument> {
        self.document.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ProgressBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<ProgressDocument>, StoreError> {
        self.pause().await;
        Ok(self.snapshot())
    }

    async fn save(&self, document: &ProgressDocument) -> Result<(), StoreError> {
        self.pause().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write(io::Error::new(
                io::ErrorKind::Other,
                "writes disabled",
            )));
        }
        *self.document.lock().unwrap_or_else(|e| e.into_inner()) = Some(document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
