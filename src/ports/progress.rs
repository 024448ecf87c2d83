use crate::domain::task::ProgressDocument;
use crate::error::StoreError;
use async_trait::async_trait;

/// Whole-document persistence for task progress.
#[async_trait]
pub trait ProgressBackend: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet.
    async fn load(&self) -> Result<Option<ProgressDocument>, StoreError>;

    /// Replace the persisted document.
    async fn save(&self, document: &ProgressDocument) -> Result<(), StoreError>;
}
