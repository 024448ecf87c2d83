use async_trait::async_trait;
use std::path::PathBuf;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileResolver: Send + Sync {
    /// Locate a readable source file by name. `None` when nothing matches.
    async fn resolve(&self, name: &str) -> Option<PathBuf>;
}
