use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Total duration of the media in seconds.
    async fn probe_duration(&self, source: &Path) -> Result<f64, Box<dyn Error + Send + Sync>>;
}
