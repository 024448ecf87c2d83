use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

/// Frame-accurate extraction of one `[start, end)` slice into `dest`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Cutter: Send + Sync {
    async fn cut(
        &self,
        source: &Path,
        start_seconds: f64,
        end_seconds: f64,
        dest: &Path,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
