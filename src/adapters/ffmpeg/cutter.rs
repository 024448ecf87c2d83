//! Cutter backed by the ffmpeg binary.

use crate::ports::cutter::Cutter;
use async_trait::async_trait;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct FfmpegCutter {
    ffmpeg_bin: PathBuf,
    video_codec: String,
}

impl FfmpegCutter {
    pub fn new(ffmpeg_bin: impl Into<PathBuf>, video_codec: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            video_codec: video_codec.into(),
        }
    }
}

impl Default for FfmpegCutter {
    fn default() -> Self {
        Self::new("ffmpeg", "libx264")
    }
}

/// Millisecond precision is all the planner ever produces.
pub(crate) fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

#[async_trait]
impl Cutter for FfmpegCutter {
    async fn cut(
        &self,
        source: &Path,
        start_seconds: f64,
        end_seconds: f64,
        dest: &Path,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if end_seconds <= start_seconds {
            return Err(format!(
                "refusing to cut an empty range {}s-{}s",
                start_seconds, end_seconds
            )
            .into());
        }
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Seeking before -i while re-encoding keeps the cut frame-accurate.
        let output = Command::new(&self.ffmpeg_bin)
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg(format_seconds(start_seconds))
            .arg("-i")
            .arg(source)
            .arg("-t")
            .arg(format_seconds(end_seconds - start_seconds))
            .arg("-c:v")
            .arg(&self.video_codec)
            .arg("-c:a")
            .arg("aac")
            .arg(dest)
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {}", self.ffmpeg_bin.display(), e))?;

        tracing::debug!(
            source = %source.display(),
            dest = %dest.display(),
            status = %output.status,
            "ffmpeg cut finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("ffmpeg exited with {}: {}", output.status, stderr.trim()).into());
        }
        Ok(())
    }
}
