//! Duration probes.

use crate::ports::prober::MediaProber;
use async_trait::async_trait;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Reads `format=duration` through the ffprobe binary.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_bin: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe_bin: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_bin: ffprobe_bin.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn probe_duration(&self, source: &Path) -> Result<f64, Box<dyn Error + Send + Sync>> {
        let output = Command::new(&self.ffprobe_bin)
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(source)
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {}", self.ffprobe_bin.display(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(stderr.trim().to_string().into());
        }
        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_duration(stdout: &str) -> Result<f64, Box<dyn Error + Send + Sync>> {
    let value = stdout.trim();
    match value.parse::<f64>() {
        Ok(duration) if duration.is_finite() && duration > 0.0 => Ok(duration),
        _ => Err(format!("source reports no usable duration ({:?})", value).into()),
    }
}

#[cfg(feature = "libav")]
pub use libav::LibavProber;

#[cfg(feature = "libav")]
mod libav {
    use super::*;
    use ffmpeg_next as ffmpeg;

    const AV_TIME_BASE: f64 = 1_000_000.0;

    /// Opens the container through libav and reads its duration.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LibavProber;

    #[async_trait]
    impl MediaProber for LibavProber {
        async fn probe_duration(
            &self,
            source: &Path,
        ) -> Result<f64, Box<dyn Error + Send + Sync>> {
            let path = source.to_path_buf();

            tokio::task::spawn_blocking(move || -> Result<f64, Box<dyn Error + Send + Sync>> {
                ffmpeg::init()?;
                let context = ffmpeg::format::input(&path)?;
                let duration = context.duration();
                if duration <= 0 {
                    return Err("source reports no usable duration".into());
                }
                Ok(duration as f64 / AV_TIME_BASE)
            })
            .await?
        }
    }
}
