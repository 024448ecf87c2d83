//! Service configuration, read from the environment (and `.env`).

use std::env;
use std::path::PathBuf;

/// Configuration for the cutting service.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// Where uploaded sources are stored, searched first when resolving
    pub upload_dir: PathBuf,
    /// Where segment files are written
    pub processed_dir: PathBuf,
    /// The persisted progress document
    pub progress_file: PathBuf,
    /// Upper bound on jobs cutting at the same time
    pub max_concurrent_jobs: usize,
    /// Container extension of produced segments
    pub output_extension: String,
    pub ffmpeg_bin: PathBuf,
    pub ffprobe_bin: PathBuf,
    pub video_codec: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: String::from("127.0.0.1"),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            processed_dir: PathBuf::from("processed"),
            progress_file: PathBuf::from("processing_progress.json"),
            max_concurrent_jobs: 2,
            output_extension: String::from("mp4"),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            video_codec: String::from("libx264"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);
        let path = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);

        Self {
            addr: string("ADDR", defaults.addr),
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            upload_dir: path("UPLOAD_DIR", defaults.upload_dir),
            processed_dir: path("PROCESSED_DIR", defaults.processed_dir),
            progress_file: path("PROGRESS_FILE", defaults.progress_file),
            max_concurrent_jobs: lookup("MAX_CONCURRENT_JOBS")
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrent_jobs),
            output_extension: lookup("OUTPUT_EXTENSION")
                .map(|ext| ext.trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .unwrap_or(defaults.output_extension),
            ffmpeg_bin: path("FFMPEG_BIN", defaults.ffmpeg_bin),
            ffprobe_bin: path("FFPROBE_BIN", defaults.ffprobe_bin),
            video_codec: string("VIDEO_CODEC", defaults.video_codec),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}
