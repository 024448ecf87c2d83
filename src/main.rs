//! Clipsplit server binary.
//!
//! Wires up:
//! - the progress store over the JSON progress file (with restart recovery)
//! - ffmpeg-backed cutter and duration prober
//! - the job dispatcher and its bounded worker pool
//! - the HTTP inbound adapter

use clipsplit::adapters::ffmpeg::FfmpegCutter;
use clipsplit::adapters::http::{self, AppState};
use clipsplit::adapters::local::{JsonFileBackend, LocalFileResolver};
use clipsplit::application::{JobDispatcher, JobWorker, ProgressQuery, ProgressStore};
use clipsplit::config::AppConfig;
use clipsplit::domain::ids::{RandomIdAllocator, DEFAULT_ID_LENGTH};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg(not(feature = "libav"))]
fn prober(config: &AppConfig) -> clipsplit::adapters::ffmpeg::FfprobeProber {
    clipsplit::adapters::ffmpeg::FfprobeProber::new(&config.ffprobe_bin)
}

#[cfg(feature = "libav")]
fn prober(_config: &AppConfig) -> clipsplit::adapters::ffmpeg::LibavProber {
    clipsplit::adapters::ffmpeg::LibavProber
}

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    for dir in [&config.upload_dir, &config.processed_dir] {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::error!(dir = %dir.display(), error = %e, "Failed to create directory");
            std::process::exit(1);
        }
    }

    // 1. Progress store, recovering whatever a previous run left behind
    let store = Arc::new(ProgressStore::open(JsonFileBackend::new(&config.progress_file)).await);
    let query = ProgressQuery::new(store.clone());
    query.recover_interrupted().await;

    // 2. Job execution
    let worker = Arc::new(JobWorker::new(
        FfmpegCutter::new(&config.ffmpeg_bin, config.video_codec.clone()),
        prober(&config),
        store.clone(),
        config.processed_dir.clone(),
        config.output_extension.clone(),
    ));

    let source_dirs = vec![config.upload_dir.clone(), PathBuf::from(".")];
    let dispatcher = JobDispatcher::new(
        LocalFileResolver::new(source_dirs.clone()),
        Arc::new(RandomIdAllocator::new(DEFAULT_ID_LENGTH)),
        store,
        worker,
        config.max_concurrent_jobs,
    );

    // 3. HTTP layer
    let app = http::router(AppState {
        jobs: Arc::new(dispatcher),
        query,
        upload_dir: config.upload_dir.clone(),
        source_dirs,
        processed_dir: config.processed_dir.clone(),
    });

    // 4. Start server
    let listener = match tokio::net::TcpListener::bind(config.bind_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %config.bind_address(), error = %e, "Failed to bind TCP listener");
            std::process::exit(1);
        }
    };
    tracing::info!(
        address = %config.bind_address(),
        max_concurrent_jobs = config.max_concurrent_jobs,
        "Listening"
    );
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
