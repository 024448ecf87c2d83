//! JSON-over-HTTP inbound adapter.
//!
//! Job submission, progress polling and task dismissal, plus the source
//! upload and listing endpoints used by the front end.

pub mod error;
pub mod jobs;
pub mod upload;

use crate::application::{JobSubmitter, ProgressQuery};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobSubmitter>,
    pub query: ProgressQuery,
    /// Where uploads land.
    pub upload_dir: PathBuf,
    /// Directories whose videos are offered for submission, in resolution order.
    pub source_dirs: Vec<PathBuf>,
    pub processed_dir: PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload::upload))
        .route("/api/files", get(upload::list))
        .route("/download/:filename", get(upload::download))
        .route("/delete_processed/:filename", post(upload::delete_processed))
        .route("/delete_upload/:filename", post(upload::delete_upload))
        .route("/start_split_full", post(jobs::start_split_full))
        .route("/start_cut_single", post(jobs::start_cut_single))
        .route("/start_split_from", post(jobs::start_split_from))
        .route("/task_progress/:task_id", get(jobs::task_progress))
        .route("/tasks", get(jobs::list_tasks))
        .route("/tasks/:task_id", delete(jobs::delete_task))
        .route("/cleanup_completed", post(jobs::cleanup_completed))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
