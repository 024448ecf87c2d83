//! Source uploads and file listings.

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::adapters::local::fs::{has_extension, is_plain_file_name, list_files};
use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use futures::{Stream, TryStreamExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::{ReaderStream, StreamReader};

pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilesResponse {
    pub videos: Vec<String>,
    pub processed: Vec<String>,
}

/// Reduce a client-supplied name to `[A-Za-z0-9._-]`, dropping any directory part.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned = unsafe_chars.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() || !is_plain_file_name(cleaned) {
        return None;
    }
    Some(cleaned.to_string())
}

/// Save a `Stream` to a file.
pub async fn stream_to_file<S, E>(path: &Path, stream: S) -> io::Result<()>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    tokio::io::copy(&mut body_reader, &mut file).await?;
    file.flush().await?;
    Ok(())
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        let filename = sanitize_file_name(&original)
            .ok_or_else(|| ApiError::bad_request("No file selected"))?;
        if !has_extension(&filename, ALLOWED_EXTENSIONS) {
            return Err(ApiError::bad_request(format!(
                "Unsupported file type, expected one of: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        tokio::fs::create_dir_all(&state.upload_dir)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;
        let path = state.upload_dir.join(&filename);
        tracing::info!(path = %path.display(), "Saving uploaded file");
        if let Err(e) = stream_to_file(&path, field).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ApiError::internal(e.to_string()));
        }

        return Ok(Json(UploadResponse { ok: true, filename }));
    }

    Err(ApiError::bad_request("No file part"))
}

/// Source videos available for submission and every produced output.
pub async fn list(State(state): State<AppState>) -> Json<FilesResponse> {
    let mut videos = Vec::new();
    for dir in &state.source_dirs {
        for name in list_files(dir, Some(ALLOWED_EXTENSIONS)).await {
            if !videos.contains(&name) {
                videos.push(name);
            }
        }
    }
    videos.sort();
    let processed = list_files(&state.processed_dir, None).await;
    Json(FilesResponse { videos, processed })
}

/// First regular file called `name` in `dirs`. Names that are not a single
/// plain component never match.
async fn find_in(dirs: &[&Path], name: &str) -> ApiResult<PathBuf> {
    if !is_plain_file_name(name) {
        return Err(ApiError::bad_request("Invalid file name"));
    }
    for dir in dirs {
        let candidate = dir.join(name);
        let is_file = tokio::fs::metadata(&candidate)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            return Ok(candidate);
        }
    }
    Err(ApiError::not_found("not found"))
}

/// Stream a produced segment, or failing that an uploaded source, as an attachment.
pub async fn download(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> ApiResult<Response> {
    let path = find_in(
        &[state.processed_dir.as_path(), state.upload_dir.as_path()],
        &filename,
    ).await?;
    let file = File::open(&path)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .len();

    tracing::debug!(path = %path.display(), length, "Serving download");
    let headers = [
        (CONTENT_TYPE, String::from("application/octet-stream")),
        (CONTENT_LENGTH, length.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

async fn remove_from(dir: &Path, filename: &str) -> ApiResult<Json<serde_json::Value>> {
    let path = find_in(&[dir], filename).await?;
    tokio::fs::remove_file(&path)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    tracing::info!(path = %path.display(), "Deleted file");
    Ok(Json(json!({ "ok": true })))
}

pub async fn delete_processed(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> ApiResult<Json<serde_json::Value>> {
    remove_from(&state.processed_dir, &filename).await
}

pub async fn delete_upload(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> ApiResult<Json<serde_json::Value>> {
    remove_from(&state.upload_dir, &filename).await
}
