//! Job submission and task progress handlers.

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::application::store::TaskMap;
use crate::domain::task::{JobRequest, TaskId, TaskRecord, DEFAULT_SEGMENT_SECONDS};
use axum::async_trait;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Submission body, accepted as JSON or as an urlencoded form. Rejections
/// come back in the usual `{"ok": false, "error": ..}` shape.
pub struct JobBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JobBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(body) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self(body))
        }
    }
}

fn default_segment_seconds() -> f64 {
    DEFAULT_SEGMENT_SECONDS
}

#[derive(Debug, Deserialize)]
pub struct SplitFullBody {
    #[serde(default)]
    pub video_file: String,
    #[serde(default = "default_segment_seconds")]
    pub segment_duration: f64,
}

#[derive(Debug, Deserialize)]
pub struct CutSingleBody {
    #[serde(default)]
    pub video_file: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_segment_seconds")]
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
pub struct SplitFromBody {
    #[serde(default)]
    pub video_file: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_segment_seconds")]
    pub segment_duration: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub task_id: TaskId,
    pub video_file: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub ok: bool,
    pub removed: Vec<TaskId>,
}

async fn submit(state: &AppState, request: JobRequest) -> ApiResult<Json<SubmitResponse>> {
    let video_file = request.source.clone();
    let task_id = state.jobs.submit(request).await?;
    Ok(Json(SubmitResponse {
        ok: true,
        task_id,
        video_file,
    }))
}

pub async fn start_split_full(
    State(state): State<AppState>,
    JobBody(body): JobBody<SplitFullBody>,
) -> ApiResult<Json<SubmitResponse>> {
    submit(
        &state,
        JobRequest::full_split(body.video_file, body.segment_duration),
    )
    .await
}

pub async fn start_cut_single(
    State(state): State<AppState>,
    JobBody(body): JobBody<CutSingleBody>,
) -> ApiResult<Json<SubmitResponse>> {
    submit(
        &state,
        JobRequest::single_cut(body.video_file, body.start_time, body.duration),
    )
    .await
}

pub async fn start_split_from(
    State(state): State<AppState>,
    JobBody(body): JobBody<SplitFromBody>,
) -> ApiResult<Json<SubmitResponse>> {
    submit(
        &state,
        JobRequest::split_from_offset(body.video_file, body.start_time, body.segment_duration),
    )
    .await
}

pub async fn task_progress(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskRecord>> {
    let record = state.query.get(&TaskId::new(task_id)).await?;
    Ok(Json(record))
}

pub async fn list_tasks(State(state): State<AppState>) -> Json<TaskMap> {
    Json(state.query.list_active().await)
}

pub async fn cleanup_completed(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed = state.query.cleanup().await;
    Json(CleanupResponse { ok: true, removed })
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<serde_json::Value> {
    state.query.delete(&TaskId::new(task_id)).await;
    Json(serde_json::json!({ "ok": true }))
}
