//! # cb-api Handlers
//!
//! Thin translation between HTTP requests and the service operations:
//! extract the acting user, decode the body, call the service, map the
//! domain error onto a status code.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use cb_core::error::AppError;
use cb_core::models::SaveKind;
use cb_services::images::Upload;
use cb_services::{CommentPatch, NewComment, NewPost, PostPatch};

use crate::AppState;

/// Domain error carried out of a handler.
///
/// Authorization and not-found failures map to clear 4xx responses;
/// infrastructure failures get a generic body so internals never leak.
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::NotFound(..) => (StatusCode::NOT_FOUND, self.0.to_string()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            AppError::Unauthorized(_) => (StatusCode::FORBIDDEN, self.0.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),
            AppError::Dependency(_) => {
                tracing::error!(error = %self.0, "dependency failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        let body = serde_json::json!({
            "status": if status.is_client_error() { "fail" } else { "error" },
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// The upstream gateway authenticates and forwards the user id.
fn current_user(headers: &HeaderMap) -> ApiResult<Uuid> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(|| ApiError(AppError::Unauthorized("missing or invalid x-user-id".into())))
}

#[derive(Deserialize)]
pub struct UploadBody {
    pub name: String,
    /// Base64-encoded raw bytes.
    pub data: String,
}

fn decode_uploads(bodies: Vec<UploadBody>) -> ApiResult<Vec<Upload>> {
    bodies
        .into_iter()
        .map(|body| {
            let data = base64::engine::general_purpose::STANDARD
                .decode(&body.data)
                .map_err(|_| {
                    ApiError(AppError::Validation(format!(
                        "upload {} is not valid base64",
                        body.name
                    )))
                })?;
            Ok(Upload {
                name: body.name,
                data: Bytes::from(data),
            })
        })
        .collect()
}

// ── Mutations ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePostBody {
    pub topic: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub uploads: Vec<UploadBody>,
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreatePostBody>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    let post = state
        .service
        .create_post(
            actor,
            NewPost {
                topic: body.topic,
                title: body.title,
                content: body.content,
                uploads: decode_uploads(body.uploads)?,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(Deserialize)]
pub struct CreateCommentBody {
    pub from_post: Uuid,
    pub parent_comment: Option<Uuid>,
    pub content: String,
    #[serde(default)]
    pub uploads: Vec<UploadBody>,
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateCommentBody>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    let comment = state
        .service
        .create_comment(
            actor,
            NewComment {
                from_post: body.from_post,
                parent_comment: body.parent_comment,
                content: body.content,
                uploads: decode_uploads(body.uploads)?,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Deserialize)]
pub struct UpdatePostBody {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub uploads: Vec<UploadBody>,
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePostBody>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    let post = state
        .service
        .update_post(
            actor,
            id,
            PostPatch {
                title: body.title,
                content: body.content,
                uploads: decode_uploads(body.uploads)?,
            },
        )
        .await?;
    Ok(Json(post))
}

#[derive(Deserialize)]
pub struct UpdateCommentBody {
    pub content: Option<String>,
    #[serde(default)]
    pub uploads: Vec<UploadBody>,
}

pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCommentBody>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    let comment = state
        .service
        .update_comment(
            actor,
            id,
            CommentPatch {
                content: body.content,
                uploads: decode_uploads(body.uploads)?,
            },
        )
        .await?;
    Ok(Json(comment))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = current_user(&headers)?;
    state.service.delete_post(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = current_user(&headers)?;
    state.service.delete_comment(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Toggles (body of the response is the join record, or null when the
//    toggle landed as the off transition) ────────────────────────────────

pub async fn toggle_bookmark(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(post): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    let outcome = state.service.toggle_bookmark(actor, post).await?;
    Ok(Json(outcome))
}

pub async fn toggle_like_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(post): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    let outcome = state.service.toggle_like_post(actor, post).await?;
    Ok(Json(outcome))
}

pub async fn toggle_like_comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(comment): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    let outcome = state.service.toggle_like_comment(actor, comment).await?;
    Ok(Json(outcome))
}

// ── Reads ───────────────────────────────────────────────────────────────

pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_post(id).await?))
}

pub async fn list_posts_for_topic(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.list_posts_for_topic(&name).await?))
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.list_comments_for_post(id).await?))
}

pub async fn list_topics(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.list_topics().await?))
}

#[derive(Deserialize)]
pub struct CreateTopicBody {
    pub name: String,
}

pub async fn create_topic(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateTopicBody>,
) -> ApiResult<impl IntoResponse> {
    current_user(&headers)?;
    let topic = state.service.create_topic(&body.name).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn my_bookmarks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    Ok(Json(
        state.service.list_saved_posts(actor, SaveKind::Bookmark).await?,
    ))
}

pub async fn my_likes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user(&headers)?;
    Ok(Json(
        state.service.list_saved_posts(actor, SaveKind::Like).await?,
    ))
}

// ── Images ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ImageName {
    #[serde(default = "default_image_name")]
    pub name: String,
}

fn default_image_name() -> String {
    "user-upload".to_string()
}

/// Accepts raw image bytes; the processor normalizes them before storage.
pub async fn create_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ImageName>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    current_user(&headers)?;
    let blob = state.service.store_image(&query.name, body).await?;
    Ok((StatusCode::CREATED, Json(blob)))
}

pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let blob = state.service.get_image(id).await?;
    Ok(([(header::CONTENT_TYPE, blob.mime_type)], blob.data).into_response())
}
