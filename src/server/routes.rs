//! Request handlers. Backend calls run on the blocking pool.

use super::AppState;
use crate::backend::{Backend, BackendError, BackendResult};
use crate::domain::{Note, NoteError};
use crate::infra::base64_data;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;

/// Failure of a request, rendered as a status code and short body.
#[derive(Debug)]
pub enum ApiError {
    Backend(BackendError),
    BadRequest(String),
    Internal(String),
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        ApiError::Backend(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::BadRequest(message) => {
                return (StatusCode::BAD_REQUEST, message).into_response();
            }
            ApiError::Internal(message) => {
                tracing::error!(%message, "request failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, message).into_response();
            }
            ApiError::Backend(err) => err,
        };

        match err {
            BackendError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
            BackendError::NoteExist(_) => (StatusCode::CONFLICT, err.to_string()).into_response(),
            BackendError::InvalidName(_) | BackendError::BadRequest => {
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            BackendError::NotModified(_) => StatusCode::NOT_MODIFIED.into_response(),
            BackendError::IntegrityFail(note) => {
                tracing::warn!(name = note.name(), "serving note that failed integrity check");
                (StatusCode::UNPROCESSABLE_ENTITY, Json(*note)).into_response()
            }
            other => {
                tracing::error!(error = %other, "backend error");
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}

/// Incoming note JSON. Only the name and content are trusted.
#[derive(Debug, Deserialize)]
pub struct NotePayload {
    #[serde(default)]
    name: String,
    #[serde(default, with = "base64_data")]
    data: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    filter: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    query: String,
}

/// Runs a backend call on the blocking pool.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn Backend) -> BackendResult<T> + Send + 'static,
    T: Send + 'static,
{
    let backend = Arc::clone(&state.backend);
    let result = tokio::task::spawn_blocking(move || f(backend.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("backend task failed: {}", e)))?;
    Ok(result?)
}

pub async fn list_notes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = blocking(&state, move |b| b.list(&params.filter)).await?;
    Ok(Json(notes))
}

pub async fn search_notes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = blocking(&state, move |b| b.search(&params.query)).await?;
    Ok(Json(notes))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let note = blocking(&state, move |b| b.get(&name)).await?;
    Ok(Json(note))
}

pub async fn create_note(
    State(state): State<AppState>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload?;
    let note = Note::new(payload.name, payload.data.unwrap_or_default()).map_err(|e| match e {
        NoteError::InvalidName(name) => ApiError::Backend(BackendError::InvalidName(name)),
        other => ApiError::BadRequest(other.to_string()),
    })?;

    tracing::debug!(name = note.name(), id = %note.id(), "create via api");
    blocking(&state, move |b| b.create(&note)).await?;
    Ok(StatusCode::OK)
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload?;
    let Some(data) = payload.data else {
        return Err(ApiError::BadRequest("missing note data".to_string()));
    };

    blocking(&state, move |b| b.update(&name, &data)).await?;
    Ok(StatusCode::OK)
}

/// Deletes `name`. A note whose content is corrupt can still be deleted.
///
/// With `?id=`, only the note with that id is removed; a different current
/// note under the same name is left alone.
pub async fn delete_note(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |b| {
        let note = b.get(&name).or_else(BackendError::recover_note)?;
        if let Some(id) = params.id.filter(|id| id != note.id().as_str()) {
            tracing::debug!(name = %name, %id, current = %note.id(), "stale delete, keeping current note");
            return Ok(());
        }
        b.delete(&note)
    })
    .await?;
    Ok(StatusCode::OK)
}
