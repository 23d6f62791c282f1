//! Session API handlers
//!
//! POST /api/sessions, GET /api/sessions, GET /api/sessions/grouped,
//! GET/DELETE /api/sessions/:id, POST /api/sessions/:id/retry,
//! POST /api/sessions/:id/favorite

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{PresentationConfig, Session},
    store::GroupedSessions,
    AppState,
};
use podium_common::events::PracticeEvent;

/// POST /api/sessions request
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Presentation setup from the configuration form; required
    pub config: Option<PresentationConfig>,
}

/// POST /api/sessions response
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub attempt_id: Uuid,
    pub attempt_index: u32,
}

/// POST /api/sessions/:id/retry response
#[derive(Debug, Serialize)]
pub struct RetryResponse {
    pub session_id: Uuid,
    pub attempt_id: Uuid,
    pub attempt_index: u32,
}

/// POST /api/sessions/:id/favorite response
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub session_id: Uuid,
    pub favorite: bool,
}

/// DELETE /api/sessions/:id response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub session_id: Uuid,
    /// False when the id was already gone; the delete is idempotent
    pub deleted: bool,
}

/// POST /api/sessions
///
/// Create a practice session with its first pending attempt.
/// Returns 201 Created.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let (session_id, attempt_id) = state.store.create_session(request.config).await?;

    tracing::info!(
        session_id = %session_id,
        attempt_id = %attempt_id,
        "Practice session created"
    );
    state.event_bus.emit_lossy(PracticeEvent::SessionCreated {
        session_id,
        attempt_id,
        timestamp: podium_common::time::now(),
    });

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            attempt_id,
            attempt_index: 1,
        }),
    ))
}

/// GET /api/sessions
///
/// All sessions, most recent activity first.
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<Session>> {
    Json(state.store.list().await)
}

/// GET /api/sessions/grouped
///
/// Sessions bucketed by calendar-day recency for the sidebar.
pub async fn grouped_sessions(State(state): State<AppState>) -> Json<GroupedSessions> {
    Json(state.store.group_by_recency(podium_common::time::now()).await)
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Session>> {
    let session = state
        .store
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session {}", session_id)))?;
    Ok(Json(session))
}

/// DELETE /api/sessions/:id
///
/// Remove a session and all of its attempts, cancelling any running
/// analysis job and dropping buffered ratings for them. Deleting an
/// unknown id succeeds with `deleted: false`.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Json<DeleteResponse> {
    let deleted = match state.store.delete(session_id).await {
        Some(attempt_ids) => {
            state.coordinator.forget(&attempt_ids).await;
            state.collector.forget(&attempt_ids).await;

            tracing::info!(
                session_id = %session_id,
                attempts = attempt_ids.len(),
                "Practice session deleted"
            );
            state.event_bus.emit_lossy(PracticeEvent::SessionDeleted {
                session_id,
                timestamp: podium_common::time::now(),
            });
            true
        }
        None => false,
    };

    Json(DeleteResponse {
        session_id,
        deleted,
    })
}

/// POST /api/sessions/:id/retry
///
/// Append a fresh pending attempt to a session whose latest attempt has
/// been committed. Returns 201 Created.
pub async fn retry_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<RetryResponse>)> {
    let attempt_id = state.store.retry(session_id).await?;
    let attempt = state
        .store
        .attempt(attempt_id)
        .await
        .ok_or_else(|| ApiError::Internal("attempt vanished after retry".to_string()))?;

    tracing::info!(
        session_id = %session_id,
        attempt_id = %attempt_id,
        attempt_index = attempt.attempt_index,
        "Retry attempt started"
    );
    state.event_bus.emit_lossy(PracticeEvent::AttemptStarted {
        session_id,
        attempt_id,
        attempt_index: attempt.attempt_index,
        timestamp: podium_common::time::now(),
    });

    Ok((
        StatusCode::CREATED,
        Json(RetryResponse {
            session_id,
            attempt_id,
            attempt_index: attempt.attempt_index,
        }),
    ))
}

/// POST /api/sessions/:id/favorite
///
/// Flip the favorite flag, returning the new value.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<FavoriteResponse>> {
    let favorite = state.store.toggle_favorite(session_id).await?;

    state.event_bus.emit_lossy(PracticeEvent::FavoriteToggled {
        session_id,
        favorite,
        timestamp: podium_common::time::now(),
    });

    Ok(Json(FavoriteResponse {
        session_id,
        favorite,
    }))
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route("/api/sessions/grouped", get(grouped_sessions))
        .route(
            "/api/sessions/:session_id",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/:session_id/retry", post(retry_session))
        .route("/api/sessions/:session_id/favorite", post(toggle_favorite))
}
