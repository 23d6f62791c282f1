//! Attempt API handlers
//!
//! POST /api/attempts/:id/analysis/start, POST /api/attempts/:id/analysis/cancel,
//! GET /api/attempts/:id/status, PUT /api/attempts/:id/ratings,
//! POST /api/attempts/:id/commit

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    analysis::AnalysisState,
    barrier::{self, BarrierState},
    error::{ApiError, ApiResult},
    models::{AttemptStatus, RatingCategory},
    AppState,
};

/// POST /api/attempts/:id/analysis/start response
#[derive(Debug, Serialize)]
pub struct StartAnalysisResponse {
    pub attempt_id: Uuid,
    pub analysis: AnalysisState,
}

/// POST /api/attempts/:id/analysis/cancel response
#[derive(Debug, Serialize)]
pub struct CancelAnalysisResponse {
    pub attempt_id: Uuid,
    pub analysis: AnalysisState,
}

/// GET /api/attempts/:id/status response
///
/// Snapshot of both result producers plus the commit gate computed from
/// them, all read at one moment.
#[derive(Debug, Serialize)]
pub struct AttemptStatusResponse {
    pub attempt_id: Uuid,
    pub session_id: Uuid,
    pub attempt_index: u32,
    pub status: AttemptStatus,
    pub analysis: AnalysisState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_label: Option<&'static str>,
    pub ratings: HashMap<RatingCategory, u8>,
    pub ratings_complete: bool,
    pub barrier: BarrierState,
}

/// PUT /api/attempts/:id/ratings request
#[derive(Debug, Deserialize)]
pub struct SetRatingRequest {
    /// Category wire name: eyeContact, posture, voice or content
    pub category: String,
    /// Rating on the 1-5 scale
    pub value: i64,
}

/// PUT /api/attempts/:id/ratings response
#[derive(Debug, Serialize)]
pub struct SetRatingResponse {
    pub attempt_id: Uuid,
    pub category: RatingCategory,
    pub value: i64,
    pub ratings_complete: bool,
}

/// POST /api/attempts/:id/commit response
#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub session_id: Uuid,
}

/// POST /api/attempts/:id/analysis/start
///
/// Kick off the scoring job for a pending attempt. Returns 202 Accepted
/// with the initial running state; progress streams over /api/events.
pub async fn start_analysis(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<StartAnalysisResponse>)> {
    let analysis = state.coordinator.start(attempt_id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(StartAnalysisResponse {
            attempt_id,
            analysis,
        }),
    ))
}

/// POST /api/attempts/:id/analysis/cancel
///
/// Stop a running job and discard its progress. Ratings recorded so far
/// stay put.
pub async fn cancel_analysis(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> ApiResult<Json<CancelAnalysisResponse>> {
    let analysis = state.coordinator.cancel(attempt_id).await?;
    Ok(Json(CancelAnalysisResponse {
        attempt_id,
        analysis,
    }))
}

/// GET /api/attempts/:id/status
pub async fn attempt_status(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> ApiResult<Json<AttemptStatusResponse>> {
    let attempt = state
        .store
        .attempt(attempt_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("attempt {}", attempt_id)))?;

    let analysis = state.coordinator.state(attempt_id).await;
    let ratings = state.collector.ratings(attempt_id).await;
    let ratings_complete = state.collector.is_complete(attempt_id).await;
    let gate = barrier::evaluate(&analysis, ratings_complete);

    Ok(Json(AttemptStatusResponse {
        attempt_id,
        session_id: attempt.session_id,
        attempt_index: attempt.attempt_index,
        status: attempt.status,
        stage_label: analysis.stage_label(),
        analysis,
        ratings,
        ratings_complete,
        barrier: gate,
    }))
}

/// PUT /api/attempts/:id/ratings
///
/// Record one self-evaluation rating. The category must be one of the
/// four known names; the value must be 1-5. Last write wins.
pub async fn set_rating(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(request): Json<SetRatingRequest>,
) -> ApiResult<Json<SetRatingResponse>> {
    let category: RatingCategory = request.category.parse()?;
    state
        .collector
        .set_rating(attempt_id, category, request.value)
        .await?;
    let ratings_complete = state.collector.is_complete(attempt_id).await;

    Ok(Json(SetRatingResponse {
        attempt_id,
        category,
        value: request.value,
        ratings_complete,
    }))
}

/// POST /api/attempts/:id/commit
///
/// Assemble the final result once analysis and self-evaluation are both
/// done, committing it to the owning session in one atomic write.
pub async fn commit_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> ApiResult<Json<CommitResponse>> {
    let session_id = state.assembler.commit(attempt_id).await?;
    Ok(Json(CommitResponse { session_id }))
}

/// Build attempt routes
pub fn attempt_routes() -> Router<AppState> {
    Router::new()
        .route("/api/attempts/:attempt_id/analysis/start", post(start_analysis))
        .route("/api/attempts/:attempt_id/analysis/cancel", post(cancel_analysis))
        .route("/api/attempts/:attempt_id/status", get(attempt_status))
        .route("/api/attempts/:attempt_id/ratings", put(set_rating))
        .route("/api/attempts/:attempt_id/commit", post(commit_attempt))
}
