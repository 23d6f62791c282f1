//! podium-pc library interface
//!
//! Exposes the practice lifecycle core and its HTTP surface for
//! integration testing.

pub mod analysis;
pub mod api;
pub mod assembler;
pub mod barrier;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analysis::AnalysisCoordinator;
use crate::assembler::ResultAssembler;
use crate::evaluation::SelfEvaluationCollector;
use crate::store::SessionStore;
use podium_common::events::EventBus;
use podium_common::time::millis_to_duration;

/// Shared handles behind every handler; cloning shares all of them
#[derive(Clone)]
pub struct AppState {
    /// Session and attempt records
    pub store: SessionStore,
    /// Per-attempt analysis jobs
    pub coordinator: AnalysisCoordinator,
    /// Per-attempt self-evaluation ratings
    pub collector: SelfEvaluationCollector,
    /// Commit path joining both result producers
    pub assembler: ResultAssembler,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the core components at the default analysis cadence
    pub fn new(event_bus: EventBus) -> Self {
        Self::with_tick_interval(event_bus, millis_to_duration(analysis::DEFAULT_TICK_MS))
    }

    /// Wire the core with a custom analysis tick (tests run in
    /// milliseconds)
    pub fn with_tick_interval(event_bus: EventBus, tick_interval: Duration) -> Self {
        let store = SessionStore::new();
        let coordinator = AnalysisCoordinator::new(store.clone(), event_bus.clone())
            .with_tick_interval(tick_interval);
        let collector = SelfEvaluationCollector::new(store.clone(), event_bus.clone());
        let assembler = ResultAssembler::new(
            store.clone(),
            coordinator.clone(),
            collector.clone(),
            event_bus.clone(),
        );

        Self {
            store,
            coordinator,
            collector,
            assembler,
            event_bus,
            startup_time: podium_common::time::now(),
        }
    }
}

/// Assemble the full route table over one `AppState`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Lifecycle resources
        .merge(api::session_routes())
        .merge(api::attempt_routes())
        // Mock collaborators (report, auth, aggregates)
        .merge(api::report_routes())
        .merge(api::auth_routes())
        .merge(api::stats_routes())
        // Live event feed
        .route("/api/events", get(api::event_stream))
        .merge(api::health_routes())
        .with_state(state)
        // CORS open for the dev frontend origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
