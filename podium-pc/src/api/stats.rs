//! Aggregate statistics API handlers
//!
//! GET /api/my-stats and GET /api/service-stats. Canned payloads with a
//! stable shape; the aggregation pipeline behind them is a future
//! collaborator, not part of this service.

use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::AppState;

/// GET /api/my-stats
///
/// Per-user practice statistics for the profile page.
pub async fn my_stats() -> Json<serde_json::Value> {
    Json(json!({
        "userStats": {
            "name": "Demo Presenter",
            "email": "presentation@example.com",
            "joinDate": "February 2026",
            "totalPresentations": 15,
            "averageScore": 86,
            "bestScore": 92,
            "improvementRate": "+12%"
        },
        "categoryStats": [
            { "category": "Eye contact", "average": 85, "best": 92 },
            { "category": "Voice analysis", "average": 78, "best": 85 },
            { "category": "Posture & gestures", "average": 92, "best": 95 },
            { "category": "Presentation content", "average": 88, "best": 93 }
        ],
        "recentAchievements": [
            { "title": "First presentation completed", "icon": "🎉", "date": "2024-01-15" },
            { "title": "Broke an 80-point average", "icon": "🔥", "date": "2024-01-20" },
            { "title": "Ten practice runs logged", "icon": "💪", "date": "2024-01-25" },
            { "title": "Flawless eye contact", "icon": "👀", "date": "2024-01-28" }
        ]
    }))
}

/// GET /api/service-stats
///
/// Service-wide counters for the landing page.
pub async fn service_stats() -> Json<serde_json::Value> {
    Json(json!({
        "totalAnalyzed": 1240,
        "activeUsers": 450,
        "averageImprovement": 24
    }))
}

/// Build statistics routes
pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/api/my-stats", get(my_stats))
        .route("/api/service-stats", get(service_stats))
}
