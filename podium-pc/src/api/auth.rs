//! Demo authentication API handlers
//!
//! POST /api/login and POST /api/signup. Real account management is out
//! of scope; a single seeded demo user backs the login check and signup
//! only acknowledges the request.

use axum::{http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Seeded demo credentials
const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "demo1234";

/// POST /api/login and /api/signup request
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct AuthMessage {
    pub message: &'static str,
}

/// POST /api/login success response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub email: String,
}

/// POST /api/login
///
/// Check the credentials against the seeded demo user.
pub async fn login(
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<AuthMessage>)> {
    if request.email == DEMO_EMAIL && request.password == DEMO_PASSWORD {
        tracing::info!(email = %request.email, "Demo login succeeded");
        Ok(Json(LoginResponse {
            message: "Welcome!",
            user: UserInfo {
                email: request.email,
            },
        }))
    } else {
        tracing::info!(email = %request.email, "Demo login rejected");
        Err((
            StatusCode::UNAUTHORIZED,
            Json(AuthMessage {
                message: "Invalid email or password.",
            }),
        ))
    }
}

/// POST /api/signup
///
/// Acknowledge the request without creating anything. Returns 201.
pub async fn signup(
    Json(request): Json<CredentialsRequest>,
) -> (StatusCode, Json<AuthMessage>) {
    tracing::info!(email = %request.email, "Signup request received");
    (
        StatusCode::CREATED,
        Json(AuthMessage {
            message: "Signup complete.",
        }),
    )
}

/// Build auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/signup", post(signup))
}
