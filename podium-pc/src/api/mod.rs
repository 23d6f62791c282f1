//! HTTP API handlers for podium-pc
//!
//! One router per resource, merged in `build_router`. Handlers translate
//! between the wire shapes and the lifecycle core, and emit the
//! session-level events the core itself does not own.

pub mod attempts;
pub mod auth;
pub mod health;
pub mod report;
pub mod sessions;
pub mod sse;
pub mod stats;

pub use attempts::attempt_routes;
pub use auth::auth_routes;
pub use health::health_routes;
pub use report::report_routes;
pub use sessions::session_routes;
pub use sse::event_stream;
pub use stats::stats_routes;
