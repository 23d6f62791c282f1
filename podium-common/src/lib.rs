//! # Podium Common Library
//!
//! Shared code for the Podium practice services including:
//! - Event types (PracticeEvent enum) and the EventBus
//! - Error types
//! - Configuration loading
//! - Timestamp and recency utilities

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
