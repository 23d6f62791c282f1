//! Data models for podium-pc (Practice Coach service)

pub mod rating;
pub mod session;

pub use rating::{RatingCategory, SelfEvaluation};
pub use session::{Attempt, AttemptStatus, PresentationConfig, Session};
