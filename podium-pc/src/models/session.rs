//! Practice session and attempt records
//!
//! A session owns an ordered list of attempts. Exactly one attempt per
//! session is pending at any time; committed attempts are immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::rating::SelfEvaluation;

/// Title used when the configuration carries no topic
pub const UNTITLED_SESSION: &str = "New presentation";

/// Attempt lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttemptStatus {
    /// Practice finished, results not yet assembled
    Pending,
    /// Results committed; record is immutable from here on
    Committed,
}

/// Structured setup input captured before a practice run
///
/// The lifecycle core checks only for its presence; field content is
/// interpreted by the (future) analysis backend, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Presentation topic; doubles as the session title when present
    pub topic: Option<String>,
    /// Purpose of the talk (inform, persuade, ...)
    pub purpose: Option<String>,
    /// Evaluation criteria weights keyed by criterion name
    pub criteria: Option<HashMap<String, u32>>,
    /// Audience familiarity with the topic
    pub audience_knowledge: Option<String>,
    /// Time limit in minutes
    pub time_limit: Option<u32>,
    /// Requested tone for feedback copy
    pub feedback_tone: Option<String>,
}

impl PresentationConfig {
    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.topic.is_none()
            && self.purpose.is_none()
            && self.criteria.is_none()
            && self.audience_knowledge.is_none()
            && self.time_limit.is_none()
            && self.feedback_tone.is_none()
    }

    /// Session title derived from the topic, falling back to a placeholder
    pub fn title(&self) -> String {
        match self.topic.as_deref() {
            Some(topic) if !topic.trim().is_empty() => topic.to_string(),
            _ => UNTITLED_SESSION.to_string(),
        }
    }
}

/// One practice run within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// Unique attempt identifier
    pub id: Uuid,

    /// Owning session
    pub session_id: Uuid,

    /// 1-based position within the session, strictly increasing
    pub attempt_index: u32,

    /// When the attempt was started
    pub started_at: DateTime<Utc>,

    /// When results were committed (terminal), None while pending
    pub completed_at: Option<DateTime<Utc>>,

    /// Analysis score, written only at commit
    pub ai_score: Option<u32>,

    /// Self-evaluation ratings, written only at commit
    pub self_evaluation: Option<SelfEvaluation>,

    /// Lifecycle status
    pub status: AttemptStatus,
}

impl Attempt {
    /// Create a new pending attempt
    pub fn new(session_id: Uuid, attempt_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            attempt_index,
            started_at: Utc::now(),
            completed_at: None,
            ai_score: None,
            self_evaluation: None,
            status: AttemptStatus::Pending,
        }
    }

    /// Check if attempt has been committed
    pub fn is_committed(&self) -> bool {
        matches!(self.status, AttemptStatus::Committed)
    }

    /// Most recent activity on this attempt: completion when committed,
    /// otherwise the start time
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.started_at)
    }
}

/// Practice session (in-memory state)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier, immutable after creation
    pub id: Uuid,

    /// Display title (topic, or a placeholder)
    pub title: String,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// Favorite flag toggled from the sidebar
    pub favorite: bool,

    /// Setup captured at creation
    pub config: PresentationConfig,

    /// Score of the most recently committed attempt
    pub current_score: Option<u32>,

    /// Attempts ordered by strictly increasing attempt_index, never empty
    pub attempts: Vec<Attempt>,
}

impl Session {
    /// Create a new session with its first pending attempt
    pub fn new(config: PresentationConfig) -> Self {
        let id = Uuid::new_v4();
        let first_attempt = Attempt::new(id, 1);
        Self {
            id,
            title: config.title(),
            created_at: first_attempt.started_at,
            favorite: false,
            config,
            current_score: None,
            attempts: vec![first_attempt],
        }
    }

    /// Most recent attempt (highest attempt_index)
    pub fn latest_attempt(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    /// Timestamp of the most recent activity across attempts, used for
    /// list ordering and recency grouping
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.attempts
            .last()
            .map(|a| a.activity_at())
            .unwrap_or(self.created_at)
    }

    /// Append the next pending attempt, returning its id
    ///
    /// Caller must have verified that the latest attempt is committed.
    pub fn push_attempt(&mut self) -> Uuid {
        let next_index = self
            .attempts
            .last()
            .map(|a| a.attempt_index + 1)
            .unwrap_or(1);
        let attempt = Attempt::new(self.id, next_index);
        let attempt_id = attempt.id;
        self.attempts.push(attempt);
        attempt_id
    }
}
