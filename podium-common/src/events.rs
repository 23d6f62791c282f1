//! Practice lifecycle events and the broadcast bus that fans them out
//!
//! Every observable state change in the Practice Coach service goes
//! through one `PracticeEvent` emitted on the shared `EventBus`; the SSE
//! endpoint forwards them to connected clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Lifecycle events of practice sessions and their attempts
///
/// One closed enum for everything the service announces, serialized with
/// a `type` tag so SSE consumers can dispatch on the variant name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PracticeEvent {
    /// Practice session created with its first attempt
    ///
    /// Triggers:
    /// - SSE: Add session to sidebar listings
    SessionCreated {
        /// New session UUID
        session_id: Uuid,
        /// First attempt UUID (always attempt 1)
        attempt_id: Uuid,
        /// When session was created
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Practice session deleted along with all of its attempts
    SessionDeleted {
        /// Session UUID that was removed
        session_id: Uuid,
        /// When session was deleted
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session favorite flag flipped
    FavoriteToggled {
        /// Session UUID
        session_id: Uuid,
        /// New favorite value after the toggle
        favorite: bool,
        /// When flag changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// New attempt appended to an existing session (retry)
    ///
    /// Triggers:
    /// - SSE: Refresh session detail view
    AttemptStarted {
        /// Owning session UUID
        session_id: Uuid,
        /// New attempt UUID
        attempt_id: Uuid,
        /// 1-based position within the session
        attempt_index: u32,
        /// When attempt started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis job started for an attempt
    AnalysisStarted {
        /// Attempt UUID under analysis
        attempt_id: Uuid,
        /// When job started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis progress update
    ///
    /// Emitted at every whole-percent increment while the job runs.
    ///
    /// Triggers:
    /// - SSE: Update progress bar and stage label
    AnalysisProgress {
        /// Attempt UUID under analysis
        attempt_id: Uuid,
        /// Progress percentage (0-100)
        progress: u8,
        /// Zero-based index of the current pipeline stage
        stage_index: usize,
        /// Human-readable description of the current stage
        stage_label: String,
        /// When the increment happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis job finished with a score
    ///
    /// Triggers:
    /// - SSE: Unlock the results gate once ratings are also complete
    AnalysisCompleted {
        /// Attempt UUID that finished analysis
        attempt_id: Uuid,
        /// Overall score produced by the score source
        score: u32,
        /// When job completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis job failed
    AnalysisFailed {
        /// Attempt UUID whose job failed
        attempt_id: Uuid,
        /// What went wrong, as reported by the score source
        error: String,
        /// When job failed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis job cancelled before completion
    ///
    /// Recorded ratings are unaffected; the job returns to idle.
    AnalysisCancelled {
        /// Attempt UUID whose job was cancelled
        attempt_id: Uuid,
        /// Progress percentage at the moment of cancellation
        progress: u8,
        /// When job was cancelled
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Self-evaluation rating recorded for one category
    RatingRecorded {
        /// Attempt UUID being rated
        attempt_id: Uuid,
        /// Category wire name (eyeContact, posture, voice, content)
        category: String,
        /// Rating value (1-5)
        value: u8,
        /// When rating recorded
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Attempt results committed
    ///
    /// Triggers:
    /// - SSE: Move session to its new recency position, show final score
    AttemptCommitted {
        /// Owning session UUID
        session_id: Uuid,
        /// Committed attempt UUID
        attempt_id: Uuid,
        /// Final score written to the attempt
        score: u32,
        /// When commit happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PracticeEvent {
    /// Variant name, used as the SSE event tag
    pub fn event_type(&self) -> &str {
        match self {
            PracticeEvent::SessionCreated { .. } => "SessionCreated",
            PracticeEvent::SessionDeleted { .. } => "SessionDeleted",
            PracticeEvent::FavoriteToggled { .. } => "FavoriteToggled",
            PracticeEvent::AttemptStarted { .. } => "AttemptStarted",
            PracticeEvent::AnalysisStarted { .. } => "AnalysisStarted",
            PracticeEvent::AnalysisProgress { .. } => "AnalysisProgress",
            PracticeEvent::AnalysisCompleted { .. } => "AnalysisCompleted",
            PracticeEvent::AnalysisFailed { .. } => "AnalysisFailed",
            PracticeEvent::AnalysisCancelled { .. } => "AnalysisCancelled",
            PracticeEvent::RatingRecorded { .. } => "RatingRecorded",
            PracticeEvent::AttemptCommitted { .. } => "AttemptCommitted",
        }
    }
}

/// Broadcast hub carrying `PracticeEvent`s to every listener
///
/// Thin wrapper over `tokio::sync::broadcast`: emitting never blocks,
/// any number of receivers may listen concurrently, and a receiver that
/// falls behind gets a lag error rather than stalling the sender.
///
/// # Examples
///
/// ```
/// use podium_common::events::{EventBus, PracticeEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit(PracticeEvent::FavoriteToggled {
///     session_id: uuid::Uuid::new_v4(),
///     favorite: true,
///     timestamp: chrono::Utc::now(),
/// }).ok();
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PracticeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus whose channel buffers up to `capacity` undelivered
    /// events per receiver before the oldest are dropped
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Open a receiver for events emitted from this point on; earlier
    /// events are not replayed
    pub fn subscribe(&self) -> broadcast::Receiver<PracticeEvent> {
        self.tx.subscribe()
    }

    /// Send an event to every receiver
    ///
    /// On success the count of receivers is returned; with nobody
    /// listening the send fails and hands the event back.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PracticeEvent,
    ) -> Result<usize, broadcast::error::SendError<PracticeEvent>> {
        self.tx.send(event)
    }

    /// Send an event, treating the no-receivers case as success
    ///
    /// The right call for high-frequency traffic such as progress
    /// updates, where an absent listener is the normal case.
    pub fn emit_lossy(&self, event: PracticeEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of receivers currently attached
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Channel capacity the bus was built with
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
