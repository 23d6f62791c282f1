//! Analysis job coordination
//!
//! Drives the asynchronous scoring job for an attempt through a small
//! state machine: Idle until started, Running while progress ticks from
//! 0 to 100, then Complete with a score or Failed with an error. One job
//! per attempt; progress is observable at every increment through the
//! event bus and the state snapshot.

use podium_common::events::{EventBus, PracticeEvent};
use podium_common::time::millis_to_duration;
use podium_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::store::SessionStore;

/// Milliseconds per 1% of progress at the default cadence, so a full run
/// takes about eight seconds
pub const DEFAULT_TICK_MS: u64 = 80;

/// Score assigned by the placeholder source until a real model exists
pub const PLACEHOLDER_SCORE: u32 = 86;

/// Pipeline stage labels shown while the job runs, one per 20% band
pub const STAGE_LABELS: [&str; 5] = [
    "Uploading video...",
    "Extracting audio data...",
    "Analyzing gaze and posture...",
    "Analyzing presentation content...",
    "Generating overall evaluation...",
];

/// Stage index for a progress percentage (five equal 20% bands)
pub fn stage_for_progress(progress: u8) -> usize {
    ((progress / 20) as usize).min(STAGE_LABELS.len() - 1)
}

/// Analysis job state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "UPPERCASE")]
pub enum AnalysisState {
    /// No job has run, or the last run was cancelled
    Idle,
    /// Job ticking toward completion
    Running { progress: u8, stage_index: usize },
    /// Job finished; score awaits commit
    Complete { score: u32 },
    /// Job failed; an explicit restart is required
    Failed { error: String },
}

impl AnalysisState {
    pub fn is_running(&self) -> bool {
        matches!(self, AnalysisState::Running { .. })
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, AnalysisState::Complete { .. })
    }

    /// Stage label for display, present only while running
    pub fn stage_label(&self) -> Option<&'static str> {
        match self {
            AnalysisState::Running { stage_index, .. } => Some(STAGE_LABELS[*stage_index]),
            _ => None,
        }
    }
}

/// Source of the final overall score for a completed analysis run
///
/// The real scoring model lives outside this service; the default source
/// assigns the fixed placeholder score every time.
pub trait ScoreSource: Send + Sync + 'static {
    fn score(&self, attempt_id: Uuid) -> std::result::Result<u32, String>;
}

/// Fixed-score source used until a real analysis backend exists
pub struct FixedScore(pub u32);

impl ScoreSource for FixedScore {
    fn score(&self, _attempt_id: Uuid) -> std::result::Result<u32, String> {
        Ok(self.0)
    }
}

struct JobEntry {
    state: AnalysisState,
    cancel: Option<CancellationToken>,
}

/// Coordinates one analysis job per attempt
///
/// Handle is cheap to clone; all clones share the job table.
#[derive(Clone)]
pub struct AnalysisCoordinator {
    store: SessionStore,
    event_bus: EventBus,
    jobs: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
    score_source: Arc<dyn ScoreSource>,
    tick_interval: std::time::Duration,
}

impl AnalysisCoordinator {
    pub fn new(store: SessionStore, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            score_source: Arc::new(FixedScore(PLACEHOLDER_SCORE)),
            tick_interval: millis_to_duration(DEFAULT_TICK_MS),
        }
    }

    /// Override the tick cadence (tests run with a millisecond tick)
    pub fn with_tick_interval(mut self, interval: std::time::Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Override the score source
    pub fn with_score_source(mut self, source: Arc<dyn ScoreSource>) -> Self {
        self.score_source = source;
        self
    }

    /// Current job state for an attempt; Idle when no job has run
    pub async fn state(&self, attempt_id: Uuid) -> AnalysisState {
        self.jobs
            .read()
            .await
            .get(&attempt_id)
            .map(|entry| entry.state.clone())
            .unwrap_or(AnalysisState::Idle)
    }

    /// Start the analysis job for an attempt
    ///
    /// Valid from Idle and Failed. A running job and a completed one both
    /// reject the start; a finished score is discarded only by committing
    /// it, never by silently re-running. Returns the initial running state.
    pub async fn start(&self, attempt_id: Uuid) -> Result<AnalysisState> {
        self.store.ensure_pending(attempt_id).await?;

        let token = CancellationToken::new();
        {
            let mut jobs = self.jobs.write().await;
            match jobs.get(&attempt_id).map(|entry| &entry.state) {
                Some(AnalysisState::Running { .. }) => {
                    return Err(Error::AlreadyRunning(format!(
                        "attempt {} analysis is running",
                        attempt_id
                    )));
                }
                Some(AnalysisState::Complete { .. }) => {
                    return Err(Error::AlreadyRunning(format!(
                        "attempt {} analysis already produced a score",
                        attempt_id
                    )));
                }
                _ => {}
            }
            jobs.insert(
                attempt_id,
                JobEntry {
                    state: AnalysisState::Running {
                        progress: 0,
                        stage_index: 0,
                    },
                    cancel: Some(token.clone()),
                },
            );
        }

        tracing::info!(attempt_id = %attempt_id, "Analysis job started");
        self.event_bus.emit_lossy(PracticeEvent::AnalysisStarted {
            attempt_id,
            timestamp: podium_common::time::now(),
        });

        let coordinator = self.clone();
        tokio::spawn(async move {
            coordinator.run_job(attempt_id, token).await;
        });

        Ok(AnalysisState::Running {
            progress: 0,
            stage_index: 0,
        })
    }

    /// Cancel a running job
    ///
    /// Progress is discarded and the job returns to Idle; recorded
    /// self-evaluation ratings are untouched. Only a running job can be
    /// cancelled.
    pub async fn cancel(&self, attempt_id: Uuid) -> Result<AnalysisState> {
        let progress = {
            let mut jobs = self.jobs.write().await;
            let entry = jobs.get_mut(&attempt_id).ok_or_else(|| {
                Error::NotFound(format!("analysis job for attempt {}", attempt_id))
            })?;

            let progress = match entry.state {
                AnalysisState::Running { progress, .. } => progress,
                _ => {
                    return Err(Error::Analysis(format!(
                        "no running job for attempt {}",
                        attempt_id
                    )));
                }
            };

            if let Some(token) = entry.cancel.take() {
                token.cancel();
            }
            entry.state = AnalysisState::Idle;
            progress
        };

        tracing::info!(attempt_id = %attempt_id, progress, "Analysis job cancelled");
        self.event_bus.emit_lossy(PracticeEvent::AnalysisCancelled {
            attempt_id,
            progress,
            timestamp: podium_common::time::now(),
        });
        Ok(AnalysisState::Idle)
    }

    /// Drop job records for attempts that no longer need them, cancelling
    /// any live run (session delete cascade, post-commit cleanup)
    pub async fn forget(&self, attempt_ids: &[Uuid]) {
        let mut jobs = self.jobs.write().await;
        for attempt_id in attempt_ids {
            if let Some(entry) = jobs.remove(attempt_id) {
                if let Some(token) = entry.cancel {
                    token.cancel();
                }
            }
        }
    }

    /// Background task: advance progress one percent per tick, then fetch
    /// the score
    async fn run_job(&self, attempt_id: Uuid, token: CancellationToken) {
        let mut interval = tokio::time::interval(self.tick_interval);
        // The first interval tick completes immediately; consume it so
        // every percent costs a full tick.
        interval.tick().await;

        for progress in 1..=100u8 {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = interval.tick() => {}
            }

            let stage_index = stage_for_progress(progress);
            if !self.advance_if_running(attempt_id, progress, stage_index).await {
                // Cancelled or forgotten since the last tick
                return;
            }

            self.event_bus.emit_lossy(PracticeEvent::AnalysisProgress {
                attempt_id,
                progress,
                stage_index,
                stage_label: STAGE_LABELS[stage_index].to_string(),
                timestamp: podium_common::time::now(),
            });
        }

        self.finish(attempt_id).await;
    }

    /// Write the next progress value if the job is still running
    async fn advance_if_running(&self, attempt_id: Uuid, progress: u8, stage_index: usize) -> bool {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&attempt_id) {
            Some(entry) if entry.state.is_running() => {
                entry.state = AnalysisState::Running {
                    progress,
                    stage_index,
                };
                true
            }
            _ => false,
        }
    }

    /// Resolve the finished run to Complete or Failed
    async fn finish(&self, attempt_id: Uuid) {
        let outcome = self.score_source.score(attempt_id);

        let new_state = {
            let mut jobs = self.jobs.write().await;
            let entry = match jobs.get_mut(&attempt_id) {
                // A cancel that raced the last tick wins; discard the result
                Some(entry) if entry.state.is_running() => entry,
                _ => return,
            };
            entry.cancel = None;
            entry.state = match &outcome {
                Ok(score) => AnalysisState::Complete { score: *score },
                Err(error) => AnalysisState::Failed {
                    error: error.clone(),
                },
            };
            entry.state.clone()
        };

        match new_state {
            AnalysisState::Complete { score } => {
                tracing::info!(attempt_id = %attempt_id, score, "Analysis job completed");
                self.event_bus.emit_lossy(PracticeEvent::AnalysisCompleted {
                    attempt_id,
                    score,
                    timestamp: podium_common::time::now(),
                });
            }
            AnalysisState::Failed { error } => {
                tracing::warn!(attempt_id = %attempt_id, error = %error, "Analysis job failed");
                self.event_bus.emit_lossy(PracticeEvent::AnalysisFailed {
                    attempt_id,
                    error,
                    timestamp: podium_common::time::now(),
                });
            }
            _ => {}
        }
    }
}
