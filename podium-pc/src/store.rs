//! In-memory session store
//!
//! Process-lifetime store for practice sessions and their attempts. All
//! mutation of session and attempt records funnels through this store,
//! which serializes writers behind a single RwLock so readers never
//! observe a partially-updated record.

use chrono::{DateTime, Duration, Utc};
use podium_common::time::{recency_bucket, RecencyBucket};
use podium_common::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{AttemptStatus, PresentationConfig, SelfEvaluation, Session};

/// Sessions bucketed by calendar-day recency for the sidebar listing
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupedSessions {
    pub today: Vec<Session>,
    pub yesterday: Vec<Session>,
    pub this_week: Vec<Session>,
    pub older: Vec<Session>,
}

#[derive(Default)]
struct StoreInner {
    sessions: HashMap<Uuid, Session>,
    /// attempt id -> owning session id, for O(1) attempt lookups
    attempt_owner: HashMap<Uuid, Uuid>,
}

/// Thread-safe store handle, cheap to clone
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session with its first pending attempt
    ///
    /// Returns the (session, attempt) id pair. A missing or empty
    /// configuration is rejected; the core never invents a default setup.
    pub async fn create_session(
        &self,
        config: Option<PresentationConfig>,
    ) -> Result<(Uuid, Uuid)> {
        let config = match config {
            Some(config) if !config.is_empty() => config,
            _ => {
                return Err(Error::InvalidConfig(
                    "presentation configuration is required".to_string(),
                ))
            }
        };

        let session = Session::new(config);
        let session_id = session.id;
        let attempt_id = session.attempts[0].id;

        let mut inner = self.inner.write().await;
        inner.attempt_owner.insert(attempt_id, session_id);
        inner.sessions.insert(session_id, session);
        Ok((session_id, attempt_id))
    }

    /// Append a new pending attempt to an existing session
    ///
    /// Rejected while the latest attempt is still pending; a session holds
    /// at most one pending attempt at a time.
    pub async fn retry(&self, session_id: Uuid) -> Result<Uuid> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        if let Some(latest) = session.latest_attempt() {
            if !latest.is_committed() {
                return Err(Error::AttemptInProgress(format!(
                    "session {} latest attempt is still pending",
                    session_id
                )));
            }
        }

        let attempt_id = session.push_attempt();
        inner.attempt_owner.insert(attempt_id, session_id);
        Ok(attempt_id)
    }

    /// Flip the favorite flag, returning the new value
    pub async fn toggle_favorite(&self, session_id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;
        session.favorite = !session.favorite;
        Ok(session.favorite)
    }

    /// Delete a session and all of its attempts
    ///
    /// Idempotent: deleting an unknown id is a no-op. Returns the removed
    /// attempt ids so callers can drop any per-attempt state they hold
    /// (running jobs, rating buffers).
    pub async fn delete(&self, session_id: Uuid) -> Option<Vec<Uuid>> {
        let mut inner = self.inner.write().await;
        let session = inner.sessions.remove(&session_id)?;
        let attempt_ids: Vec<Uuid> = session.attempts.iter().map(|a| a.id).collect();
        for attempt_id in &attempt_ids {
            inner.attempt_owner.remove(attempt_id);
        }
        Some(attempt_ids)
    }

    /// Fetch a session by id
    pub async fn get(&self, session_id: Uuid) -> Option<Session> {
        self.inner.read().await.sessions.get(&session_id).cloned()
    }

    /// Fetch an attempt by id
    pub async fn attempt(&self, attempt_id: Uuid) -> Option<crate::models::Attempt> {
        let inner = self.inner.read().await;
        let session_id = inner.attempt_owner.get(&attempt_id)?;
        inner
            .sessions
            .get(session_id)?
            .attempts
            .iter()
            .find(|a| a.id == attempt_id)
            .cloned()
    }

    /// Verify an attempt exists and has not been committed
    ///
    /// Shared guard for every operation that feeds a pending attempt:
    /// starting analysis, recording ratings, committing results.
    pub async fn ensure_pending(&self, attempt_id: Uuid) -> Result<()> {
        match self.attempt(attempt_id).await {
            None => Err(Error::NotFound(format!("attempt {}", attempt_id))),
            Some(attempt) if attempt.is_committed() => Err(Error::AlreadyCommitted(format!(
                "attempt {}",
                attempt_id
            ))),
            Some(_) => Ok(()),
        }
    }

    /// All sessions ordered by most recent activity, newest first
    pub async fn list(&self) -> Vec<Session> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<Session> = inner.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
        sessions
    }

    /// Sessions bucketed by the recency of their latest activity
    ///
    /// `now` is injected so the calendar boundaries are deterministic.
    /// Buckets preserve the newest-first ordering of `list`.
    pub async fn group_by_recency(&self, now: DateTime<Utc>) -> GroupedSessions {
        let mut grouped = GroupedSessions::default();
        for session in self.list().await {
            match recency_bucket(now, session.last_activity()) {
                RecencyBucket::Today => grouped.today.push(session),
                RecencyBucket::Yesterday => grouped.yesterday.push(session),
                RecencyBucket::ThisWeek => grouped.this_week.push(session),
                RecencyBucket::Older => grouped.older.push(session),
            }
        }
        grouped
    }

    /// Commit an attempt's results in one atomic write
    ///
    /// Sets the score, the complete self-evaluation, the completion time
    /// and the committed status, and refreshes the parent session's
    /// current score, all under a single write-lock acquisition. Returns
    /// the owning session id.
    pub async fn commit_attempt(
        &self,
        attempt_id: Uuid,
        score: u32,
        evaluation: SelfEvaluation,
        now: DateTime<Utc>,
    ) -> Result<Uuid> {
        let mut inner = self.inner.write().await;
        let session_id = *inner
            .attempt_owner
            .get(&attempt_id)
            .ok_or_else(|| Error::NotFound(format!("attempt {}", attempt_id)))?;
        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        let attempt = session
            .attempts
            .iter_mut()
            .find(|a| a.id == attempt_id)
            .ok_or_else(|| Error::NotFound(format!("attempt {}", attempt_id)))?;

        if attempt.is_committed() {
            return Err(Error::AlreadyCommitted(format!("attempt {}", attempt_id)));
        }

        attempt.ai_score = Some(score);
        attempt.self_evaluation = Some(evaluation);
        attempt.completed_at = Some(now);
        attempt.status = AttemptStatus::Committed;
        session.current_score = Some(score);

        Ok(session_id)
    }

    /// Seed the demo fixture sessions shown on first launch
    ///
    /// Four committed sessions spread across the recency buckets, so the
    /// sidebar grouping has something to show before any real practice.
    pub async fn seed_demo(&self) -> Result<()> {
        let now = podium_common::time::now();
        let fixtures = [
            ("Quarterly business review", 86, Duration::zero()),
            ("Product demo rehearsal", 78, Duration::days(1)),
            ("Interview pitch practice", 72, Duration::days(4)),
            ("Conference keynote dry run", 91, Duration::days(12)),
        ];

        let mut inner = self.inner.write().await;
        for (topic, score, age) in fixtures {
            let config = PresentationConfig {
                topic: Some(topic.to_string()),
                purpose: Some("inform".to_string()),
                ..Default::default()
            };
            let mut session = Session::new(config);
            let when = now - age;
            session.created_at = when;
            session.current_score = Some(score);

            let attempt = &mut session.attempts[0];
            attempt.started_at = when;
            attempt.completed_at = Some(when);
            attempt.ai_score = Some(score);
            attempt.self_evaluation = Some(SelfEvaluation {
                eye_contact: 4,
                posture: 4,
                voice: 3,
                content: 4,
            });
            attempt.status = AttemptStatus::Committed;

            inner.attempt_owner.insert(attempt.id, session.id);
            inner.sessions.insert(session.id, session);
        }

        tracing::info!("Seeded {} demo sessions", fixtures.len());
        Ok(())
    }

    /// Snapshot of the current ratings-independent attempt count, for logs
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn demo_config(topic: &str) -> PresentationConfig {
        PresentationConfig {
            topic: Some(topic.to_string()),
            ..Default::default()
        }
    }

    fn full_evaluation() -> SelfEvaluation {
        SelfEvaluation {
            eye_contact: 3,
            posture: 4,
            voice: 5,
            content: 4,
        }
    }

    #[tokio::test]
    async fn test_create_session_requires_config() {
        let store = SessionStore::new();
        let err = store.create_session(None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_create_session_rejects_empty_config() {
        let store = SessionStore::new();
        let err = store
            .create_session(Some(PresentationConfig::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_create_session_starts_first_attempt() {
        let store = SessionStore::new();
        let (session_id, attempt_id) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        let session = store.get(session_id).await.expect("session exists");
        assert_eq!(session.title, "Launch plan");
        assert_eq!(session.attempts.len(), 1);
        assert_eq!(session.attempts[0].id, attempt_id);
        assert_eq!(session.attempts[0].attempt_index, 1);
        assert_eq!(session.attempts[0].status, AttemptStatus::Pending);
    }

    #[tokio::test]
    async fn test_retry_rejected_while_attempt_pending() {
        let store = SessionStore::new();
        let (session_id, _) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        let err = store.retry(session_id).await.unwrap_err();
        assert!(matches!(err, Error::AttemptInProgress(_)));
    }

    #[tokio::test]
    async fn test_retry_after_commit_appends_next_index() {
        let store = SessionStore::new();
        let (session_id, attempt_id) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        store
            .commit_attempt(attempt_id, 86, full_evaluation(), Utc::now())
            .await
            .expect("commit should succeed");

        let second = store.retry(session_id).await.expect("retry should succeed");
        let session = store.get(session_id).await.expect("session exists");
        assert_eq!(session.attempts.len(), 2);
        assert_eq!(session.attempts[1].id, second);
        assert_eq!(session.attempts[1].attempt_index, 2);
        assert_eq!(session.attempts[1].status, AttemptStatus::Pending);

        // Session id is stable across retries
        assert_eq!(session.id, session_id);
    }

    #[tokio::test]
    async fn test_retry_unknown_session() {
        let store = SessionStore::new();
        let err = store.retry(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_toggle_favorite_twice_restores_original() {
        let store = SessionStore::new();
        let (session_id, _) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        assert!(store.toggle_favorite(session_id).await.expect("first toggle"));
        assert!(!store.toggle_favorite(session_id).await.expect("second toggle"));
        let session = store.get(session_id).await.expect("session exists");
        assert!(!session.favorite);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = SessionStore::new();
        let (session_id, attempt_id) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        let removed = store.delete(session_id).await.expect("first delete removes");
        assert_eq!(removed, vec![attempt_id]);
        assert!(store.get(session_id).await.is_none());
        assert!(store.attempt(attempt_id).await.is_none());

        // Second delete of the same id is a quiet no-op
        assert!(store.delete(session_id).await.is_none());
        // As is deleting an id that never existed
        assert!(store.delete(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_commit_writes_all_result_fields_atomically() {
        let store = SessionStore::new();
        let (session_id, attempt_id) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        let committed_at = Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap();
        let owner = store
            .commit_attempt(attempt_id, 86, full_evaluation(), committed_at)
            .await
            .expect("commit should succeed");
        assert_eq!(owner, session_id);

        let session = store.get(session_id).await.expect("session exists");
        let attempt = &session.attempts[0];
        assert_eq!(attempt.status, AttemptStatus::Committed);
        assert_eq!(attempt.ai_score, Some(86));
        assert_eq!(attempt.self_evaluation, Some(full_evaluation()));
        assert_eq!(attempt.completed_at, Some(committed_at));
        assert_eq!(session.current_score, Some(86));
    }

    #[tokio::test]
    async fn test_double_commit_rejected() {
        let store = SessionStore::new();
        let (_, attempt_id) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        store
            .commit_attempt(attempt_id, 86, full_evaluation(), Utc::now())
            .await
            .expect("first commit should succeed");
        let err = store
            .commit_attempt(attempt_id, 90, full_evaluation(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyCommitted(_)));
    }

    #[tokio::test]
    async fn test_ensure_pending_guards() {
        let store = SessionStore::new();
        let (_, attempt_id) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        assert!(store.ensure_pending(attempt_id).await.is_ok());
        assert!(matches!(
            store.ensure_pending(Uuid::new_v4()).await.unwrap_err(),
            Error::NotFound(_)
        ));

        store
            .commit_attempt(attempt_id, 86, full_evaluation(), Utc::now())
            .await
            .expect("commit should succeed");
        assert!(matches!(
            store.ensure_pending(attempt_id).await.unwrap_err(),
            Error::AlreadyCommitted(_)
        ));
    }

    #[tokio::test]
    async fn test_list_orders_by_latest_activity() {
        let store = SessionStore::new();
        let (first, first_attempt) = store
            .create_session(Some(demo_config("Oldest")))
            .await
            .expect("create should succeed");
        let (second, second_attempt) = store
            .create_session(Some(demo_config("Newest")))
            .await
            .expect("create should succeed");

        let earlier = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap();
        store
            .commit_attempt(first_attempt, 70, full_evaluation(), earlier)
            .await
            .expect("commit should succeed");
        store
            .commit_attempt(second_attempt, 90, full_evaluation(), later)
            .await
            .expect("commit should succeed");

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
    }

    #[tokio::test]
    async fn test_group_by_recency_buckets_by_calendar_day() {
        let store = SessionStore::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 14, 30, 0).unwrap();

        let (today_id, today_attempt) = store
            .create_session(Some(demo_config("Today's run")))
            .await
            .expect("create should succeed");
        let (old_id, old_attempt) = store
            .create_session(Some(demo_config("Old run")))
            .await
            .expect("create should succeed");

        store
            .commit_attempt(
                today_attempt,
                86,
                full_evaluation(),
                Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap(),
            )
            .await
            .expect("commit should succeed");
        // Eight days back, past the seven-day window
        store
            .commit_attempt(
                old_attempt,
                74,
                full_evaluation(),
                Utc.with_ymd_and_hms(2025, 6, 7, 9, 0, 0).unwrap(),
            )
            .await
            .expect("commit should succeed");

        let grouped = store.group_by_recency(now).await;
        assert_eq!(grouped.today.len(), 1);
        assert_eq!(grouped.today[0].id, today_id);
        assert!(grouped.yesterday.is_empty());
        assert!(grouped.this_week.is_empty());
        assert_eq!(grouped.older.len(), 1);
        assert_eq!(grouped.older[0].id, old_id);
    }

    #[tokio::test]
    async fn test_attempt_lookup_by_id() {
        let store = SessionStore::new();
        let (session_id, attempt_id) = store
            .create_session(Some(demo_config("Launch plan")))
            .await
            .expect("create should succeed");

        let attempt = store.attempt(attempt_id).await.expect("attempt exists");
        assert_eq!(attempt.session_id, session_id);
        assert!(store.attempt(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_seed_demo_populates_committed_sessions() {
        let store = SessionStore::new();
        store.seed_demo().await.expect("seed should succeed");

        let sessions = store.list().await;
        assert_eq!(sessions.len(), 4);
        for session in &sessions {
            let latest = session.latest_attempt().expect("attempt exists");
            assert!(latest.is_committed());
            assert!(session.current_score.is_some());
        }

        // Fixtures span the grouping buckets
        let grouped = store.group_by_recency(Utc::now()).await;
        assert_eq!(grouped.today.len(), 1);
        assert_eq!(grouped.yesterday.len(), 1);
        assert_eq!(grouped.this_week.len(), 1);
        assert_eq!(grouped.older.len(), 1);
    }

}
