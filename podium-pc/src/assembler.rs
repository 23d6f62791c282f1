//! Result assembly
//!
//! The single commit point of the attempt lifecycle. Joins the analysis
//! score and the complete self-evaluation into the attempt record in one
//! atomic store write, then releases the per-attempt buffers held by the
//! producers.

use podium_common::events::{EventBus, PracticeEvent};
use podium_common::{Error, Result};
use uuid::Uuid;

use crate::analysis::{AnalysisCoordinator, AnalysisState};
use crate::barrier;
use crate::evaluation::SelfEvaluationCollector;
use crate::models::SelfEvaluation;
use crate::store::SessionStore;

/// Commits finished attempts
///
/// Holds handles to the store and both producers; cheap to clone.
#[derive(Clone)]
pub struct ResultAssembler {
    store: SessionStore,
    coordinator: AnalysisCoordinator,
    collector: SelfEvaluationCollector,
    event_bus: EventBus,
}

impl ResultAssembler {
    pub fn new(
        store: SessionStore,
        coordinator: AnalysisCoordinator,
        collector: SelfEvaluationCollector,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            coordinator,
            collector,
            event_bus,
        }
    }

    /// Commit an attempt's results, returning the owning session id
    ///
    /// Permitted only once both producers are done; a commit before that
    /// names the side(s) still outstanding. The store write is atomic and
    /// the attempt is immutable afterwards, so a second commit fails.
    pub async fn commit(&self, attempt_id: Uuid) -> Result<Uuid> {
        self.store.ensure_pending(attempt_id).await?;

        let analysis = self.coordinator.state(attempt_id).await;
        let ratings = self.collector.ratings(attempt_id).await;
        let evaluation = SelfEvaluation::from_ratings(&ratings);

        let (score, evaluation) = match (analysis, evaluation) {
            (AnalysisState::Complete { score }, Some(evaluation)) => (score, evaluation),
            (analysis, evaluation) => {
                let gate = barrier::evaluate(&analysis, evaluation.is_some());
                return Err(Error::PrematureCommit(format!(
                    "attempt {} still awaiting {}",
                    attempt_id,
                    gate.missing().unwrap_or("both result producers"),
                )));
            }
        };

        let committed_at = podium_common::time::now();
        let session_id = self
            .store
            .commit_attempt(attempt_id, score, evaluation, committed_at)
            .await?;

        // The attempt is final; its job record and rating buffer are done
        self.coordinator.forget(&[attempt_id]).await;
        self.collector.forget(&[attempt_id]).await;

        tracing::info!(
            session_id = %session_id,
            attempt_id = %attempt_id,
            score,
            "Attempt results committed"
        );
        self.event_bus.emit_lossy(PracticeEvent::AttemptCommitted {
            session_id,
            attempt_id,
            score,
            timestamp: committed_at,
        });

        Ok(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PresentationConfig, RatingCategory};
    use std::time::Duration;

    struct Fixture {
        store: SessionStore,
        coordinator: AnalysisCoordinator,
        collector: SelfEvaluationCollector,
        assembler: ResultAssembler,
        session_id: Uuid,
        attempt_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = SessionStore::new();
        let event_bus = EventBus::new(512);
        let coordinator = AnalysisCoordinator::new(store.clone(), event_bus.clone())
            .with_tick_interval(Duration::from_millis(1));
        let collector = SelfEvaluationCollector::new(store.clone(), event_bus.clone());
        let assembler = ResultAssembler::new(
            store.clone(),
            coordinator.clone(),
            collector.clone(),
            event_bus,
        );
        let (session_id, attempt_id) = store
            .create_session(Some(PresentationConfig {
                topic: Some("Demo".to_string()),
                ..Default::default()
            }))
            .await
            .expect("create should succeed");
        Fixture {
            store,
            coordinator,
            collector,
            assembler,
            session_id,
            attempt_id,
        }
    }

    async fn run_analysis_to_completion(fx: &Fixture) {
        fx.coordinator
            .start(fx.attempt_id)
            .await
            .expect("start should succeed");
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if fx.coordinator.state(fx.attempt_id).await.is_complete() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("analysis should complete");
    }

    async fn rate_all(fx: &Fixture) {
        for category in RatingCategory::ALL {
            fx.collector
                .set_rating(fx.attempt_id, category, 4)
                .await
                .expect("rating should record");
        }
    }

    #[tokio::test]
    async fn test_commit_before_either_side_names_both() {
        let fx = fixture().await;
        let err = fx.assembler.commit(fx.attempt_id).await.unwrap_err();
        match err {
            Error::PrematureCommit(message) => {
                assert!(message.contains("analysis result and self-evaluation"));
            }
            other => panic!("expected PrematureCommit, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_commit_with_analysis_only_names_missing_ratings() {
        let fx = fixture().await;
        run_analysis_to_completion(&fx).await;

        let err = fx.assembler.commit(fx.attempt_id).await.unwrap_err();
        match err {
            Error::PrematureCommit(message) => {
                assert!(message.contains("self-evaluation"));
                assert!(!message.contains("analysis result"));
            }
            other => panic!("expected PrematureCommit, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_commit_with_ratings_only_names_missing_analysis() {
        let fx = fixture().await;
        rate_all(&fx).await;

        let err = fx.assembler.commit(fx.attempt_id).await.unwrap_err();
        match err {
            Error::PrematureCommit(message) => {
                assert!(message.contains("analysis result"));
            }
            other => panic!("expected PrematureCommit, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_commit_finalizes_attempt_and_cleans_up() {
        let fx = fixture().await;
        run_analysis_to_completion(&fx).await;
        rate_all(&fx).await;

        let session_id = fx
            .assembler
            .commit(fx.attempt_id)
            .await
            .expect("commit should succeed");
        assert_eq!(session_id, fx.session_id);

        let session = fx.store.get(session_id).await.expect("session exists");
        let attempt = &session.attempts[0];
        assert!(attempt.is_committed());
        assert_eq!(attempt.ai_score, Some(86));
        assert!(attempt.completed_at.is_some());
        assert_eq!(
            attempt.self_evaluation.map(|e| e.get(RatingCategory::Voice)),
            Some(4)
        );
        assert_eq!(session.current_score, Some(86));

        // Producer buffers released
        assert_eq!(
            fx.coordinator.state(fx.attempt_id).await,
            AnalysisState::Idle
        );
        assert!(fx.collector.ratings(fx.attempt_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_double_commit_rejected() {
        let fx = fixture().await;
        run_analysis_to_completion(&fx).await;
        rate_all(&fx).await;

        fx.assembler
            .commit(fx.attempt_id)
            .await
            .expect("first commit should succeed");
        let err = fx.assembler.commit(fx.attempt_id).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyCommitted(_)));
    }

    #[tokio::test]
    async fn test_commit_unknown_attempt_rejected() {
        let fx = fixture().await;
        let err = fx.assembler.commit(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
