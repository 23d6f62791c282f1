//! Self-evaluation collection
//!
//! Buffers per-attempt ratings while the attempt is pending. Four fixed
//! categories on a 1-5 scale, last write wins; the buffer only ever
//! grows, so completeness is stable once reached. The final evaluation
//! leaves the buffer at commit, never before.

use podium_common::events::{EventBus, PracticeEvent};
use podium_common::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::rating::validate_rating;
use crate::models::RatingCategory;
use crate::store::SessionStore;

/// Collects self-evaluation ratings keyed by attempt
///
/// Handle is cheap to clone; all clones share the rating buffers.
#[derive(Clone)]
pub struct SelfEvaluationCollector {
    store: SessionStore,
    event_bus: EventBus,
    ratings: Arc<RwLock<HashMap<Uuid, HashMap<RatingCategory, u8>>>>,
}

impl SelfEvaluationCollector {
    pub fn new(store: SessionStore, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            ratings: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record one category rating for a pending attempt
    ///
    /// The value must sit in the 1-5 scale. Re-rating a category simply
    /// overwrites the previous value. Runs independently of the analysis
    /// job; neither side waits for the other.
    pub async fn set_rating(
        &self,
        attempt_id: Uuid,
        category: RatingCategory,
        value: i64,
    ) -> Result<()> {
        self.store.ensure_pending(attempt_id).await?;
        let value = validate_rating(value)?;

        self.ratings
            .write()
            .await
            .entry(attempt_id)
            .or_default()
            .insert(category, value);

        tracing::debug!(attempt_id = %attempt_id, category = %category, value, "Rating recorded");
        self.event_bus.emit_lossy(PracticeEvent::RatingRecorded {
            attempt_id,
            category: category.as_str().to_string(),
            value,
            timestamp: podium_common::time::now(),
        });
        Ok(())
    }

    /// True once every category has been rated
    ///
    /// The only completeness signal there is; nothing fills in missing
    /// categories automatically.
    pub async fn is_complete(&self, attempt_id: Uuid) -> bool {
        self.ratings
            .read()
            .await
            .get(&attempt_id)
            .map(|buffer| {
                RatingCategory::ALL
                    .iter()
                    .all(|category| buffer.contains_key(category))
            })
            .unwrap_or(false)
    }

    /// Snapshot of the ratings recorded so far (empty when none)
    pub async fn ratings(&self, attempt_id: Uuid) -> HashMap<RatingCategory, u8> {
        self.ratings
            .read()
            .await
            .get(&attempt_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove and return an attempt's rating buffer (commit-time handoff)
    pub async fn take(&self, attempt_id: Uuid) -> Option<HashMap<RatingCategory, u8>> {
        self.ratings.write().await.remove(&attempt_id)
    }

    /// Drop rating buffers for attempts that no longer need them
    /// (session delete cascade)
    pub async fn forget(&self, attempt_ids: &[Uuid]) {
        let mut ratings = self.ratings.write().await;
        for attempt_id in attempt_ids {
            ratings.remove(attempt_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PresentationConfig, SelfEvaluation};
    use podium_common::Error;

    async fn fixture() -> (SessionStore, SelfEvaluationCollector, Uuid) {
        let store = SessionStore::new();
        let collector = SelfEvaluationCollector::new(store.clone(), EventBus::new(64));
        let (_, attempt_id) = store
            .create_session(Some(PresentationConfig {
                topic: Some("Demo".to_string()),
                ..Default::default()
            }))
            .await
            .expect("create should succeed");
        (store, collector, attempt_id)
    }

    #[tokio::test]
    async fn test_mid_scale_rating_accepted() {
        let (_store, collector, attempt_id) = fixture().await;
        collector
            .set_rating(attempt_id, RatingCategory::Voice, 3)
            .await
            .expect("rating 3 is valid");

        let ratings = collector.ratings(attempt_id).await;
        assert_eq!(ratings.get(&RatingCategory::Voice), Some(&3));
    }

    #[tokio::test]
    async fn test_out_of_scale_ratings_rejected() {
        let (_store, collector, attempt_id) = fixture().await;

        let low = collector
            .set_rating(attempt_id, RatingCategory::Voice, 0)
            .await
            .unwrap_err();
        assert!(matches!(low, Error::InvalidRating(0)));

        let high = collector
            .set_rating(attempt_id, RatingCategory::Voice, 6)
            .await
            .unwrap_err();
        assert!(matches!(high, Error::InvalidRating(6)));

        // Nothing was recorded
        assert!(collector.ratings(attempt_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let (_store, collector, attempt_id) = fixture().await;
        collector
            .set_rating(attempt_id, RatingCategory::Posture, 2)
            .await
            .expect("first write");
        collector
            .set_rating(attempt_id, RatingCategory::Posture, 5)
            .await
            .expect("second write");

        let ratings = collector.ratings(attempt_id).await;
        assert_eq!(ratings.get(&RatingCategory::Posture), Some(&5));
        assert_eq!(ratings.len(), 1);
    }

    #[tokio::test]
    async fn test_completeness_requires_all_four_categories() {
        let (_store, collector, attempt_id) = fixture().await;
        assert!(!collector.is_complete(attempt_id).await);

        for category in [
            RatingCategory::EyeContact,
            RatingCategory::Posture,
            RatingCategory::Voice,
        ] {
            collector
                .set_rating(attempt_id, category, 4)
                .await
                .expect("rating should record");
        }
        assert!(!collector.is_complete(attempt_id).await);

        collector
            .set_rating(attempt_id, RatingCategory::Content, 4)
            .await
            .expect("rating should record");
        assert!(collector.is_complete(attempt_id).await);
    }

    #[tokio::test]
    async fn test_unknown_attempt_rejected() {
        let (_store, collector, _attempt_id) = fixture().await;
        let err = collector
            .set_rating(Uuid::new_v4(), RatingCategory::Voice, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_committed_attempt_rejected() {
        let (store, collector, attempt_id) = fixture().await;
        store
            .commit_attempt(
                attempt_id,
                86,
                SelfEvaluation {
                    eye_contact: 3,
                    posture: 3,
                    voice: 3,
                    content: 3,
                },
                chrono::Utc::now(),
            )
            .await
            .expect("commit should succeed");

        let err = collector
            .set_rating(attempt_id, RatingCategory::Voice, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyCommitted(_)));
    }

    #[tokio::test]
    async fn test_take_empties_the_buffer() {
        let (_store, collector, attempt_id) = fixture().await;
        collector
            .set_rating(attempt_id, RatingCategory::Voice, 3)
            .await
            .expect("rating should record");

        let taken = collector.take(attempt_id).await.expect("buffer exists");
        assert_eq!(taken.get(&RatingCategory::Voice), Some(&3));
        assert!(collector.ratings(attempt_id).await.is_empty());
        assert!(collector.take(attempt_id).await.is_none());
    }

    #[tokio::test]
    async fn test_rating_emits_event() {
        let store = SessionStore::new();
        let bus = EventBus::new(16);
        let collector = SelfEvaluationCollector::new(store.clone(), bus.clone());
        let (_, attempt_id) = store
            .create_session(Some(PresentationConfig {
                topic: Some("Demo".to_string()),
                ..Default::default()
            }))
            .await
            .expect("create should succeed");
        let mut rx = bus.subscribe();

        collector
            .set_rating(attempt_id, RatingCategory::EyeContact, 5)
            .await
            .expect("rating should record");

        let event = rx.try_recv().expect("event should be emitted");
        match event {
            PracticeEvent::RatingRecorded {
                category, value, ..
            } => {
                assert_eq!(category, "eyeContact");
                assert_eq!(value, 5);
            }
            other => panic!("unexpected event: {}", other.event_type()),
        }
    }
}
