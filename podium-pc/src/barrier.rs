//! Completion barrier
//!
//! Pure AND-join over the two independent result producers: the analysis
//! job and the self-evaluation. No task and no polling; callers evaluate
//! it synchronously from whatever state the producers are in, so either
//! side may finish first and the outcome is order-independent.

use serde::Serialize;

use crate::analysis::AnalysisState;

/// Joint completion state of the two producers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarrierState {
    /// Neither producer has finished
    BothPending,
    /// Analysis scored, self-evaluation still incomplete
    AnalysisOnlyDone,
    /// All four ratings recorded, analysis still unscored
    SelfEvalOnlyDone,
    /// Both finished; commit is permitted
    BothDone,
}

impl BarrierState {
    pub fn is_both_done(&self) -> bool {
        matches!(self, BarrierState::BothDone)
    }

    /// Human-readable description of the outstanding side(s), None once
    /// both are done; used to name the blocker in premature-commit errors
    pub fn missing(&self) -> Option<&'static str> {
        match self {
            BarrierState::BothPending => Some("analysis result and self-evaluation"),
            BarrierState::AnalysisOnlyDone => Some("self-evaluation"),
            BarrierState::SelfEvalOnlyDone => Some("analysis result"),
            BarrierState::BothDone => None,
        }
    }
}

/// Evaluate the barrier for one attempt
///
/// Analysis counts as done only in Complete; a running, idle, failed or
/// cancelled job keeps the gate closed.
pub fn evaluate(analysis: &AnalysisState, ratings_complete: bool) -> BarrierState {
    match (analysis.is_complete(), ratings_complete) {
        (false, false) => BarrierState::BothPending,
        (true, false) => BarrierState::AnalysisOnlyDone,
        (false, true) => BarrierState::SelfEvalOnlyDone,
        (true, true) => BarrierState::BothDone,
    }
}
