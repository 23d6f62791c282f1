//! Analysis report API handlers
//!
//! POST /api/analysis and GET /api/analysis. Stand-ins for the scoring
//! backend that does not exist yet: the report body is fixed demo copy,
//! with only the self-vs-AI comparison chart derived from the request.

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Reference AI scores for the comparison chart, in chart order
/// (eye contact, posture, voice, content)
const AI_COMPARISON_SCORES: [u32; 4] = [85, 92, 78, 88];

/// Self-evaluation ratings as sent by the results page
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfEvaluationPayload {
    pub eye_contact: Option<u32>,
    pub posture: Option<u32>,
    pub voice: Option<u32>,
    pub content: Option<u32>,
}

/// POST /api/analysis request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub self_evaluation: Option<SelfEvaluationPayload>,
}

/// POST /api/analysis response
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub message: &'static str,
    pub data: AnalysisReport,
}

/// Full report payload for the results page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub overall_score: u32,
    pub duration: &'static str,
    pub strengths: Vec<&'static str>,
    pub improvements: Vec<&'static str>,
    pub detailed_feedback: Vec<FeedbackEntry>,
    pub comparison_data: Vec<ComparisonEntry>,
}

/// Per-category feedback card
#[derive(Debug, Serialize)]
pub struct FeedbackEntry {
    pub category: &'static str,
    pub score: u32,
    pub feedback: &'static str,
    pub suggestions: Vec<&'static str>,
}

/// One bar pair in the self-vs-AI comparison chart
#[derive(Debug, Serialize)]
pub struct ComparisonEntry {
    pub category: &'static str,
    #[serde(rename = "self")]
    pub self_score: u32,
    pub ai: u32,
}

/// Analysis history entry (GET /api/analysis)
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: u32,
    pub title: &'static str,
    pub score: u32,
    pub date: &'static str,
}

/// Scale a 1-5 self rating onto the 0-100 chart axis
///
/// Missing categories chart as zero rather than being dropped, so the
/// comparison always shows all four bars.
pub fn scaled_self_score(rating: Option<u32>) -> u32 {
    rating.unwrap_or(0) * 20
}

fn demo_report(ratings: SelfEvaluationPayload) -> AnalysisReport {
    AnalysisReport {
        overall_score: 88,
        duration: "05:20",
        strengths: vec![
            "Very consistent speaking pace",
            "Natural eye contact with the audience",
        ],
        improvements: vec![
            "Hand gestures are somewhat excessive",
            "Sentence endings trail off",
        ],
        detailed_feedback: vec![
            FeedbackEntry {
                category: "Eye contact",
                score: 85,
                feedback: "Good eye contact with the audience overall, though you \
                           glanced at the slides often through the middle of the talk.",
                suggestions: vec![
                    "Know the slide content well enough to face the audience with confidence",
                    "Spread your gaze evenly across the room",
                ],
            },
            FeedbackEntry {
                category: "Voice analysis",
                score: 78,
                feedback: "Volume was appropriate but the pace runs fast. Gaps between \
                           words shrink noticeably when you tense up.",
                suggestions: vec![
                    "Pause for a second or two after key sentences",
                    "Use diaphragmatic breathing to steady the pace",
                ],
            },
            FeedbackEntry {
                category: "Posture & gestures",
                score: 92,
                feedback: "Stable posture and well-measured hand movement. Gestures \
                           landed exactly where you wanted emphasis.",
                suggestions: vec![
                    "Keep the natural style you have now",
                    "Use more of the center stage",
                ],
            },
            FeedbackEntry {
                category: "Presentation content",
                score: 88,
                feedback: "Logical flow is excellent and the core message is clear. \
                           The introduction and conclusion connect smoothly.",
                suggestions: vec![
                    "Citing concrete examples or data would make it even more persuasive",
                ],
            },
        ],
        comparison_data: vec![
            ComparisonEntry {
                category: "Eye contact",
                self_score: scaled_self_score(ratings.eye_contact),
                ai: AI_COMPARISON_SCORES[0],
            },
            ComparisonEntry {
                category: "Posture",
                self_score: scaled_self_score(ratings.posture),
                ai: AI_COMPARISON_SCORES[1],
            },
            ComparisonEntry {
                category: "Voice",
                self_score: scaled_self_score(ratings.voice),
                ai: AI_COMPARISON_SCORES[2],
            },
            ComparisonEntry {
                category: "Content",
                self_score: scaled_self_score(ratings.content),
                ai: AI_COMPARISON_SCORES[3],
            },
        ],
    }
}

/// POST /api/analysis
///
/// Produce the demo analysis report, folding the caller's self-evaluation
/// into the comparison chart. Returns 201 Created.
pub async fn create_report(
    Json(request): Json<AnalysisRequest>,
) -> (StatusCode, Json<AnalysisResponse>) {
    let ratings = request.self_evaluation.unwrap_or_default();
    tracing::info!(
        eye_contact = ?ratings.eye_contact,
        posture = ?ratings.posture,
        voice = ?ratings.voice,
        content = ?ratings.content,
        "Analysis report requested"
    );

    (
        StatusCode::CREATED,
        Json(AnalysisResponse {
            message: "Analysis complete",
            data: demo_report(ratings),
        }),
    )
}

/// GET /api/analysis
///
/// Canned analysis history list.
pub async fn analysis_history() -> Json<Vec<HistoryEntry>> {
    Json(vec![
        HistoryEntry {
            id: 1,
            title: "AI chatbot service development",
            score: 86,
            date: "2024-01-28",
        },
        HistoryEntry {
            id: 2,
            title: "Machine learning project overview",
            score: 82,
            date: "2024-01-27",
        },
    ])
}

/// Build analysis report routes
pub fn report_routes() -> Router<AppState> {
    Router::new().route("/api/analysis", post(create_report).get(analysis_history))
}
