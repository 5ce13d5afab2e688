use serde::Serialize;

use crate::core::time::format_primitive;
use crate::engine::projection::ProjectedAttempt;
use crate::schemas::session::AttemptResponse;

#[derive(Debug, Serialize)]
pub(crate) struct LeaderboardEntry {
    pub(crate) rank: usize,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) score: f64,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) unattempted_count: i32,
    pub(crate) submitted_at: String,
}

impl LeaderboardEntry {
    pub(crate) fn from_projected(rank: usize, entry: &ProjectedAttempt) -> Self {
        Self {
            rank,
            student_id: entry.student_id.clone(),
            student_name: entry.student_name.clone(),
            score: entry.score,
            correct_count: entry.correct_count,
            wrong_count: entry.wrong_count,
            unattempted_count: entry.unattempted_count,
            submitted_at: format_primitive(entry.submitted_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LeaderboardResponse {
    pub(crate) exam_id: String,
    pub(crate) entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchLeaderboardEntry {
    pub(crate) rank: usize,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) total_score: f64,
    pub(crate) exams_counted: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchLeaderboardResponse {
    pub(crate) batch_id: String,
    pub(crate) batch_name: String,
    pub(crate) entries: Vec<BatchLeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewQuestion {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) options: Vec<String>,
    pub(crate) correct_index: i32,
    pub(crate) selected_index: Option<usize>,
    pub(crate) outcome: &'static str,
    pub(crate) explanation: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewResponse {
    pub(crate) attempt: AttemptResponse,
    /// Per-question detail from the ledger snapshot; empty when the snapshot
    /// has expired.
    pub(crate) questions: Vec<ReviewQuestion>,
    pub(crate) sections: Vec<String>,
}
