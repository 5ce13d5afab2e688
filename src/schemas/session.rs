use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::ExamAttempt;
use crate::engine::question::Question;
use crate::engine::session::SessionPhase;

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct StartSessionRequest {
    /// Custom-exam subject selection.
    #[serde(default)]
    #[validate(length(max = 16, message = "too many sections"))]
    pub(crate) sections: Option<Vec<String>>,
    /// Custom-exam duration override, in minutes.
    #[serde(default)]
    #[serde(alias = "durationMinutes")]
    #[validate(range(min = 1, max = 600, message = "duration_minutes out of range"))]
    pub(crate) duration_minutes: Option<u32>,
}

/// A question as served to the student mid-attempt: everything except the
/// answer key.
#[derive(Debug, Serialize)]
pub(crate) struct SessionQuestion {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) options: Vec<String>,
    pub(crate) section: Option<String>,
}

impl From<&Question> for SessionQuestion {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            text: question.text.clone(),
            options: question.options.clone(),
            section: question.section.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StartSessionResponse {
    pub(crate) session_id: String,
    pub(crate) exam_id: String,
    pub(crate) questions: Vec<SessionQuestion>,
    pub(crate) sections: Vec<String>,
    pub(crate) remaining_seconds: Option<u64>,
    /// True when an already-running attempt was resumed instead of started.
    pub(crate) resumed: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionStateResponse {
    pub(crate) session_id: String,
    pub(crate) exam_id: String,
    pub(crate) phase: SessionPhase,
    pub(crate) answers: BTreeMap<String, usize>,
    pub(crate) review_flags: BTreeSet<String>,
    pub(crate) remaining_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerRequest {
    #[serde(alias = "questionId")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
    #[serde(alias = "optionIndex")]
    pub(crate) option_index: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) question_id: String,
    /// False when the question was already answered and the ledger kept the
    /// original choice.
    pub(crate) recorded: bool,
    pub(crate) selected_index: Option<usize>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ReviewRequest {
    #[serde(alias = "questionId")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewToggleResponse {
    pub(crate) question_id: String,
    pub(crate) marked: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) total_questions: i32,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) unattempted_count: i32,
    pub(crate) score: f64,
    pub(crate) submitted_at: String,
}

impl From<&ExamAttempt> for AttemptResponse {
    fn from(attempt: &ExamAttempt) -> Self {
        Self {
            exam_id: attempt.exam_id.clone(),
            student_id: attempt.student_id.clone(),
            total_questions: attempt.total_questions,
            correct_count: attempt.correct_count,
            wrong_count: attempt.wrong_count,
            unattempted_count: attempt.unattempted_count,
            score: attempt.score,
            submitted_at: format_primitive(attempt.submitted_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) attempt: AttemptResponse,
    pub(crate) duplicate: bool,
}
