use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::BatchStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) full_name: String,
    pub(crate) enrolled_batches: Json<Vec<String>>,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Batch {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) is_public: bool,
    pub(crate) status: BatchStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) batch_id: Option<String>,
    pub(crate) name: String,
    pub(crate) file_id: String,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) marks_per_question: f64,
    pub(crate) negative_marks_per_wrong: f64,
    pub(crate) is_practice: bool,
    pub(crate) start_at: Option<PrimitiveDateTime>,
    pub(crate) end_at: Option<PrimitiveDateTime>,
    pub(crate) shuffle_questions: bool,
    pub(crate) shuffle_sections_only: bool,
    pub(crate) total_subjects: Option<i32>,
    pub(crate) mandatory_subjects: Json<Vec<String>>,
    pub(crate) optional_subjects: Json<Vec<String>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl Exam {
    /// Custom exams ask the student to pick their subjects before starting.
    pub(crate) fn is_custom(&self) -> bool {
        self.total_subjects.unwrap_or(0) > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamAttempt {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) exam_id: String,
    pub(crate) is_custom: bool,
    pub(crate) total_questions: i32,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) unattempted_count: i32,
    pub(crate) score: f64,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
}
