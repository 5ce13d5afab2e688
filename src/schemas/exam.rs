use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::Exam;

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) batch_id: Option<String>,
    pub(crate) name: String,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) marks_per_question: f64,
    pub(crate) negative_marks_per_wrong: f64,
    pub(crate) is_practice: bool,
    pub(crate) is_custom: bool,
    pub(crate) start_at: Option<String>,
    pub(crate) end_at: Option<String>,
    pub(crate) total_subjects: Option<i32>,
    pub(crate) mandatory_subjects: Vec<String>,
    pub(crate) optional_subjects: Vec<String>,
    pub(crate) created_at: String,
}

impl From<&Exam> for ExamResponse {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.clone(),
            batch_id: exam.batch_id.clone(),
            name: exam.name.clone(),
            duration_minutes: exam.duration_minutes,
            marks_per_question: exam.marks_per_question,
            negative_marks_per_wrong: exam.negative_marks_per_wrong,
            is_practice: exam.is_practice,
            is_custom: exam.is_custom(),
            start_at: exam.start_at.map(format_primitive),
            end_at: exam.end_at.map(format_primitive),
            total_subjects: exam.total_subjects,
            mandatory_subjects: exam.mandatory_subjects.0.clone(),
            optional_subjects: exam.optional_subjects.0.clone(),
            created_at: format_primitive(exam.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SectionsResponse {
    pub(crate) sections: Vec<String>,
}
