use sqlx::FromRow;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::ExamAttempt;

const COLUMNS: &str = "\
    id, student_id, exam_id, is_custom, total_questions, correct_count, \
    wrong_count, unattempted_count, score, submitted_at, created_at";

pub(crate) struct NewAttempt<'a> {
    pub id: &'a str,
    pub student_id: &'a str,
    pub exam_id: &'a str,
    pub is_custom: bool,
    pub total_questions: i32,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub unattempted_count: i32,
    pub score: f64,
    pub submitted_at: PrimitiveDateTime,
}

/// Inserts the attempt unless one already exists for `(student_id,
/// exam_id)`. Returns `None` on conflict; the caller re-reads the stored row
/// and treats the submission as an idempotent duplicate.
pub(crate) async fn insert_if_absent(
    pool: &PgPool,
    params: NewAttempt<'_>,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "INSERT INTO exam_attempts (
            id, student_id, exam_id, is_custom, total_questions,
            correct_count, wrong_count, unattempted_count, score, submitted_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        ON CONFLICT (student_id, exam_id) DO NOTHING
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.exam_id)
    .bind(params.is_custom)
    .bind(params.total_questions)
    .bind(params.correct_count)
    .bind(params.wrong_count)
    .bind(params.unattempted_count)
    .bind(params.score)
    .bind(params.submitted_at)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_student_exam(
    pool: &PgPool,
    student_id: &str,
    exam_id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts WHERE student_id = $1 AND exam_id = $2"
    ))
    .bind(student_id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

/// An attempt joined with the student's display name, for leaderboard
/// projections.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AttemptStanding {
    pub(crate) student_id: String,
    pub(crate) full_name: String,
    pub(crate) exam_id: String,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) unattempted_count: i32,
    pub(crate) submitted_at: PrimitiveDateTime,
}

const STANDING_COLUMNS: &str = "\
    a.student_id, u.full_name, a.exam_id, a.correct_count, a.wrong_count, \
    a.unattempted_count, a.submitted_at";

pub(crate) async fn list_standings_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<AttemptStanding>, sqlx::Error> {
    sqlx::query_as::<_, AttemptStanding>(&format!(
        "SELECT {STANDING_COLUMNS} FROM exam_attempts a
         JOIN users u ON u.id = a.student_id
         WHERE a.exam_id = $1"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_standings_for_batch(
    pool: &PgPool,
    batch_id: &str,
) -> Result<Vec<AttemptStanding>, sqlx::Error> {
    sqlx::query_as::<_, AttemptStanding>(&format!(
        "SELECT {STANDING_COLUMNS} FROM exam_attempts a
         JOIN users u ON u.id = a.student_id
         JOIN exams e ON e.id = a.exam_id
         WHERE e.batch_id = $1"
    ))
    .bind(batch_id)
    .fetch_all(pool)
    .await
}
