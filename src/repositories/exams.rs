use sqlx::PgPool;

use crate::db::models::Exam;

const COLUMNS: &str = "\
    id, batch_id, name, file_id, duration_minutes, marks_per_question, \
    negative_marks_per_wrong, is_practice, start_at, end_at, \
    shuffle_questions, shuffle_sections_only, total_subjects, \
    mandatory_subjects, optional_subjects, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Exams the student may see: no batch at all, a public batch, or one of
/// their enrollments. Archived batches hide their exams.
pub(crate) async fn list_visible(
    pool: &PgPool,
    enrolled_batches: &[String],
) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT e.{} FROM exams e
         LEFT JOIN batches b ON b.id = e.batch_id
         WHERE e.batch_id IS NULL
            OR (b.status = 'active' AND (b.is_public OR b.id = ANY($1)))
         ORDER BY e.created_at DESC",
        COLUMNS.replace(", ", ", e.")
    ))
    .bind(enrolled_batches)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_batch(pool: &PgPool, batch_id: &str) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {COLUMNS} FROM exams WHERE batch_id = $1 ORDER BY created_at DESC"
    ))
    .bind(batch_id)
    .fetch_all(pool)
    .await
}
