use thiserror::Error;
use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time;
use crate::db::models::ExamAttempt;
use crate::engine::session::ExamSession;
use crate::repositories;
use crate::services::snapshots::{self, LedgerSnapshot};

#[derive(Debug)]
pub(crate) enum SubmissionOutcome {
    /// This submission created the attempt row.
    Accepted(ExamAttempt),
    /// An attempt already existed; nothing was written. Idempotent success.
    Duplicate(ExamAttempt),
}

impl SubmissionOutcome {
    pub(crate) fn attempt(&self) -> &ExamAttempt {
        match self {
            SubmissionOutcome::Accepted(attempt) => attempt,
            SubmissionOutcome::Duplicate(attempt) => attempt,
        }
    }

    pub(crate) fn is_duplicate(&self) -> bool {
        matches!(self, SubmissionOutcome::Duplicate(_))
    }
}

#[derive(Debug, Error)]
pub(crate) enum SubmitError {
    #[error("attempt row missing after submission settled")]
    Missing,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Finalizes an attempt: snapshot the ledger to Redis (best effort), then
/// persist through `INSERT ... ON CONFLICT DO NOTHING`. The caller holds the
/// session mutex, so the phase guard here only races submissions from other
/// devices, which the unique constraint settles. A database failure releases
/// the claim so the attempt stays retryable.
pub(crate) async fn finalize(
    state: &AppState,
    session: &mut ExamSession,
) -> Result<SubmissionOutcome, SubmitError> {
    let Some(score) = session.begin_submit() else {
        // Already submitted locally; the stored row is authoritative.
        return stored_attempt(state, session).await.map(SubmissionOutcome::Duplicate);
    };

    let snapshot = LedgerSnapshot {
        answers: session.ledger().answers().clone(),
        sections: session.sections.clone(),
    };
    let ttl_seconds = state.settings().exam().snapshot_ttl_days * 24 * 60 * 60;
    snapshots::write_snapshot(
        state.redis(),
        ttl_seconds,
        &session.student_id,
        &session.exam_id,
        session.is_custom,
        &snapshot,
    )
    .await;

    let now = time::primitive_now_utc();
    let inserted = repositories::attempts::insert_if_absent(
        state.db(),
        repositories::attempts::NewAttempt {
            id: &Uuid::new_v4().to_string(),
            student_id: &session.student_id,
            exam_id: &session.exam_id,
            is_custom: session.is_custom,
            total_questions: score.total as i32,
            correct_count: score.correct as i32,
            wrong_count: score.wrong as i32,
            unattempted_count: score.unattempted as i32,
            score: score.score,
            submitted_at: now,
        },
    )
    .await;

    match inserted {
        Ok(Some(attempt)) => {
            session.complete_submit();
            metrics::counter!("exam_submissions_total").increment(1);
            Ok(SubmissionOutcome::Accepted(attempt))
        }
        Ok(None) => {
            session.complete_submit();
            let attempt = stored_attempt(state, session).await?;
            Ok(SubmissionOutcome::Duplicate(attempt))
        }
        Err(err) => {
            session.abort_submit();
            Err(SubmitError::Database(err))
        }
    }
}

async fn stored_attempt(
    state: &AppState,
    session: &ExamSession,
) -> Result<ExamAttempt, SubmitError> {
    repositories::attempts::find_by_student_exam(
        state.db(),
        &session.student_id,
        &session.exam_id,
    )
    .await?
    .ok_or(SubmitError::Missing)
}
