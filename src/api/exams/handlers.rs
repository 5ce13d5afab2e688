use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_exam_access, CurrentStudent};
use crate::core::state::AppState;
use crate::core::time;
use crate::db::models::Exam;
use crate::engine::projection::{self, ProjectedAttempt};
use crate::engine::sections::{self, SubjectRules};
use crate::engine::session::{self, ExamSession, SessionSpec};
use crate::engine::shuffle::ShuffleMode;
use crate::repositories;
use crate::schemas::exam::{ExamResponse, SectionsResponse};
use crate::schemas::leaderboard::{
    LeaderboardEntry, LeaderboardResponse, ReviewQuestion, ReviewResponse,
};
use crate::schemas::session::{
    AttemptResponse, SessionQuestion, StartSessionRequest, StartSessionResponse,
};
use crate::services::snapshots;

pub(in crate::api::exams) async fn list_exams(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let exams = repositories::exams::list_visible(state.db(), &student.enrolled_batches.0)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    Ok(Json(exams.iter().map(ExamResponse::from).collect()))
}

pub(in crate::api::exams) async fn get_exam(
    CurrentStudent(student): CurrentStudent,
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;
    require_exam_access(&state, &student, &exam).await?;

    Ok(Json(ExamResponse::from(&exam)))
}

pub(in crate::api::exams) async fn list_sections(
    CurrentStudent(student): CurrentStudent,
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SectionsResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;
    require_exam_access(&state, &student, &exam).await?;

    let questions = state
        .question_bank()
        .fetch_questions(&exam.file_id)
        .await
        .map_err(ApiError::from_question_bank)?;

    Ok(Json(SectionsResponse { sections: sections::distinct_sections(&questions) }))
}

pub(in crate::api::exams) async fn start_session(
    CurrentStudent(student): CurrentStudent,
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
    payload: Option<Json<StartSessionRequest>>,
) -> Result<(StatusCode, Json<StartSessionResponse>), ApiError> {
    let payload = payload.map(|Json(inner)| inner).unwrap_or_default();
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = fetch_exam(&state, &exam_id).await?;
    require_exam_access(&state, &student, &exam).await?;
    session::ensure_available(exam.start_at, exam.end_at, exam.is_practice, time::primitive_now_utc())
        .map_err(ApiError::from_engine)?;

    // A second start from the same student resumes the running attempt.
    if let Some(handle) = state.sessions().find_for_attempt(&student.id, &exam.id).await {
        let session = handle.lock().await;
        return Ok((StatusCode::OK, Json(start_response(&session, true))));
    }

    let attempted =
        repositories::attempts::find_by_student_exam(state.db(), &student.id, &exam.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check prior attempts"))?;
    if attempted.is_some() {
        return Err(ApiError::Conflict("Exam already attempted".to_string()));
    }

    if state.sessions().len().await >= state.settings().exam().max_active_sessions as usize {
        return Err(ApiError::TooManyRequests("Too many active sessions, try again later"));
    }

    let chosen_sections = resolve_sections(&exam, payload.sections)?;
    let duration_seconds = resolve_duration(&exam, payload.duration_minutes);

    let questions = state
        .question_bank()
        .fetch_questions(&exam.file_id)
        .await
        .map_err(ApiError::from_question_bank)?;

    let shuffle = if exam.shuffle_sections_only {
        ShuffleMode::SectionsOnly
    } else if exam.shuffle_questions {
        ShuffleMode::Full
    } else {
        ShuffleMode::None
    };

    let spec = SessionSpec {
        session_id: Uuid::new_v4().to_string(),
        student_id: student.id.clone(),
        exam_id: exam.id.clone(),
        is_custom: exam.is_custom(),
        questions,
        sections: chosen_sections,
        duration_seconds,
        shuffle,
        marks_per_question: exam.marks_per_question,
        negative_marks_per_wrong: exam.negative_marks_per_wrong,
    };

    let session = ExamSession::start(spec, &mut rand::thread_rng())
        .map_err(ApiError::from_engine)?;

    tracing::info!(
        session_id = %session.id,
        exam_id = %exam.id,
        student_id = %student.id,
        questions = session.questions().len(),
        "Exam session started"
    );
    metrics::counter!("exam_sessions_started_total").increment(1);

    let handle = state.sessions().insert(session).await;
    let session = handle.lock().await;
    Ok((StatusCode::CREATED, Json(start_response(&session, false))))
}

pub(in crate::api::exams) async fn review_attempt(
    CurrentStudent(student): CurrentStudent,
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;
    require_exam_access(&state, &student, &exam).await?;

    let attempt =
        repositories::attempts::find_by_student_exam(state.db(), &student.id, &exam.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?;
    let Some(attempt) = attempt else {
        return Err(ApiError::NotFound("No attempt for this exam".to_string()));
    };

    let snapshot =
        snapshots::read_snapshot(state.redis(), &student.id, &exam.id, attempt.is_custom).await;

    let mut questions = Vec::new();
    let mut chosen_sections = Vec::new();
    if let Some(snapshot) = snapshot {
        chosen_sections = snapshot.sections.clone();
        // Losing the question set degrades review to score-only.
        match state.question_bank().fetch_questions(&exam.file_id).await {
            Ok(full_set) => {
                let working_set =
                    sections::filter_by_sections(&full_set, &snapshot.sections);
                for question in &working_set {
                    let selected = snapshot.answers.get(&question.id).copied();
                    let outcome = match selected {
                        None => "unattempted",
                        Some(index)
                            if question.correct_index >= 0
                                && index == question.correct_index as usize =>
                        {
                            "correct"
                        }
                        Some(_) => "wrong",
                    };
                    questions.push(ReviewQuestion {
                        id: question.id.clone(),
                        text: question.text.clone(),
                        options: question.options.clone(),
                        correct_index: question.correct_index,
                        selected_index: selected,
                        outcome,
                        explanation: question.explanation.clone(),
                    });
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, exam_id = %exam.id, "Review falling back to score-only");
            }
        }
    }

    Ok(Json(ReviewResponse {
        attempt: AttemptResponse::from(&attempt),
        questions,
        sections: chosen_sections,
    }))
}

pub(in crate::api::exams) async fn exam_leaderboard(
    CurrentStudent(student): CurrentStudent,
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;
    require_exam_access(&state, &student, &exam).await?;

    let standings = repositories::attempts::list_standings_for_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch leaderboard"))?;

    let mut projected: Vec<ProjectedAttempt> = standings
        .into_iter()
        .map(|row| ProjectedAttempt {
            score: projection::project_score(
                row.correct_count,
                row.wrong_count,
                exam.marks_per_question,
                exam.negative_marks_per_wrong,
            ),
            student_id: row.student_id,
            student_name: row.full_name,
            correct_count: row.correct_count,
            wrong_count: row.wrong_count,
            unattempted_count: row.unattempted_count,
            submitted_at: row.submitted_at,
        })
        .collect();
    projection::sort_standings(&mut projected);

    let entries = projected
        .iter()
        .enumerate()
        .map(|(index, entry)| LeaderboardEntry::from_projected(index + 1, entry))
        .collect();

    Ok(Json(LeaderboardResponse { exam_id: exam.id, entries }))
}

async fn fetch_exam(state: &AppState, exam_id: &str) -> Result<Exam, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;

    exam.ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

fn resolve_sections(
    exam: &Exam,
    requested: Option<Vec<String>>,
) -> Result<Vec<String>, ApiError> {
    if !exam.is_custom() {
        return Ok(Vec::new());
    }

    let chosen = requested
        .ok_or_else(|| ApiError::BadRequest("This exam requires a subject selection".to_string()))?;
    let rules = SubjectRules {
        total_subjects: exam.total_subjects.unwrap_or(0).max(0) as usize,
        mandatory: exam.mandatory_subjects.0.clone(),
        optional: exam.optional_subjects.0.clone(),
    };

    sections::validate_selection(&rules, &chosen).map_err(ApiError::from_engine)
}

fn resolve_duration(exam: &Exam, requested_minutes: Option<u32>) -> Option<u64> {
    if exam.is_custom() {
        if let Some(minutes) = requested_minutes {
            return Some(u64::from(minutes) * 60);
        }
    }

    exam.duration_minutes.filter(|minutes| *minutes > 0).map(|minutes| minutes as u64 * 60)
}

fn start_response(session: &ExamSession, resumed: bool) -> StartSessionResponse {
    StartSessionResponse {
        session_id: session.id.clone(),
        exam_id: session.exam_id.clone(),
        questions: session.questions().iter().map(SessionQuestion::from).collect(),
        sections: session.sections.clone(),
        remaining_seconds: session.remaining_seconds(),
        resumed,
    }
}
