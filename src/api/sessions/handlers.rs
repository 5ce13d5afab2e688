use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::core::state::AppState;
use crate::db::models::User;
use crate::schemas::session::{
    AnswerRequest, AnswerResponse, AttemptResponse, ReviewRequest, ReviewToggleResponse,
    SessionStateResponse, SubmitResponse,
};
use crate::services::attempts::{self, SubmitError};
use crate::services::registry::SessionHandle;

pub(in crate::api::sessions) async fn get_session(
    CurrentStudent(student): CurrentStudent,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SessionStateResponse>, ApiError> {
    let handle = fetch_session(&state, &student, &session_id).await?;
    let session = handle.lock().await;

    Ok(Json(SessionStateResponse {
        session_id: session.id.clone(),
        exam_id: session.exam_id.clone(),
        phase: session.phase(),
        answers: session.ledger().answers().clone(),
        review_flags: session.ledger().review_flags().clone(),
        remaining_seconds: session.remaining_seconds(),
    }))
}

pub(in crate::api::sessions) async fn select_answer(
    CurrentStudent(student): CurrentStudent,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let handle = fetch_session(&state, &student, &session_id).await?;
    let mut session = handle.lock().await;

    let recorded = session
        .select_answer(&payload.question_id, payload.option_index)
        .map_err(ApiError::from_engine)?;

    Ok(Json(AnswerResponse {
        selected_index: session.ledger().answer(&payload.question_id),
        question_id: payload.question_id,
        recorded,
    }))
}

pub(in crate::api::sessions) async fn toggle_review(
    CurrentStudent(student): CurrentStudent,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ReviewToggleResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let handle = fetch_session(&state, &student, &session_id).await?;
    let mut session = handle.lock().await;

    let marked =
        session.toggle_review(&payload.question_id).map_err(ApiError::from_engine)?;

    Ok(Json(ReviewToggleResponse { question_id: payload.question_id, marked }))
}

pub(in crate::api::sessions) async fn submit_session(
    CurrentStudent(student): CurrentStudent,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let handle = fetch_session(&state, &student, &session_id).await?;
    let mut session = handle.lock().await;

    let outcome = attempts::finalize(&state, &mut session).await.map_err(|err| match err {
        SubmitError::Database(inner) => ApiError::internal(inner, "Failed to persist attempt"),
        SubmitError::Missing => {
            ApiError::internal("row not found", "Attempt row missing after submission settled")
        }
    })?;

    let response = SubmitResponse {
        attempt: AttemptResponse::from(outcome.attempt()),
        duplicate: outcome.is_duplicate(),
    };

    drop(session);
    state.sessions().remove(&session_id).await;

    Ok(Json(response))
}

async fn fetch_session(
    state: &AppState,
    student: &User,
    session_id: &str,
) -> Result<SessionHandle, ApiError> {
    let handle = state
        .sessions()
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    {
        let session = handle.lock().await;
        if session.student_id != student.id {
            return Err(ApiError::Forbidden("Session belongs to another student"));
        }
    }

    Ok(handle)
}
