use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{Batch, Exam, User};
use crate::repositories;

pub(crate) struct CurrentStudent(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("Student not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentStudent(user))
    }
}

/// An exam is open to a student when it has no batch, when its batch is
/// public, or when the student is enrolled in the batch.
pub(crate) async fn require_exam_access(
    state: &AppState,
    student: &User,
    exam: &Exam,
) -> Result<(), ApiError> {
    let Some(batch_id) = &exam.batch_id else {
        return Ok(());
    };

    if student.enrolled_batches.0.iter().any(|enrolled| enrolled == batch_id) {
        return Ok(());
    }

    let is_public = repositories::batches::is_public(state.db(), batch_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch batch"))?;

    match is_public {
        Some(true) => Ok(()),
        _ => Err(ApiError::Forbidden("Enrollment required for this exam")),
    }
}

/// Batch-scoped endpoints (leaderboards) follow the same rule. Returns the
/// batch row so handlers don't fetch it twice.
pub(crate) async fn require_batch_access(
    state: &AppState,
    student: &User,
    batch_id: &str,
) -> Result<Batch, ApiError> {
    let batch = repositories::batches::find_by_id(state.db(), batch_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch batch"))?
        .ok_or_else(|| ApiError::NotFound("Batch not found".to_string()))?;

    if batch.is_public
        || student.enrolled_batches.0.iter().any(|enrolled| enrolled == &batch.id)
    {
        return Ok(batch);
    }

    Err(ApiError::Forbidden("Enrollment required for this batch"))
}
