mod handlers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_exams))
        .route("/:exam_id", get(handlers::get_exam))
        .route("/:exam_id/sections", get(handlers::list_sections))
        .route("/:exam_id/sessions", post(handlers::start_session))
        .route("/:exam_id/review", get(handlers::review_attempt))
        .route("/:exam_id/leaderboard", get(handlers::exam_leaderboard))
}
