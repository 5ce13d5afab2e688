mod handlers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:session_id", get(handlers::get_session))
        .route("/:session_id/answers", post(handlers::select_answer))
        .route("/:session_id/review", post(handlers::toggle_review))
        .route("/:session_id/submit", post(handlers::submit_session))
}
