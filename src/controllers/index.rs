use std::sync::Arc;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::AppState;
use crate::services::user_finder::FinderSnapshot;


pub async fn get_index(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.finder.snapshot();

    match super::render_page(&state.registry, "GitHub User Finder", "index", &snapshot) {
        Ok(html) => html.into_response(),
        Err(err) => {
            log::error!("Failed to render index: {}", err);
            super::get_error_page(&state.registry, StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<FinderSnapshot> {
    Json(state.finder.snapshot())
}
