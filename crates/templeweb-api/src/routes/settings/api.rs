//! Settings API endpoints - JSON API

use crate::AppState;
use axum::http::header;
use axum::response::IntoResponse;

pub async fn api_settings(state: axum::extract::State<AppState>) -> impl IntoResponse {
    let body = serde_json::to_string(&state.config).unwrap_or_default();
    ([(header::CONTENT_TYPE, "application/json")], body)
}
