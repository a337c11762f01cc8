use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use serde_json::json;

use super::AppState;
use super::responses::success;

/// `GET /`: liveness check. Never cached.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(CACHE_CONTROL, "no-cache")],
        success(json!({
            "version": env!("CARGO_PKG_VERSION"),
            "githubUrl": env!("CARGO_PKG_REPOSITORY"),
            "backend": state.service.storage().backend(),
        })),
    )
}
