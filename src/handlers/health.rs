//! Service-level endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Any method on `/` is refused with a greeting
pub async fn root() -> (StatusCode, &'static str) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        "Welcome to the wallet auth server.",
    )
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub version: &'static str,
}

/// GET /health - Report store connectivity
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state
        .auth_service
        .check_store()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "healthy",
        store: "connected",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
