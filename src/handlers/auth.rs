//! Authentication HTTP handlers
//!
//! Endpoints for wallet-based authentication.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};

use super::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    LegacyLoginResponse, LegacyNonceResponse, LoginRequest, LoginResponse, NonceRequest,
    NonceResponse, SessionResponse,
};
use crate::state::AppState;

const SUCCESS_MSG: &str = "Success";

/// POST /auth/nonce - Request a nonce for wallet authentication
pub async fn request_nonce(
    State(state): State<AppState>,
    payload: Result<Json<NonceRequest>, JsonRejection>,
) -> ApiResult<Json<NonceResponse>> {
    let Json(req) = payload?;
    let nonce = state.auth_service.request_challenge(&req.address).await?;

    Ok(Json(NonceResponse { nonce }))
}

/// POST /auth/login - Verify signed nonce and issue a session token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    let issued = state
        .auth_service
        .complete_login(&req.address, &req.nonce, &req.signature)
        .await?;

    Ok(Json(LoginResponse {
        expires_in: issued.expires_in(),
        token: issued.token,
        token_type: "Bearer".to_string(),
    }))
}

/// Failure half of the query-string endpoints: old clients read `msg` and a
/// `null` payload, never the `{error}` envelope
type LegacyResult<T> = Result<Json<T>, (StatusCode, Json<T>)>;

fn legacy_failure<T>(err: ApiError, body: impl FnOnce(String) -> T) -> (StatusCode, Json<T>) {
    err.log();
    (err.legacy_status_code(), Json(body(err.public_message())))
}

// `address` is the only required parameter, so a rejected query means it was
// missing.
fn missing_address(_: QueryRejection) -> ApiError {
    ApiError::InvalidAddress
}

/// POST /getNonce?address= - query-string form of `/auth/nonce`
pub async fn legacy_get_nonce(
    State(state): State<AppState>,
    query: Result<Query<NonceRequest>, QueryRejection>,
) -> LegacyResult<LegacyNonceResponse> {
    let failure =
        |err: ApiError| legacy_failure(err, |msg| LegacyNonceResponse { nonce: None, msg });

    let Query(req) = query.map_err(|e| failure(missing_address(e)))?;
    let nonce = state
        .auth_service
        .request_challenge(&req.address)
        .await
        .map_err(|e| failure(e.into()))?;

    Ok(Json(LegacyNonceResponse {
        nonce: Some(nonce),
        msg: SUCCESS_MSG.to_string(),
    }))
}

/// POST /login?address=&nonce=&signature= - query-string form of `/auth/login`
pub async fn legacy_login(
    State(state): State<AppState>,
    query: Result<Query<LoginRequest>, QueryRejection>,
) -> LegacyResult<LegacyLoginResponse> {
    let failure = |err: ApiError| legacy_failure(err, |msg| LegacyLoginResponse { jwt: None, msg });

    let Query(req) = query.map_err(|e| failure(missing_address(e)))?;
    let issued = state
        .auth_service
        .complete_login(&req.address, &req.nonce, &req.signature)
        .await
        .map_err(|e| failure(e.into()))?;

    Ok(Json(LegacyLoginResponse {
        jwt: Some(issued.token),
        msg: SUCCESS_MSG.to_string(),
    }))
}

/// GET /auth/me - Describe the session behind the Bearer token
pub async fn current_session(user: AuthenticatedUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        address: user.address,
        roles: user.roles,
        expires_at: user.expires_at,
    })
}
