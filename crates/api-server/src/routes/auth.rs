//! Auth endpoints
//!
//! Registration, login, and the authenticated-user probe.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{bearer_token, AuthError, UserSummary},
    state::AppState,
};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

type RouteError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    password_confirmation: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    name: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    user: UserSummary,
    token: String,
    expires_at: String,
}

fn route_error(status: StatusCode, message: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

fn unauthorized(message: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, message)
}

fn unprocessable(message: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNPROCESSABLE_ENTITY, message)
}

fn internal_error(message: impl std::fmt::Display) -> RouteError {
    route_error(StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
}

fn auth_error(err: AuthError) -> RouteError {
    match err {
        AuthError::Validation { .. } => unprocessable(err.to_string()),
        AuthError::Unauthorized(_) => unauthorized(err.to_string()),
        AuthError::Conflict(_) => route_error(StatusCode::CONFLICT, err.to_string()),
        AuthError::Storage(_) => internal_error(err),
    }
}

fn format_expiry(exp: usize) -> String {
    DateTime::<Utc>::from_timestamp(exp as i64, 0)
        .map(|value| value.to_rfc3339())
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), RouteError> {
    if req.password_confirmation != req.password {
        return Err(unprocessable(
            "invalid password_confirmation: Password confirmation does not match",
        ));
    }

    let session = state
        .auth_store()
        .register(&req.name, &req.email, &req.password)
        .await
        .map_err(auth_error)?;
    let token = state
        .auth_store()
        .encode_claims(&session.claims)
        .map_err(auth_error)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: session.user,
            token,
            expires_at: format_expiry(session.claims.exp),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, RouteError> {
    let session = state
        .auth_store()
        .login(&req.name, &req.password)
        .await
        .map_err(auth_error)?;
    let token = state
        .auth_store()
        .encode_claims(&session.claims)
        .map_err(auth_error)?;

    Ok(Json(AuthResponse {
        user: session.user,
        token,
        expires_at: format_expiry(session.claims.exp),
    }))
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserSummary>, RouteError> {
    let token = bearer_token(&headers).ok_or_else(|| unauthorized("Missing bearer token"))?;
    let user = state
        .auth_store()
        .authorize_bearer(token)
        .await
        .map_err(auth_error)?;
    Ok(Json(user))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}
