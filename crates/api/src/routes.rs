//! Request handlers.
//!
//! Each handler decodes a JSON body, calls exactly one or two registry
//! operations and re-encodes the result. Successful token-issuing routes
//! also mirror the access token into the `Authorization` response header.

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use gatehouse_auth::registry::SessionTokens;

use crate::app::AppState;
use crate::errors::{admin_error_response, error_response, json_error};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRolesRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// `POST /register` — create the account, then log it straight in.
pub async fn register(State(state): State<AppState>, Json(body): Json<Credentials>) -> Response {
    if body.username.is_empty() || body.password.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and password required",
        );
    }

    if let Err(e) = state.registry.register(&body.username, &body.password) {
        return error_response(e);
    }

    match state.registry.login(&body.username, &body.password) {
        Ok(tokens) => session_response(tokens),
        Err(e) => error_response(e),
    }
}

/// `POST /login`
pub async fn login(State(state): State<AppState>, Json(body): Json<Credentials>) -> Response {
    if body.username.is_empty() || body.password.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and password required",
        );
    }

    match state.registry.login(&body.username, &body.password) {
        Ok(tokens) => session_response(tokens),
        Err(e) => error_response(e),
    }
}

/// `POST /refresh` — new access token in the `Authorization` header, empty
/// JSON body.
pub async fn refresh(State(state): State<AppState>, Json(body): Json<RefreshRequest>) -> Response {
    if body.username.is_empty() || body.refresh_token.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and refresh token required",
        );
    }

    match state.registry.refresh(&body.username, &body.refresh_token) {
        Ok(access_token) => {
            let mut res = (StatusCode::OK, Json(json!({}))).into_response();
            set_bearer_header(&mut res, &access_token);
            res
        }
        Err(e) => error_response(e),
    }
}

/// `POST /logout` — drop the refresh token.
pub async fn logout(State(state): State<AppState>, Json(body): Json<RefreshRequest>) -> Response {
    if body.username.is_empty() || body.refresh_token.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and refresh token required",
        );
    }

    match state.registry.logout(&body.username, &body.refresh_token) {
        Ok(()) => (StatusCode::OK, Json(json!({}))).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /blacklist` (admin)
pub async fn blacklist(State(state): State<AppState>, Json(body): Json<UsernameRequest>) -> Response {
    if body.username.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "username required");
    }

    match state.registry.blacklist(&body.username) {
        Ok(()) => (StatusCode::OK, Json(json!({}))).into_response(),
        Err(e) => admin_error_response(e),
    }
}

/// `POST /unblacklist` (admin)
pub async fn unblacklist(
    State(state): State<AppState>,
    Json(body): Json<UsernameRequest>,
) -> Response {
    if body.username.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "username required");
    }

    match state.registry.unblacklist(&body.username) {
        Ok(()) => (StatusCode::OK, Json(json!({}))).into_response(),
        Err(e) => admin_error_response(e),
    }
}

/// `POST /set-roles` (admin) — additive role grant.
pub async fn set_roles(
    State(state): State<AppState>,
    Json(body): Json<SetRolesRequest>,
) -> Response {
    if body.username.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "username required");
    }

    match state.registry.set_roles(&body.username, body.roles) {
        Ok(()) => (StatusCode::OK, Json(json!({}))).into_response(),
        Err(e) => admin_error_response(e),
    }
}

fn session_response(tokens: SessionTokens) -> Response {
    let mut res = (StatusCode::OK, Json(&tokens)).into_response();
    set_bearer_header(&mut res, &tokens.access_token);
    res
}

fn set_bearer_header(res: &mut Response, access_token: &str) {
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {access_token}")) {
        res.headers_mut().insert(header::AUTHORIZATION, value);
    }
}
