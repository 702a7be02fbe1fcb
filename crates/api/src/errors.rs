//! Domain error → HTTP status mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gatehouse_core::AuthError;

/// Map a registry error to a response.
///
/// Internal error text stays in the logs; responses carry only the short
/// domain message.
pub fn error_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuthError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        AuthError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, "conflict", msg),
        AuthError::Storage(e) => {
            tracing::error!(error = %e, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "internal storage error",
            )
        }
        AuthError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

/// Mapping for the admin surface (`/blacklist`, `/unblacklist`,
/// `/set-roles`).
///
/// Admin operations report both a missing target and the protected-admin
/// refusal as 404: the caller asked to mutate a user record that cannot be
/// mutated. Everything else falls through to the common mapping.
pub fn admin_error_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        AuthError::Conflict(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        other => error_response(other),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
