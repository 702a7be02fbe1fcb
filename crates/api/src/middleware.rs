//! Bearer-token verification middleware.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use gatehouse_auth::{RoleSet, TokenSigner};

/// Per-route authorization requirements.
///
/// Verification uses only the shared secret and the claims embedded in the
/// token; storage is never consulted, so a blacklisted user keeps passing
/// this guard until their access token expires.
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenSigner>,
    required: Arc<Vec<String>>,
}

impl AuthLayer {
    pub fn new<I>(tokens: Arc<TokenSigner>, required: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            tokens,
            required: Arc::new(required.into_iter().map(Into::into).collect()),
        }
    }

    /// No specific role passes this guard; only the admin marker does
    /// (`has_any` of an empty list is false, and admin bypasses the check).
    pub fn admin_only(tokens: Arc<TokenSigner>) -> Self {
        Self::new(tokens, Vec::<String>::new())
    }
}

/// The verified identity of the caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub username: String,
    pub roles: RoleSet,
}

/// Guard chain: extract the bearer token, verify signature and expiry,
/// then enforce role requirements. The admin marker grants access to every
/// route regardless of its declared roles.
pub async fn require_roles(
    State(layer): State<AuthLayer>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let claims = layer
        .tokens
        .verify(token)
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    let roles = RoleSet::new();
    roles.load_from(&claims.roles);

    if !roles.is_admin() && !roles.has_any(layer.required.iter()) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    req.extensions_mut().insert(AuthedUser {
        username: claims.username,
        roles,
    });

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
