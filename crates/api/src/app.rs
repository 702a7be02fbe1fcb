//! Router assembly.

use std::sync::Arc;

use axum::{Router, middleware::from_fn_with_state, routing::post};

use gatehouse_auth::{TokenSigner, UsersRegistry};

use crate::middleware::{AuthLayer, require_roles};
use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<UsersRegistry>,
}

/// Build the full router.
///
/// `/register`, `/login`, `/refresh` and `/logout` are open; the admin
/// surface (`/blacklist`, `/unblacklist`, `/set-roles`) sits behind the
/// bearer middleware and is reachable with the admin role only.
pub fn build_app(registry: Arc<UsersRegistry>, tokens: Arc<TokenSigner>) -> Router {
    let state = AppState { registry };

    let admin = Router::new()
        .route("/blacklist", post(routes::blacklist))
        .route("/unblacklist", post(routes::unblacklist))
        .route("/set-roles", post(routes::set_roles))
        .route_layer(from_fn_with_state(
            AuthLayer::admin_only(tokens),
            require_roles,
        ));

    Router::new()
        .route("/register", post(routes::register))
        .route("/login", post(routes::login))
        .route("/refresh", post(routes::refresh))
        .route("/logout", post(routes::logout))
        .merge(admin)
        .with_state(state)
}
