//! `gatehouse-api` — HTTP surface over the identity/session engine.
//!
//! Thin request/response handlers plus the bearer-token middleware. All
//! domain decisions live in `gatehouse-auth`; this crate only decodes
//! bodies, calls the registry and maps errors to status codes.

pub mod app;
pub mod errors;
pub mod middleware;
pub mod routes;

pub use app::{AppState, build_app};
pub use middleware::{AuthLayer, AuthedUser};
