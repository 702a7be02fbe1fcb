//! `gatehouse-auth` — credential and session lifecycle engine.
//!
//! This crate is intentionally decoupled from HTTP and from any concrete
//! storage engine: persistence goes through the [`Storage`] trait, and the
//! HTTP surface lives in `gatehouse-api`.

pub mod registry;
pub mod roles;
pub mod storage;
pub mod token;
pub mod user;

pub use registry::UsersRegistry;
pub use roles::{ROLE_ADMIN, RoleSet};
pub use storage::{MemoryStorage, Storage};
pub use token::{AccessClaims, TokenError, TokenSigner};
pub use user::User;
