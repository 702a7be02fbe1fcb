//! `gatehouse-core` — shared foundation for the identity/session engine.
//!
//! This crate contains the error taxonomy only; domain types live in
//! `gatehouse-auth` and persistence in `gatehouse-store`.

pub mod error;

pub use error::{AuthError, AuthResult, StorageError};
