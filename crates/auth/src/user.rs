//! User identity record.

use std::collections::HashMap;

use crate::RoleSet;

/// A registered identity.
///
/// # Invariants
/// - `username` is non-empty, unique across live records, and immutable
///   once created (it is the storage key).
/// - The password is never part of this record; credential material lives
///   on the storage side and survives mutations of the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identity key.
    pub username: String,
    /// Roles granted to the user, consulted by authorization checks.
    pub roles: RoleSet,
    /// Revocation flag: blocks login and refresh, independent of any
    /// already-issued access token.
    pub blacklisted: bool,
    /// Opaque string-to-string option bag; the engine never interprets it.
    pub options: HashMap<String, String>,
}

impl User {
    /// A fresh, non-blacklisted user with no roles and no options.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: RoleSet::new(),
            blacklisted: false,
            options: HashMap::new(),
        }
    }
}
