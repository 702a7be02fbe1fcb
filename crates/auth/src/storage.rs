//! Persistence boundary for identity records.

use std::collections::HashMap;

use parking_lot::Mutex;

use gatehouse_core::StorageError;

use crate::User;

/// Storage contract backing the registry.
///
/// The contract is storage-engine-agnostic so alternative backends
/// (relational, key-value, in-memory) can be substituted without touching
/// the registry. Credential material is stored and queried independently of
/// the user record itself.
pub trait Storage: Send + Sync {
    /// Upsert the full record (roles, blacklist flag, options). Never
    /// touches the password side. Must succeed even when no prior record
    /// existed.
    fn save(&self, user: &User) -> Result<(), StorageError>;

    /// Load a record by username. A plain miss is `Ok(None)`, never an
    /// error.
    fn load(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Remove the record. Deleting a non-existent user is a no-op.
    fn delete(&self, username: &str) -> Result<(), StorageError>;

    /// Store verification material for an existing user. A no-op (not an
    /// error) if the user does not exist.
    fn set_password(&self, username: &str, password: &str) -> Result<(), StorageError>;

    /// Check a password. Returns `Ok(false)` (never an error) for unknown
    /// users or users with no password set.
    fn validate_password(&self, username: &str, password: &str) -> Result<bool, StorageError>;
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, User>,
    passwords: HashMap<String, String>,
}

/// Non-durable `Storage` backend.
///
/// Intended for tests and for embedding where durability is not needed.
/// Passwords are kept verbatim in process memory, so this is not a
/// production backend.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, user: &User) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        state.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    fn load(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(self.state.lock().users.get(username).cloned())
    }

    fn delete(&self, username: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        state.users.remove(username);
        state.passwords.remove(username);
        Ok(())
    }

    fn set_password(&self, username: &str, password: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        if !state.users.contains_key(username) {
            return Ok(());
        }
        state.passwords.insert(username.to_string(), password.to_string());
        Ok(())
    }

    fn validate_password(&self, username: &str, password: &str) -> Result<bool, StorageError> {
        let state = self.state.lock();
        if !state.users.contains_key(username) {
            return Ok(false);
        }
        Ok(state.passwords.get(username).is_some_and(|p| p == password))
    }
}
