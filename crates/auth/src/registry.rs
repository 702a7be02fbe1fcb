//! Session and identity authority.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use gatehouse_core::{AuthError, AuthResult};

use crate::{ROLE_ADMIN, Storage, TokenSigner, User};

/// Token pair returned by a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Orchestrates storage and token issuance to implement the session
/// lifecycle: register, login, refresh, logout, blacklist and role
/// assignment.
///
/// The refresh-token table is ephemeral: entries are created on login,
/// removed on logout, never persisted, and lost on process restart.
/// Sessions across restarts are best-effort by design. The table has its
/// own lock; it is never protected incidentally by the storage layer's
/// locking.
pub struct UsersRegistry {
    storage: Arc<dyn Storage>,
    tokens: TokenSigner,
    // refresh token -> username
    refresh_tokens: Mutex<HashMap<String, String>>,
}

impl UsersRegistry {
    pub fn new(storage: Arc<dyn Storage>, tokens: TokenSigner) -> Self {
        Self {
            storage,
            tokens,
            refresh_tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Create a new identity with an empty role set and no options, then
    /// set its password.
    ///
    /// The save and the password write are two separate storage calls; a
    /// crash between them leaves a passwordless user that can never log in
    /// until the password is set again. Accepted for the embedded scope.
    pub fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        if username.is_empty() {
            return Err(AuthError::validation("username must not be empty"));
        }
        if password.is_empty() {
            return Err(AuthError::validation("password must not be empty"));
        }

        if self.storage.load(username)?.is_some() {
            return Err(AuthError::conflict("user already exists"));
        }

        self.storage.save(&User::new(username))?;
        self.storage.set_password(username, password)?;

        tracing::info!(username, "registered user");
        Ok(())
    }

    /// Authenticate credentials and open a session.
    ///
    /// On success, returns a signed access token embedding the username and
    /// the current role serialization, plus a fresh opaque refresh token
    /// bound to this username.
    pub fn login(&self, username: &str, password: &str) -> AuthResult<SessionTokens> {
        let Some(user) = self.storage.load(username)? else {
            return Err(AuthError::Unauthorized);
        };

        if user.blacklisted {
            tracing::warn!(username, "login attempt by blacklisted user");
            return Err(AuthError::Unauthorized);
        }

        if !self.storage.validate_password(username, password)? {
            return Err(AuthError::Unauthorized);
        }

        let refresh_token = Uuid::new_v4().to_string();
        self.refresh_tokens
            .lock()
            .insert(refresh_token.clone(), user.username.clone());

        // If signing fails the table entry stays behind. An orphaned entry
        // is a leak, not a correctness problem: it still maps to this user.
        let access_token = self
            .tokens
            .sign(&user.username, &user.roles.to_string())
            .map_err(|e| AuthError::internal(e.to_string()))?;

        tracing::debug!(username, "login succeeded");
        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The token must be bound to exactly this username, and the user must
    /// still exist and not be blacklisted. The refresh token itself is not
    /// rotated; it stays valid until logout or process restart.
    pub fn refresh(&self, username: &str, refresh_token: &str) -> AuthResult<String> {
        {
            let table = self.refresh_tokens.lock();
            match table.get(refresh_token) {
                Some(owner) if owner == username => {}
                _ => return Err(AuthError::Unauthorized),
            }
        }

        let Some(user) = self.storage.load(username)? else {
            return Err(AuthError::Unauthorized);
        };

        if user.blacklisted {
            tracing::warn!(username, "refresh attempt by blacklisted user");
            return Err(AuthError::Unauthorized);
        }

        // Roles are re-read here, so a refreshed token picks up role
        // changes made since the last issuance.
        self.tokens
            .sign(&user.username, &user.roles.to_string())
            .map_err(|e| AuthError::internal(e.to_string()))
    }

    /// Invalidate one refresh token. Already-issued access tokens are
    /// untouched and remain valid until natural expiry.
    pub fn logout(&self, username: &str, refresh_token: &str) -> AuthResult<()> {
        if self.storage.load(username)?.is_none() {
            return Err(AuthError::Unauthorized);
        }

        let mut table = self.refresh_tokens.lock();
        match table.get(refresh_token) {
            Some(owner) if owner == username => {
                table.remove(refresh_token);
                Ok(())
            }
            _ => Err(AuthError::Unauthorized),
        }
    }

    /// Set the revocation flag. Blocks future login and refresh; does not
    /// revoke outstanding access tokens or remove refresh-table entries
    /// (those become unusable at the next refresh, which re-checks the
    /// flag).
    pub fn blacklist(&self, username: &str) -> AuthResult<()> {
        let Some(mut user) = self.storage.load(username)? else {
            return Err(AuthError::NotFound);
        };

        user.blacklisted = true;
        self.storage.save(&user)?;
        tracing::info!(username, "blacklisted user");
        Ok(())
    }

    /// Clear the revocation flag, restoring login and refresh.
    pub fn unblacklist(&self, username: &str) -> AuthResult<()> {
        let Some(mut user) = self.storage.load(username)? else {
            return Err(AuthError::NotFound);
        };

        user.blacklisted = false;
        self.storage.save(&user)?;
        tracing::info!(username, "unblacklisted user");
        Ok(())
    }

    /// Additively grant roles. There is no removal path here.
    ///
    /// Refused outright once the user's *current* roles contain the admin
    /// marker — even for unrelated additions. That guard reads the existing
    /// set, not the incoming one; a probable oversight in the behavior this
    /// engine reproduces, kept literally until clarified.
    pub fn set_roles<I>(&self, username: &str, roles: I) -> AuthResult<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let Some(user) = self.storage.load(username)? else {
            return Err(AuthError::NotFound);
        };

        if user.roles.has(ROLE_ADMIN) {
            return Err(AuthError::conflict("admin role is protected"));
        }

        user.roles.add(roles);
        self.storage.save(&user)?;
        Ok(())
    }
}
