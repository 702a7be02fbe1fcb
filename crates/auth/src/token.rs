//! Access-token signing and verification (HS256).
//!
//! Verification uses only the shared secret and the embedded claims; it
//! never consults storage. Revocation via blacklist therefore does not
//! invalidate already-issued access tokens — it only blocks refresh. The
//! enforced `exp` claim bounds that trust window.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default access-token lifetime.
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Claims embedded in an access token.
///
/// `roles` is the comma-joined serialization of the user's role set at
/// issuance time: a point-in-time snapshot, not a live view. Role changes
/// and blacklisting take effect at the next issuance (refresh or re-login)
/// or at natural expiry, whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub username: String,
    pub roles: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    /// Bad signature, wrong algorithm family, or malformed token. Collapsed
    /// into one variant so callers cannot leak which check failed.
    #[error("invalid token")]
    Invalid,
}

/// Symmetric signer/verifier for access tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, DEFAULT_ACCESS_TTL)
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Sign an access token for `username` carrying the given role
    /// serialization.
    pub fn sign(&self, username: &str, roles: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            username: username.to_string(),
            roles: roles.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Sign)
    }

    /// Verify a presented token and return its claims.
    ///
    /// Rejects any token whose algorithm header is not HS256, any bad
    /// signature, and any expired token.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid),
            },
        }
    }
}
