/// JWT Claims structure
///
/// Represents the payload of a signed token: the account it is bound to,
/// its validity window and what it may be used for.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a token may be used for
///
/// Access tokens authorize individual requests; refresh tokens only mint new
/// access tokens. A token is never accepted for the other purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenPurpose::Access => write!(f, "access"),
            TokenPurpose::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims carried by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token purpose tag
    pub purpose: TokenPurpose,
    /// Issuer
    pub iss: String,
    /// Token ID, unique per minted token
    pub jti: String,
}

impl Claims {
    /// Create claims valid from `issued_at` for `ttl_seconds`
    pub fn new(
        subject: impl Into<String>,
        purpose: TokenPurpose,
        issued_at: i64,
        ttl_seconds: i64,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            sub: subject.into(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_seconds),
            purpose,
            iss: issuer.into(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// True once `now` has reached the expiry
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }
}
