/// Refresh Handler
///
/// Exchanges a valid refresh token for a new access token. The refresh token
/// itself is handed back unchanged and stays usable until it expires.
///
/// Checks run in order and the first failure wins:
/// 1. signature and purpose (refresh key)
/// 2. expiry
/// 3. account lookup
/// 4. the account found is the one the token names

use std::sync::Arc;

use crate::auth::codec::{is_expired, token_fingerprint, SigningKey, TokenCodec};
use crate::auth::issuer::AuthenticationResponse;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::AccountStore;

pub struct RefreshHandler {
    store: Arc<dyn AccountStore>,
    codec: TokenCodec,
    access_key: SigningKey,
    refresh_key: SigningKey,
    access_ttl: i64,
}

impl RefreshHandler {
    pub fn new(store: Arc<dyn AccountStore>, codec: TokenCodec, jwt: &JwtSettings) -> Self {
        Self {
            store,
            codec,
            access_key: jwt.access_key(),
            refresh_key: jwt.refresh_key(),
            access_ttl: jwt.access_token_expiry,
        }
    }

    /// Mint a new access token from a refresh token
    ///
    /// # Errors
    /// - `InvalidToken`: bad signature, malformed, or not a refresh token
    /// - `ExpiredToken`: the refresh token is past its expiry
    /// - `AccountNotFound`: the subject no longer resolves to an account
    /// - `SubjectMismatch`: the store returned a different account
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthenticationResponse, AppError> {
        let fingerprint = token_fingerprint(refresh_token);

        let claims = self
            .codec
            .decode(refresh_token, &self.refresh_key)
            .map_err(|e| {
                tracing::warn!(token = %fingerprint, error = %e, "Refresh token rejected");
                AuthError::InvalidToken
            })?;

        if is_expired(&claims, self.codec.now()) {
            tracing::info!(token = %fingerprint, subject = %claims.sub, "Refresh token expired");
            return Err(AuthError::ExpiredToken.into());
        }

        let account = self.store.find_by_email(&claims.sub).await?;

        if account.email != claims.sub {
            tracing::error!(
                token = %fingerprint,
                subject = %claims.sub,
                account = %account.email,
                "Account store returned a record for a different key"
            );
            return Err(AuthError::SubjectMismatch.into());
        }

        let access_token = self
            .codec
            .encode(&account.email, &self.access_key, self.access_ttl)?;

        tracing::info!(subject = %account.email, token = %fingerprint, "Access token refreshed");

        Ok(AuthenticationResponse {
            subject: account.email,
            access_token,
            refresh_token: refresh_token.to_string(),
        })
    }
}
