/// Authentication Facade
///
/// Single entry point for the request layer. Composes the credential issuer
/// and the refresh handler and adds bearer-header parsing and access-token
/// verification. Holds no business logic of its own.

use std::sync::Arc;

use crate::account::{Account, ProfileAttributes};
use crate::auth::claims::Claims;
use crate::auth::codec::{is_expired, token_fingerprint, SigningKey, TokenCodec};
use crate::auth::issuer::{AuthenticationResponse, CredentialIssuer};
use crate::auth::password::SecretVerifier;
use crate::auth::refresh::RefreshHandler;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::AccountStore;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct AuthenticationFacade {
    issuer: Arc<CredentialIssuer>,
    refresher: Arc<RefreshHandler>,
    store: Arc<dyn AccountStore>,
    codec: TokenCodec,
    access_key: SigningKey,
    access_ttl: i64,
}

impl AuthenticationFacade {
    pub fn new(
        store: Arc<dyn AccountStore>,
        verifier: Arc<dyn SecretVerifier>,
        codec: TokenCodec,
        jwt: &JwtSettings,
    ) -> Self {
        let issuer = CredentialIssuer::new(store.clone(), verifier, codec.clone(), jwt);
        let refresher = RefreshHandler::new(store.clone(), codec.clone(), jwt);

        Self {
            issuer: Arc::new(issuer),
            refresher: Arc::new(refresher),
            store,
            codec,
            access_key: jwt.access_key(),
            access_ttl: jwt.access_token_expiry,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_token_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub async fn register(
        &self,
        email: &str,
        secret: &str,
        profile: ProfileAttributes,
    ) -> Result<AuthenticationResponse, AppError> {
        self.issuer.register(email, secret, profile).await
    }

    pub async fn authenticate(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<AuthenticationResponse, AppError> {
        self.issuer.authenticate(email, secret).await
    }

    /// Refresh using the raw `Authorization` header value
    ///
    /// # Errors
    /// `MissingToken` / `MalformedHeader` for an absent or non-bearer header,
    /// otherwise whatever the refresh handler reports.
    pub async fn refresh(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticationResponse, AppError> {
        let token = bearer_token(authorization)?;
        self.refresher.refresh(token).await
    }

    /// Verify an access token and return its claims
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.codec.decode(token, &self.access_key).map_err(|e| {
            tracing::warn!(token = %token_fingerprint(token), error = %e, "Access token rejected");
            AuthError::InvalidToken
        })?;

        if is_expired(&claims, self.codec.now()) {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    /// Load the account behind already verified claims
    pub async fn current_account(&self, claims: &Claims) -> Result<Account, AppError> {
        let account = self.store.find_by_email(&claims.sub).await?;
        if account.email != claims.sub {
            return Err(AuthError::SubjectMismatch.into());
        }
        Ok(account)
    }
}

/// Extract the token from a `Bearer <token>` header value
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization.ok_or(AuthError::MissingToken)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::MalformedHeader)?;

    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}
