/// Credential Issuer
///
/// Turns a verified identity into a fresh access/refresh token pair:
/// registration creates the account first, authentication checks the
/// presented secret against the stored hash.

use std::sync::Arc;

use crate::account::{Account, ProfileAttributes};
use crate::auth::codec::{token_fingerprint, SigningKey, TokenCodec};
use crate::auth::password::{validate_password_strength, SecretVerifier};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::AccountStore;
use crate::validators::{is_valid_email, is_valid_name};

/// One access token and one refresh token bound to the same subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    pub subject: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct CredentialIssuer {
    store: Arc<dyn AccountStore>,
    verifier: Arc<dyn SecretVerifier>,
    codec: TokenCodec,
    access_key: SigningKey,
    refresh_key: SigningKey,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl CredentialIssuer {
    pub fn new(
        store: Arc<dyn AccountStore>,
        verifier: Arc<dyn SecretVerifier>,
        codec: TokenCodec,
        jwt: &JwtSettings,
    ) -> Self {
        Self {
            store,
            verifier,
            codec,
            access_key: jwt.access_key(),
            refresh_key: jwt.refresh_key(),
            access_ttl: jwt.access_token_expiry,
            refresh_ttl: jwt.refresh_token_expiry,
        }
    }

    /// Create an account and issue its first token pair
    ///
    /// # Errors
    /// - `Validation` for a bad email, name or weak password
    /// - `DuplicateAccount` if the store already holds the email
    /// - `UpstreamUnavailable` if hashing or the store fails
    pub async fn register(
        &self,
        email: &str,
        secret: &str,
        profile: ProfileAttributes,
    ) -> Result<AuthenticationResponse, AppError> {
        let email = is_valid_email(email)?;
        let profile = ProfileAttributes {
            first_name: is_valid_name("first_name", &profile.first_name)?,
            last_name: is_valid_name("last_name", &profile.last_name)?,
        };
        validate_password_strength(secret)?;

        let password_hash = self.hash_secret(secret).await?;
        self.store
            .save(Account::new(email.clone(), profile, password_hash))
            .await?;

        tracing::info!(subject = %email, "Account registered");

        self.mint_pair(&email)
    }

    /// Verify a secret and issue a token pair
    ///
    /// The key is only trimmed; whether it names an account is the store's call.
    ///
    /// # Errors
    /// - `AccountNotFound` if no account has this email
    /// - `InvalidCredentials` if the secret does not match
    pub async fn authenticate(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<AuthenticationResponse, AppError> {
        let account = self.store.find_by_email(email.trim()).await?;

        if !self.secret_matches(secret, &account.password_hash).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        tracing::info!(subject = %account.email, "Account authenticated");

        self.mint_pair(&account.email)
    }

    fn mint_pair(&self, subject: &str) -> Result<AuthenticationResponse, AppError> {
        let access_token = self.codec.encode(subject, &self.access_key, self.access_ttl)?;
        let refresh_token = self.codec.encode(subject, &self.refresh_key, self.refresh_ttl)?;

        tracing::debug!(
            subject = %subject,
            access_token = %token_fingerprint(&access_token),
            refresh_token = %token_fingerprint(&refresh_token),
            "Token pair minted"
        );

        Ok(AuthenticationResponse {
            subject: subject.to_string(),
            access_token,
            refresh_token,
        })
    }

    // bcrypt is CPU-bound, keep it off the async workers
    async fn hash_secret(&self, secret: &str) -> Result<String, AppError> {
        let verifier = Arc::clone(&self.verifier);
        let secret = secret.to_string();

        let hash = tokio::task::spawn_blocking(move || verifier.hash(&secret))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??;
        Ok(hash)
    }

    async fn secret_matches(&self, secret: &str, hash: &str) -> Result<bool, AppError> {
        let verifier = Arc::clone(&self.verifier);
        let secret = secret.to_string();
        let hash = hash.to_string();

        let matches = tokio::task::spawn_blocking(move || verifier.matches(&secret, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))??;
        Ok(matches)
    }
}
