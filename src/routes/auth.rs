/// Authentication Routes
///
/// Registration, authentication, token refresh, and current account lookup.

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::account::ProfileAttributes;
use crate::auth::{AuthenticationFacade, AuthenticationResponse, Claims};
use crate::error::{AppError, AuthError};

/// Account registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Authentication request
#[derive(Deserialize)]
pub struct AuthenticationRequest {
    pub email: String,
    pub password: String,
}

/// Token pair returned by register, authenticate and refresh
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthResponse {
    fn new(response: AuthenticationResponse, expires_in: i64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Account information response
#[derive(Serialize)]
pub struct AccountResponse {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: String,
}

/// POST /api/v1/auth/register
///
/// # Errors
/// - 400: Validation errors (invalid email/password/name)
/// - 409: Email already registered
/// - 503: Account store unavailable
pub async fn register(
    form: web::Json<RegisterRequest>,
    auth: web::Data<AuthenticationFacade>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let profile = ProfileAttributes {
        first_name: form.first_name,
        last_name: form.last_name,
    };
    let response = auth.register(&form.email, &form.password, profile).await?;

    tracing::info!(subject = %response.subject, "Account registered successfully");

    Ok(HttpResponse::Created().json(AuthResponse::new(response, auth.access_token_ttl())))
}

/// POST /api/v1/auth/authenticate
///
/// Unknown email and wrong password produce the same 401 response.
pub async fn authenticate(
    form: web::Json<AuthenticationRequest>,
    auth: web::Data<AuthenticationFacade>,
) -> Result<HttpResponse, AppError> {
    let response = auth.authenticate(&form.email, &form.password).await?;

    tracing::info!(subject = %response.subject, "Account authenticated successfully");

    Ok(HttpResponse::Ok().json(AuthResponse::new(response, auth.access_token_ttl())))
}

/// POST /api/v1/auth/refresh
///
/// Expects `Authorization: Bearer <refresh_token>`. Returns a new access token
/// together with the same refresh token.
///
/// # Errors
/// - 401: Missing, invalid or expired refresh token
/// - 400: Authorization header present but not a bearer token
pub async fn refresh(
    req: HttpRequest,
    auth: web::Data<AuthenticationFacade>,
) -> Result<HttpResponse, AppError> {
    let authorization = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };

    let response = auth.refresh(authorization).await?;

    tracing::info!(subject = %response.subject, "Token refreshed successfully");

    Ok(HttpResponse::Ok().json(AuthResponse::new(response, auth.access_token_ttl())))
}

/// GET /api/me
///
/// Requires `Authorization: Bearer <access_token>`; claims are injected by
/// the access-token middleware.
pub async fn current_account(
    claims: web::ReqData<Claims>,
    auth: web::Data<AuthenticationFacade>,
) -> Result<HttpResponse, AppError> {
    let account = auth.current_account(&claims).await?;

    Ok(HttpResponse::Ok().json(AccountResponse {
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        role: account.role.to_string(),
        created_at: account.created_at.to_rfc3339(),
    }))
}
