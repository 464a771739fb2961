/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation. Refresh and
/// revoke take the refresh token as a Bearer credential.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{authorization_header, extract_bearer_token, SessionIssuer};
use crate::error::{AppError, AuthError};
use crate::store::{User, UserRepository};

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user record followed by both tokens, as one flat object
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: unknown email or wrong password (same response for both)
/// - 500: hashing, signing or storage failure
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionIssuer>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let subject_id = sessions
        .authenticate(form.email.trim(), &form.password)
        .await?;

    // No tokens for an account that vanished after the password check
    let user = users
        .get_user(subject_id)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let session = sessions.open_session(user.id).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user,
        token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: sessions.access_token_expiry(),
    }))
}

/// POST /api/refresh
///
/// # Errors
/// - 401: missing, unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionIssuer>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = extract_bearer_token(authorization_header(&req))?;
    let token = sessions.refresh(refresh_token).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Always 204 for a well-formed header, whether or not the token exists.
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionIssuer>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = extract_bearer_token(authorization_header(&req))?;
    sessions.revoke(refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}
