/// Account Routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::hash_password;
use crate::error::{AppError, DatabaseError};
use crate::middleware::AuthenticatedUser;
use crate::store::UserRepository;
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

/// Validate the request and hash the password off the async workers
async fn prepare_credentials(form: &UserRequest) -> Result<(String, String), AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let password = form.password.clone();
    let hashed = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

    Ok((email, hashed))
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or empty password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<UserRequest>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let (email, hashed) = prepare_credentials(&form).await?;
    let user = users.create_user(&email, &hashed).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/users
///
/// Replaces the caller's email and password.
pub async fn update_user(
    identity: web::ReqData<AuthenticatedUser>,
    form: web::Json<UserRequest>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(user_id) = identity.into_inner();
    let (email, hashed) = prepare_credentials(&form).await?;

    let user = users
        .update_user(user_id, &email, &hashed)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;

    tracing::info!(user_id = %user.id, "User updated");
    Ok(HttpResponse::Ok().json(user))
}
