/// Chirp Routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::store::ChirpRepository;
use crate::validators::clean_chirp_body;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation(ValidationError::InvalidFormat("chirp_id".to_string())))
}

/// POST /api/chirps
///
/// # Errors
/// - 400: body longer than 140 characters
/// - 401: no valid access token (middleware)
pub async fn create_chirp(
    identity: web::ReqData<AuthenticatedUser>,
    form: web::Json<CreateChirpRequest>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(user_id) = identity.into_inner();
    let body = clean_chirp_body(&form.body)?;

    let chirp = chirps.create_chirp(user_id, &body).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %user_id, "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps
pub async fn list_chirps(
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let all = chirps.list_chirps().await?;
    Ok(HttpResponse::Ok().json(all))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = chirps
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 403: the caller is not the author
/// - 404: no such chirp
pub async fn delete_chirp(
    identity: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(user_id) = identity.into_inner();
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = chirps
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))?;

    if chirp.user_id != user_id {
        return Err(AppError::Forbidden(
            "You can only delete your own chirps".to_string(),
        ));
    }

    chirps.delete_chirp(chirp_id).await?;

    tracing::info!(chirp_id = %chirp_id, user_id = %user_id, "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}
