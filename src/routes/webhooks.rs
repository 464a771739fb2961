use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError, ValidationError};
use crate::store::UserRepository;

const UPGRADE_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: String,
}

/// POST /api/polka/webhooks
///
/// Marks a user as Chirpy Red on `user.upgraded`; other events are
/// acknowledged and ignored.
pub async fn polka_webhook(
    form: web::Json<WebhookRequest>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    if form.event != UPGRADE_EVENT {
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = Uuid::parse_str(&form.data.user_id)
        .map_err(|_| ValidationError::InvalidFormat("user_id".to_string()))?;

    if !users.upgrade_user(user_id).await? {
        return Err(DatabaseError::NotFound("user".to_string()).into());
    }

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");
    Ok(HttpResponse::NoContent().finish())
}
