/// Admin Routes
///
/// Hit counter page and the dev-only reset.

use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::metrics::HitCounter;
use crate::store::UserRepository;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<HitCounter>) -> HttpResponse {
    let page = format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>
"#,
        hits.get()
    );

    HttpResponse::Ok().content_type(ContentType::html()).body(page)
}

/// POST /admin/reset
///
/// # Errors
/// - 403: platform is not `dev`
pub async fn reset(
    application: web::Data<ApplicationSettings>,
    hits: web::Data<HitCounter>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    if !application.is_dev() {
        return Err(AppError::Forbidden(
            "Reset is only allowed on the dev platform".to_string(),
        ));
    }

    hits.reset();
    users.reset().await?;

    tracing::warn!("Hit counter and database reset");
    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hits count and database have been reset\n"))
}
