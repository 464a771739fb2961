use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{guard, middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionIssuer;
use crate::configuration::Settings;
use crate::metrics::HitCounter;
use crate::middleware::{CountHits, RequireIdentity};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login,
    metrics, polka_webhook, refresh, reset, revoke, update_user,
};
use crate::store::{
    ChirpRepository, CredentialRepository, RefreshTokenRepository, Repository, UserRepository,
};

/// Build the server on an already bound listener.
///
/// `store` backs both the auth core and the resource handlers; the request
/// counter and session issuer are created here and shared by all workers.
pub fn run<S: Repository>(
    listener: TcpListener,
    store: Arc<S>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let credentials: Arc<dyn CredentialRepository> = store.clone();
    let refresh_tokens: Arc<dyn RefreshTokenRepository> = store.clone();
    let users: Arc<dyn UserRepository> = store.clone();
    let chirps: Arc<dyn ChirpRepository> = store;

    let sessions = SessionIssuer::new(credentials, refresh_tokens, settings.jwt.clone());
    let hits = Arc::new(HitCounter::new());

    // Shared state
    let sessions_data = web::Data::new(sessions.clone());
    let users_data: web::Data<dyn UserRepository> = web::Data::from(users);
    let chirps_data: web::Data<dyn ChirpRepository> = web::Data::from(chirps);
    let hits_data = web::Data::from(hits.clone());
    let application_data = web::Data::new(settings.application.clone());
    let file_root = settings.application.file_root.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(sessions_data.clone())
            .app_data(users_data.clone())
            .app_data(chirps_data.clone())
            .app_data(hits_data.clone())
            .app_data(application_data.clone())
            .service(
                web::scope("/api")
                    // Public routes
                    .route("/healthz", web::get().to(health_check))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/polka/webhooks", web::post().to(polka_webhook))
                    .service(
                        web::resource("/users")
                            .guard(guard::Post())
                            .route(web::post().to(create_user)),
                    )
                    .service(
                        web::resource("/chirps")
                            .guard(guard::Get())
                            .route(web::get().to(list_chirps)),
                    )
                    .service(
                        web::resource("/chirps/{chirp_id}")
                            .guard(guard::Get())
                            .route(web::get().to(get_chirp)),
                    )
                    // Protected routes (require an access token)
                    .service(
                        web::resource("/users")
                            .guard(guard::Put())
                            .route(web::put().to(update_user))
                            .wrap(RequireIdentity::new(sessions.clone())),
                    )
                    .service(
                        web::resource("/chirps")
                            .guard(guard::Post())
                            .route(web::post().to(create_chirp))
                            .wrap(RequireIdentity::new(sessions.clone())),
                    )
                    .service(
                        web::resource("/chirps/{chirp_id}")
                            .guard(guard::Delete())
                            .route(web::delete().to(delete_chirp))
                            .wrap(RequireIdentity::new(sessions.clone())),
                    ),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            // Static files; every request here counts as a hit
            .service(
                web::scope("/app")
                    .wrap(CountHits::new(hits.clone()))
                    .service(fs::Files::new("/", &file_root).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
