use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{PgRefreshTokenStore, TokenService};
use crate::configuration::{ApplicationSettings, Settings};
use crate::directory::PgUserDirectory;
use crate::email_client::EmailClient;
use crate::error::{AppError, ConfigError};
use crate::logger::RequestLogger;
use crate::middleware::JwtMiddleware;
use crate::routes::{activate, health_check, list_users, login, logout, refresh, register};
use crate::session::SessionEngine;

/// Wire the production engine: Postgres stores and the HTTP email client
pub fn build_engine(configuration: &Settings, pool: PgPool) -> Result<SessionEngine, AppError> {
    let sender = configuration
        .email_client
        .sender()
        .map_err(|e| ConfigError::InvalidValue(format!("email_client.sender_email: {}", e)))?;

    let email_client = EmailClient::new(
        configuration.email_client.base_url.clone(),
        sender,
        configuration.email_client.timeout(),
    )?;

    let tokens = TokenService::new(
        configuration.jwt.clone(),
        Arc::new(PgRefreshTokenStore::new(pool.clone())),
    );

    Ok(SessionEngine::new(
        Arc::new(PgUserDirectory::new(pool)),
        tokens,
        Arc::new(email_client),
        configuration.application.clone(),
        configuration.password.hash_cost,
    ))
}

pub fn run(
    listener: TcpListener,
    engine: SessionEngine,
    application: ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let tokens = engine.tokens().clone();
    let engine = web::Data::new(engine);
    let application = web::Data::new(application);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(engine.clone())
            .app_data(application.clone())

            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/registration", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/logout", web::post().to(logout))
                    .route("/activate/{link}", web::get().to(activate))
                    .route("/refresh", web::get().to(refresh))
                    // Protected routes (require a valid access token)
                    .service(
                        web::resource("/users")
                            .wrap(JwtMiddleware::new(tokens.clone()))
                            .route(web::get().to(list_users)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
