/// Authentication Routes
///
/// Thin HTTP adapters over [`SessionEngine`]. Input shape is validated here,
/// the refresh token travels in an http-only cookie.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::session::{AuthSession, SessionEngine};
use crate::validators::{is_valid_email, is_valid_password};

pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/registration
///
/// # Errors
/// - 400: invalid email, password outside 5..=32 characters
/// - 409: email already registered
pub async fn register(
    form: web::Json<CredentialsRequest>,
    engine: web::Data<SessionEngine>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let password = is_valid_password(&form.password)?;

    let session = engine.register(&email, &password).await?;

    Ok(with_session(HttpResponse::Created(), &engine, session))
}

/// POST /api/login
///
/// # Errors
/// - 400: invalid email format
/// - 401: wrong password
/// - 404: no account for this email
pub async fn login(
    form: web::Json<CredentialsRequest>,
    engine: web::Data<SessionEngine>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let session = engine.login(&email, &form.password).await?;

    Ok(with_session(HttpResponse::Ok(), &engine, session))
}

/// POST /api/logout
///
/// Always succeeds; the body is the removed record or `null`.
pub async fn logout(
    req: HttpRequest,
    engine: web::Data<SessionEngine>,
) -> Result<HttpResponse, AppError> {
    let removed = match req.cookie(REFRESH_COOKIE) {
        Some(cookie) => engine.logout(cookie.value()).await?,
        None => None,
    };

    Ok(HttpResponse::Ok()
        .cookie(expired_refresh_cookie())
        .json(removed))
}

/// GET /api/activate/{link}
///
/// Redirects to the client application once the account is activated.
///
/// # Errors
/// - 400: unknown or already used link
pub async fn activate(
    link: web::Path<String>,
    engine: web::Data<SessionEngine>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    engine.activate(&link).await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, application.client_url.clone()))
        .finish())
}

/// GET /api/refresh
///
/// # Errors
/// - 401: missing, invalid, expired or superseded refresh token
pub async fn refresh(
    req: HttpRequest,
    engine: web::Data<SessionEngine>,
) -> Result<HttpResponse, AppError> {
    let cookie = req.cookie(REFRESH_COOKIE);
    let session = engine.refresh(cookie.as_ref().map(|c| c.value())).await?;

    Ok(with_session(HttpResponse::Ok(), &engine, session))
}

/// GET /api/users
///
/// **Requires valid JWT access token** (enforced by `JwtMiddleware`).
pub async fn list_users(engine: web::Data<SessionEngine>) -> Result<HttpResponse, AppError> {
    let users = engine.list_accounts().await?;
    Ok(HttpResponse::Ok().json(users))
}

fn with_session(
    mut builder: actix_web::HttpResponseBuilder,
    engine: &SessionEngine,
    session: AuthSession,
) -> HttpResponse {
    let cookie = Cookie::build(REFRESH_COOKIE, session.refresh_token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(engine.tokens().refresh_token_expiry()))
        .finish();

    builder.cookie(cookie).json(session)
}

fn expired_refresh_cookie() -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .finish()
}
