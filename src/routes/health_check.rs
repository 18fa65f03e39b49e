use actix_web::HttpResponse;

/// GET /health_check
pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check");
    HttpResponse::Ok().content_type("text/plain").body("OK")
}
