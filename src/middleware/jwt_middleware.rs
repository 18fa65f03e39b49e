/// JWT Authentication Middleware
///
/// Validates the access token from the Authorization header and injects
/// its claims into request extensions for use by route handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::TokenService;

/// JWT middleware for protecting routes
///
/// Only checks signature and expiry; access tokens are never looked up
/// in storage.
pub struct JwtMiddleware {
    tokens: TokenService,
}

impl JwtMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let Some(token) = bearer else {
            tracing::warn!("Missing or invalid Authorization header");
            return reject("UNAUTHENTICATED", "Missing or invalid authorization header");
        };

        match self.tokens.verify_access_token(&token) {
            Some(claims) => {
                tracing::debug!(user_id = %claims.sub, "Access token validated");
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            None => {
                tracing::warn!("Access token rejected");
                reject("TOKEN_INVALID", "Invalid or expired token")
            }
        }
    }
}

fn reject<R: 'static>(
    code: &'static str,
    message: &'static str,
) -> LocalBoxFuture<'static, Result<R, Error>> {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "message": message,
        "code": code,
        "status": 401,
    }));

    Box::pin(async move {
        Err(actix_web::error::InternalError::from_response("Unauthorized", response).into())
    })
}
