use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use log::info;
use std::rc::Rc;
use std::time::Instant;

use crate::routes::REFRESH_COOKIE;

/// Request logging middleware.
///
/// Logs method, path, status and latency. For the refresh cookie only its
/// presence is logged, never the value; query strings are skipped since
/// they may carry tokens.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequestLoggerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
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
        let start_time = Instant::now();
        let method = req.method().to_string();
        let path = redact_path(req.path());
        let has_refresh_cookie = req.cookie(REFRESH_COOKIE).is_some();

        info!(
            "Request started: {} {} (refresh cookie: {})",
            method, path, has_refresh_cookie
        );

        let service = self.service.clone();

        Box::pin(async move {
            let res = service.call(req).await?;

            info!(
                "Request completed: {} {} - Status: {} ({}ms)",
                method,
                path,
                res.status().as_u16(),
                start_time.elapsed().as_millis()
            );

            Ok(res)
        })
    }
}

/// Activation links are one-time secrets and stay out of the logs
fn redact_path(path: &str) -> String {
    match path.strip_prefix("/api/activate/") {
        Some(_) => "/api/activate/{link}".to_string(),
        None => path.to_string(),
    }
}
