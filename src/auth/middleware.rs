use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::AuthenticatedUserId;
use crate::error::AppError;
use crate::services::AuthService;

/// Paths under the protected scope that are reachable without a token.
const PUBLIC_PATHS: [&str; 2] = ["/api/auth/login", "/api/auth/register"];

/// Resolves the bearer token of every request to a user id.
///
/// On success the id is stored in the request extensions as
/// [`AuthenticatedUserId`]; otherwise the request is answered with a 401
/// response and never reaches the handler.
/// Requires `web::Data<AuthService>` to be registered on the app.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let identity = if PUBLIC_PATHS.contains(&req.path()) {
            None
        } else {
            Some(identify(&req))
        };

        match identity {
            Some(Err(err)) => {
                log::debug!("Rejected request to {}: {}", req.path(), err);
                let res = req.into_response(err.error_response()).map_into_right_body();
                Box::pin(ready(Ok(res)))
            }
            identity => {
                if let Some(Ok(user_id)) = identity {
                    req.extensions_mut().insert(AuthenticatedUserId(user_id));
                }
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
        }
    }
}

fn identify(req: &ServiceRequest) -> Result<i32, AppError> {
    let auth = req
        .app_data::<web::Data<AuthService>>()
        .ok_or_else(|| AppError::InternalServerError("Auth service not configured".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    auth.identify(token)
}
