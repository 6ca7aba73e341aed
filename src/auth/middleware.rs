use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{JwtKeys, TokenError};

/// Result of decoding the bearer token of a request, stored in the request extensions.
///
/// Absent when the request carried no bearer token at all.
#[derive(Debug, Clone)]
pub struct AccessTokenOutcome(pub Result<String, TokenError>);

/// Decodes `Authorization: Bearer <token>` on every request. The scheme is case-insensitive.
///
/// The middleware never rejects a request by itself: public routes such as the feed
/// accept anonymous callers. Handlers decide through the `CurrentUser` and `MaybeUser`
/// extractors, which read the outcome recorded here.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
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
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
            .map(str::to_owned);

        if let Some(token) = bearer {
            match req.app_data::<web::Data<JwtKeys>>() {
                Some(keys) => {
                    let outcome = keys.decode_access_token(&token);
                    req.extensions_mut().insert(AccessTokenOutcome(outcome));
                }
                None => log::error!("JwtKeys are not registered as app data"),
            }
        }

        Box::pin(self.service.call(req))
    }
}
