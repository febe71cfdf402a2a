/// Access Token Middleware
///
/// Validates the access token from the Authorization header and injects its
/// claims into request extensions, so handlers receive the caller's identity
/// explicitly via `web::ReqData<Claims>`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{bearer_token, AuthenticationFacade};
use crate::error::{AppError, AuthError};

/// Middleware for routes that require a valid access token
pub struct JwtMiddleware {
    auth: AuthenticationFacade,
}

impl JwtMiddleware {
    pub fn new(auth: AuthenticationFacade) -> Self {
        Self { auth }
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
            auth: self.auth.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    auth: AuthenticationFacade,
}

impl<S> JwtMiddlewareService<S> {
    fn authorize(&self, req: &ServiceRequest) -> Result<(), AuthError> {
        let authorization = match req.headers().get(header::AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
            None => None,
        };
        let token = bearer_token(authorization)?;
        let claims = self.auth.verify_access(token)?;

        tracing::debug!(subject = %claims.sub, "Access token validated");
        req.extensions_mut().insert(claims);
        Ok(())
    }
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
        match self.authorize(&req) {
            Ok(()) => {
                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            // Logged once, when the error is rendered
            Err(e) => Box::pin(async move { Err(AppError::Auth(e).into()) }),
        }
    }
}
