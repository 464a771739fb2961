/// Identity middleware
///
/// Runs `SessionIssuer::require_identity` on the `Authorization` header and
/// stores the subject in request extensions for the handler. Rejections go
/// through `AppError`, so every reason renders as the same 401.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::SessionIssuer;
use crate::error::AppError;

/// Subject of a verified access token, read with `web::ReqData`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

/// Middleware for routes that need a caller identity
pub struct RequireIdentity {
    sessions: SessionIssuer,
}

impl RequireIdentity {
    pub fn new(sessions: SessionIssuer) -> Self {
        Self { sessions }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireIdentityService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireIdentityService {
            service: Rc::new(service),
            sessions: self.sessions.clone(),
        }))
    }
}

pub struct RequireIdentityService<S> {
    service: Rc<S>,
    sessions: SessionIssuer,
}

impl<S, B> Service<ServiceRequest> for RequireIdentityService<S>
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
        let header = crate::auth::authorization_header(req.request());

        match self.sessions.require_identity(header) {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUser(user_id));

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                let error: Error = AppError::Auth(e).into();
                Box::pin(async move { Err(error) })
            }
        }
    }
}
