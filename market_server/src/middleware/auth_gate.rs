//! Authentication gate for the whole application.
//!
//! Every request is classified by the [`RouteClassifier`]. Public paths are passed straight through without looking at
//! the `Authorization` header. Every other path needs a valid bearer token. The validated [`AuthenticatedIdentity`] is
//! stored in the request extensions, where handlers pick it up with the `AuthenticatedIdentity` extractor.
//!
//! A rejected request never reaches a handler. It is answered with a uniform `401 Unauthorized`, and the reason is only
//! logged. The rejection is returned as a normal response, so outer middleware (CORS, the access log) still see it.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
    ResponseError,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::{extract_bearer_token, AuthenticatedIdentity, TokenValidator},
    errors::{ServerError, TokenRejection},
    route_rules::{Requirement, RouteClassifier},
};

pub struct AuthGateFactory {
    classifier: Rc<RouteClassifier>,
    validator: Rc<TokenValidator>,
}

impl AuthGateFactory {
    pub fn new(classifier: RouteClassifier, validator: TokenValidator) -> Self {
        AuthGateFactory { classifier: Rc::new(classifier), validator: Rc::new(validator) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGateFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = AuthGateService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            classifier: Rc::clone(&self.classifier),
            validator: Rc::clone(&self.validator),
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGateService<S> {
    classifier: Rc<RouteClassifier>,
    validator: Rc<TokenValidator>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let requirement = self.classifier.classify(req.path());
        let validator = Rc::clone(&self.validator);
        Box::pin(async move {
            if requirement == Requirement::Public {
                trace!("🔐️ {} {} is public", req.method(), req.path());
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }
            match authenticate(&req, &validator) {
                Ok(identity) => {
                    trace!("🔐️ {} {} authenticated as {}", req.method(), req.path(), identity.subject());
                    req.extensions_mut().insert(identity);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Err(rejection) => {
                    info!("🔐️ Rejected {} {}. {rejection}", req.method(), req.path());
                    let res = ServerError::from(rejection).error_response();
                    Ok(req.into_response(res).map_into_right_body())
                },
            }
        })
    }
}

fn authenticate(req: &ServiceRequest, validator: &TokenValidator) -> Result<AuthenticatedIdentity, TokenRejection> {
    let header = req.headers().get(AUTHORIZATION).ok_or(TokenRejection::MissingCredentials)?;
    let token = extract_bearer_token(header)?;
    validator.validate(token)
}
