//! CORS middleware.
//!
//! This wraps the authentication gate so that
//! * preflight requests are answered here and never reach the gate or a handler, and
//! * the allow-origin and exposed-headers metadata is attached to every response, including `401` rejections.
//!
//! Requests without an `Origin` header are not CORS requests and pass through untouched.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{HeaderName, ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN},
        Method,
    },
    Error,
    HttpResponse,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::cors_policy::CorsPolicy;

pub struct CorsMiddlewareFactory {
    policy: Rc<CorsPolicy>,
}

impl CorsMiddlewareFactory {
    pub fn new(policy: CorsPolicy) -> Self {
        CorsMiddlewareFactory { policy: Rc::new(policy) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorsMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<BoxBody>;
    type Transform = CorsMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddlewareService { policy: Rc::clone(&self.policy), service: Rc::new(service) }))
    }
}

pub struct CorsMiddlewareService<S> {
    policy: Rc<CorsPolicy>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<BoxBody>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = Rc::clone(&self.policy);
        Box::pin(async move {
            let Some(origin) = header_value(&req, &ORIGIN) else {
                return service.call(req).await.map(ServiceResponse::map_into_boxed_body);
            };
            if req.method() == Method::OPTIONS && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD) {
                let method = header_value(&req, &ACCESS_CONTROL_REQUEST_METHOD).unwrap_or_default();
                let requested_headers = header_value(&req, &ACCESS_CONTROL_REQUEST_HEADERS);
                let mut builder = HttpResponse::Ok();
                match policy.preflight_headers(&origin, &method, requested_headers.as_deref()) {
                    Some(headers) => {
                        trace!("🌐️ Preflight from {origin} for {method} {} allowed", req.path());
                        headers.into_iter().for_each(|header| {
                            builder.insert_header(header);
                        });
                    },
                    None => debug!("🌐️ Preflight from {origin} for {method} {} refused", req.path()),
                }
                builder.insert_header(CorsPolicy::vary_header(true));
                return Ok(req.into_response(builder.finish()));
            }
            let method = req.method().clone();
            let http_req = req.request().clone();
            let mut res = match service.call(req).await {
                Ok(res) => res.map_into_boxed_body(),
                Err(e) => ServiceResponse::from_err(e, http_req),
            };
            match policy.response_headers(&origin, &method) {
                Some(headers) => headers.into_iter().for_each(|(name, value)| {
                    res.headers_mut().insert(name, value);
                }),
                None => debug!("🌐️ Origin {origin} is not allowed. CORS headers omitted."),
            }
            let (name, value) = CorsPolicy::vary_header(false);
            res.headers_mut().append(name, value);
            Ok(res)
        })
    }
}

fn header_value(req: &ServiceRequest, name: &HeaderName) -> Option<String> {
    req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}
