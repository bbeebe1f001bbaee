//! Cross-origin resource sharing rules.
//!
//! The policy only decides which CORS headers a response gets. It never blocks a request: when an origin is not
//! allowed, the headers are simply left off and the browser enforces the block. Credentialed CORS is not supported,
//! so `Access-Control-Allow-Credentials` is never emitted.
use actix_web::http::{
    header::{
        HeaderName,
        HeaderValue,
        ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS,
        ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_EXPOSE_HEADERS,
        ACCESS_CONTROL_MAX_AGE,
        VARY,
    },
    Method,
};
use regex::Regex;
use thiserror::Error;

use crate::config::CorsConfig;

#[derive(Debug, Clone, Error)]
pub enum CorsConfigError {
    #[error("'{0}' is not a valid origin pattern.")]
    InvalidOrigin(String),
    #[error("'{0}' is not a valid HTTP method.")]
    InvalidMethod(String),
    #[error("'{0}' is not a valid header name.")]
    InvalidHeader(String),
}

/// An allowed origin, e.g. `https://shop.example.com`, `http://localhost:*` or `https://*.example.com`.
///
/// A `*` in the host matches any run of host characters and a `:*` port matches any numeric port. A bare `*` matches
/// every origin.
#[derive(Debug, Clone)]
pub struct OriginPattern {
    regex: Regex,
}

impl OriginPattern {
    pub fn new(pattern: &str) -> Result<Self, CorsConfigError> {
        let pattern = pattern.trim();
        let invalid = || CorsConfigError::InvalidOrigin(pattern.to_string());
        if pattern == "*" {
            let regex = Regex::new("^.+$").map_err(|_| invalid())?;
            return Ok(Self { regex });
        }
        let (scheme, authority) = pattern.split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty() || authority.is_empty() || authority.contains('/') {
            return Err(invalid());
        }
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        };
        if host.is_empty() {
            return Err(invalid());
        }
        let host = host.split('*').map(regex::escape).collect::<Vec<_>>().join("[a-z0-9.-]*");
        let mut re = format!("(?i)^{}://{host}", regex::escape(scheme));
        match port {
            Some("*") => re.push_str(r":\d{1,5}"),
            Some(p) if !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()) => {
                re.push(':');
                re.push_str(p);
            },
            Some(_) => return Err(invalid()),
            None => {},
        }
        re.push('$');
        let regex = Regex::new(&re).map_err(|_| invalid())?;
        Ok(Self { regex })
    }

    pub fn matches(&self, origin: &str) -> bool {
        self.regex.is_match(origin)
    }
}

#[derive(Debug, Clone)]
enum AllowedHeaders {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<OriginPattern>,
    allowed_methods: Vec<Method>,
    allowed_headers: AllowedHeaders,
    exposed_headers: Option<HeaderValue>,
    max_age: u64,
}

/// The headers to attach to a response, as decided by [`CorsPolicy`].
pub type CorsHeaders = Vec<(HeaderName, HeaderValue)>;

impl CorsPolicy {
    pub fn new(config: &CorsConfig) -> Result<Self, CorsConfigError> {
        let allowed_origins =
            config.allowed_origins.iter().map(|o| OriginPattern::new(o)).collect::<Result<Vec<_>, _>>()?;
        let allowed_methods = config
            .allowed_methods
            .iter()
            .map(|m| Method::from_bytes(m.trim().as_bytes()).map_err(|_| CorsConfigError::InvalidMethod(m.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        let allowed_headers = if config.allowed_headers.iter().any(|h| h.trim() == "*") {
            AllowedHeaders::Any
        } else {
            let headers = config
                .allowed_headers
                .iter()
                .map(|h| {
                    HeaderName::from_bytes(h.trim().as_bytes())
                        .map(|h| h.as_str().to_string())
                        .map_err(|_| CorsConfigError::InvalidHeader(h.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowedHeaders::List(headers)
        };
        for h in &config.exposed_headers {
            HeaderName::from_bytes(h.trim().as_bytes()).map_err(|_| CorsConfigError::InvalidHeader(h.clone()))?;
        }
        let exposed_headers = if config.exposed_headers.is_empty() {
            None
        } else {
            let joined = config.exposed_headers.iter().map(|h| h.trim()).collect::<Vec<_>>().join(", ");
            Some(HeaderValue::from_str(&joined).map_err(|_| CorsConfigError::InvalidHeader(joined.clone()))?)
        };
        Ok(Self { allowed_origins, allowed_methods, allowed_headers, exposed_headers, max_age: config.max_age })
    }

    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|p| p.matches(origin))
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.allowed_methods.iter().any(|m| m.as_str() == method)
    }

    /// Headers for the answer to a preflight request, or `None` if the origin, method or any requested header is not
    /// allowed.
    pub fn preflight_headers(
        &self,
        origin: &str,
        request_method: &str,
        request_headers: Option<&str>,
    ) -> Option<CorsHeaders> {
        if !self.allows_origin(origin) || !self.allows_method(request_method) {
            return None;
        }
        let requested = request_headers
            .map(|s| s.split(',').map(|h| h.trim().to_ascii_lowercase()).filter(|h| !h.is_empty()).collect::<Vec<_>>())
            .unwrap_or_default();
        if let AllowedHeaders::List(allowed) = &self.allowed_headers {
            if requested.iter().any(|h| !allowed.iter().any(|a| a == h)) {
                return None;
            }
        }
        let methods = self.allowed_methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
        let mut headers = vec![
            (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_str(origin).ok()?),
            (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_str(&methods).ok()?),
            (ACCESS_CONTROL_MAX_AGE, HeaderValue::from(self.max_age)),
        ];
        if !requested.is_empty() {
            headers.push((ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_str(&requested.join(", ")).ok()?));
        }
        Some(headers)
    }

    /// Headers to add to the response of an actual (non-preflight) cross-origin request, or `None` if the origin or
    /// method is not allowed.
    pub fn response_headers(&self, origin: &str, method: &Method) -> Option<CorsHeaders> {
        if !self.allows_origin(origin) || !self.allows_method(method.as_str()) {
            return None;
        }
        let mut headers = vec![(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_str(origin).ok()?)];
        if let Some(exposed) = &self.exposed_headers {
            headers.push((ACCESS_CONTROL_EXPOSE_HEADERS, exposed.clone()));
        }
        Some(headers)
    }

    /// `Vary` values for a response to a CORS request. These go on every such response, allowed or not.
    pub fn vary_header(preflight: bool) -> (HeaderName, HeaderValue) {
        let value = if preflight {
            "Origin, Access-Control-Request-Method, Access-Control-Request-Headers"
        } else {
            "Origin"
        };
        (VARY, HeaderValue::from_static(value))
    }
}
