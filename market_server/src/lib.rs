//! # Marketplace server
//! This crate hosts the HTTP surface of the marketplace back-office. It is responsible for:
//! * Authenticating every request with a stateless bearer token, unless the path is explicitly public.
//! * Applying the cross-origin policy, so that browser storefronts on other origins can call the API.
//! * Issuing tokens to registered customers (`/auth/register`, `/auth/login`).
//! * Serving the product catalogue and purchase endpoints backed by [`market_engine`].
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/auth/register`, `/auth/login`: Public credential issuance.
//! * `/check_token`: Returns the identity carried by the caller's token.
//! * `/products/...` and `/purchases/...`: The back-office API. These require a bearer token.

pub mod auth;
pub mod cli;
pub mod config;
pub mod cors_policy;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod route_rules;
pub mod routes;
pub mod server;
