mod auth_gate;
mod cors;

pub use auth_gate::{AuthGateFactory, AuthGateService};
pub use cors::{CorsMiddlewareFactory, CorsMiddlewareService};
