use std::env;

use chrono::Duration;
use log::*;
use market_common::{parse_boolean_flag, parse_list, Secret};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_MKT_HOST: &str = "127.0.0.1";
const DEFAULT_MKT_PORT: u16 = 8090;
const DEFAULT_MKT_DATABASE_URL: &str = "sqlite://data/market.db";
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::hours(24);
const DEFAULT_CORS_MAX_AGE: u64 = 3600;
/// HS256 keys shorter than the hash output are rejected.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Paths that are served without a bearer token. Everything else requires one.
/// No handler in this crate serves `/swagger-ui`, `/v3`, `/api-docs` or `/h2-console`. They are reserved public
/// prefixes for documentation and console tooling mounted next to the API.
pub const DEFAULT_PUBLIC_ROUTES: [&str; 6] =
    ["/auth/**", "/swagger-ui/**", "/v3/**", "/api-docs/**", "/h2-console/**", "/health"];
pub const DEFAULT_CORS_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:*", "http://127.0.0.1:*"];
pub const DEFAULT_CORS_ALLOWED_METHODS: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD"];
pub const DEFAULT_CORS_EXPOSED_HEADERS: [&str; 2] = ["Authorization", "Content-Type"];

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    /// Ordered glob patterns for the paths that skip authentication.
    pub public_routes: Vec<String>,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MKT_HOST.to_string(),
            port: DEFAULT_MKT_PORT,
            database_url: DEFAULT_MKT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            public_routes: to_strings(&DEFAULT_PUBLIC_ROUTES),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the environment. Invalid values are logged and replaced with defaults, with the
    /// exception of a JWT secret that is too short, which is an error.
    pub fn from_env_or_default() -> Result<Self, ServerError> {
        let host = env::var("MKT_HOST").ok().unwrap_or_else(|| DEFAULT_MKT_HOST.into());
        let port = env::var("MKT_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MKT_PORT. {e} Using the default, {DEFAULT_MKT_PORT}, instead."
                    );
                    DEFAULT_MKT_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MKT_PORT);
        let database_url = env::var("MKT_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ MKT_DATABASE_URL is not set. Using {DEFAULT_MKT_DATABASE_URL}.");
            DEFAULT_MKT_DATABASE_URL.into()
        });
        let auth = AuthConfig::from_env_or_default()?;
        let cors = CorsConfig::from_env_or_default();
        let public_routes = list_from_env("MKT_PUBLIC_ROUTES", &DEFAULT_PUBLIC_ROUTES);
        let use_x_forwarded_for = parse_boolean_flag(env::var("MKT_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("MKT_USE_FORWARDED").ok(), false);
        Ok(Self { host, port, database_url, auth, cors, public_routes, use_x_forwarded_for, use_forwarded })
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret used to sign and verify access tokens (HS256).
    pub jwt_secret: Secret<String>,
    /// How long an issued access token remains valid.
    pub token_lifetime: Duration,
    /// Grace period, in seconds, added to a token's expiry time when it is validated.
    pub leeway_secs: i64,
}

/// Uses a random signing secret.
impl Default for AuthConfig {
    fn default() -> Self {
        let secret = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret), token_lifetime: DEFAULT_TOKEN_LIFETIME, leeway_secs: 0 }
    }
}

impl AuthConfig {
    /// Falls back to a random secret when `MKT_JWT_SECRET` is unset. A secret that is set but too short is an error.
    pub fn from_env_or_default() -> Result<Self, ServerError> {
        let token_lifetime = env::var("MKT_JWT_EXPIRY")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .ok()
                    .filter(|&secs| secs > 0)
                    .map(Duration::seconds)
                    .or_else(|| {
                        warn!("🪛️ Invalid configuration value for MKT_JWT_EXPIRY: {s}. Using the default.");
                        None
                    })
            })
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let leeway_secs = env::var("MKT_JWT_LEEWAY")
            .ok()
            .and_then(|s| {
                s.parse::<i64>().ok().filter(|&secs| secs >= 0).or_else(|| {
                    warn!("🪛️ Invalid configuration value for MKT_JWT_LEEWAY: {s}. Using 0.");
                    None
                })
            })
            .unwrap_or(0);
        Self::with_secret(env::var("MKT_JWT_SECRET").ok(), token_lifetime, leeway_secs)
    }

    fn with_secret(secret: Option<String>, token_lifetime: Duration, leeway_secs: i64) -> Result<Self, ServerError> {
        match secret {
            Some(secret) => {
                let config = Self { jwt_secret: Secret::new(secret), token_lifetime, leeway_secs };
                config.validate()?;
                Ok(config)
            },
            None => {
                warn!(
                    "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO \
                     NOT operate on production like this, since every issued token becomes invalid when the server \
                     restarts. Set MKT_JWT_SECRET instead. 🚨️🚨️🚨️"
                );
                Ok(Self { token_lifetime, leeway_secs, ..Self::default() })
            },
        }
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.jwt_secret.reveal().len() < MIN_JWT_SECRET_LENGTH {
            return Err(ServerError::ConfigurationError(format!(
                "MKT_JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} bytes long"
            )));
        }
        Ok(())
    }
}

//-------------------------------------------------  CorsConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct CorsConfig {
    /// Origin patterns, e.g. `http://localhost:*`. A single `*` allows every origin.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    /// Header names a preflight may ask for. A single `*` allows whatever is requested.
    pub allowed_headers: Vec<String>,
    pub exposed_headers: Vec<String>,
    /// Seconds a browser may cache a preflight result.
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: to_strings(&DEFAULT_CORS_ALLOWED_ORIGINS),
            allowed_methods: to_strings(&DEFAULT_CORS_ALLOWED_METHODS),
            allowed_headers: vec!["*".to_string()],
            exposed_headers: to_strings(&DEFAULT_CORS_EXPOSED_HEADERS),
            max_age: DEFAULT_CORS_MAX_AGE,
        }
    }
}

impl CorsConfig {
    pub fn from_env_or_default() -> Self {
        let max_age = env::var("MKT_CORS_MAX_AGE")
            .ok()
            .and_then(|s| {
                s.parse::<u64>().ok().or_else(|| {
                    warn!("🪛️ Invalid configuration value for MKT_CORS_MAX_AGE: {s}. Using the default.");
                    None
                })
            })
            .unwrap_or(DEFAULT_CORS_MAX_AGE);
        Self {
            allowed_origins: list_from_env("MKT_CORS_ALLOWED_ORIGINS", &DEFAULT_CORS_ALLOWED_ORIGINS),
            allowed_methods: list_from_env("MKT_CORS_ALLOWED_METHODS", &DEFAULT_CORS_ALLOWED_METHODS),
            allowed_headers: list_from_env("MKT_CORS_ALLOWED_HEADERS", &["*"]),
            exposed_headers: list_from_env("MKT_CORS_EXPOSED_HEADERS", &DEFAULT_CORS_EXPOSED_HEADERS),
            max_age,
        }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The subset of the server configuration that handlers need at request time. It holds no secrets.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn list_from_env(name: &str, default: &[&str]) -> Vec<String> {
    match env::var(name) {
        Ok(s) => parse_list(&s).unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name}. {e}. Using the default.");
            to_strings(default)
        }),
        Err(_) => to_strings(default),
    }
}
