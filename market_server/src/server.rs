use std::{path::Path, time::Duration};

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use log::*;
use market_engine::{CustomerApi, ProductApi, PurchaseApi, SqliteDatabase};

use crate::{
    auth::{TokenIssuer, TokenValidator},
    config::{ServerConfig, ServerOptions},
    cors_policy::CorsPolicy,
    errors::ServerError,
    middleware::{AuthGateFactory, CorsMiddlewareFactory},
    route_rules::RouteClassifier,
    routes::{
        check_token,
        health,
        CreateProductRoute,
        CreatePurchaseRoute,
        DeleteProductRoute,
        LoginRoute,
        ProductByIdRoute,
        ProductsByCategoryRoute,
        ProductsRoute,
        PurchasesForClientRoute,
        PurchasesRoute,
        RegisterRoute,
        ScarceProductsRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    ensure_database_dir(&config.database_url)?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    config.auth.validate()?;
    let classifier = RouteClassifier::with_public_patterns(&config.public_routes)?;
    classifier.patterns().for_each(|(pattern, requirement)| info!("🔐️ {pattern} is {requirement}"));
    let cors_policy = CorsPolicy::new(&config.cors).map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
    info!("🌐️ CORS origins: {}", config.cors.allowed_origins.join(", "));
    let bind_addr = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let product_api = ProductApi::new(db.clone());
        let purchase_api = PurchaseApi::new(db.clone());
        let customer_api = CustomerApi::new(db.clone());
        let issuer = TokenIssuer::new(&config.auth);
        let validator = TokenValidator::new(&config.auth);
        let options = ServerOptions::from_config(&config);
        App::new()
            .wrap(AuthGateFactory::new(classifier.clone(), validator))
            .wrap(CorsMiddlewareFactory::new(cors_policy.clone()))
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mkt::access_log"))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::Data::new(product_api))
            .app_data(web::Data::new(purchase_api))
            .app_data(web::Data::new(customer_api))
            .app_data(web::Data::new(issuer))
            .app_data(web::Data::new(options))
            .service(health)
            .service(check_token)
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(ProductsByCategoryRoute::<SqliteDatabase>::new())
            .service(ScarceProductsRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(PurchasesRoute::<SqliteDatabase>::new())
            .service(PurchasesForClientRoute::<SqliteDatabase>::new())
            .service(CreatePurchaseRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((bind_addr.0.as_str(), bind_addr.1))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies are reported with the usual `{"error": ...}` body.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Could not deserialize request body. {err}");
    ServerError::InvalidRequestBody(err.to_string()).into()
}

/// SQLite creates missing database files, but not missing directories.
fn ensure_database_dir(url: &str) -> Result<(), ServerError> {
    let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
