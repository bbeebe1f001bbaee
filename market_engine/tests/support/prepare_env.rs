use log::*;
use market_engine::{
    db_types::{NewCustomer, NewProduct, Product},
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Creates a fresh, migrated database at `url` and returns a handle to it.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/market_test_{}.db", dir.display(), rand::random::<u64>())
}

async fn create_database(url: &str) {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(url).await {
            warn!("Error dropping database {url}: {e:?}");
        }
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

#[allow(dead_code)]
pub fn new_product(name: &str, category_id: i64, stock: i64, active: bool) -> NewProduct {
    NewProduct { name: name.to_string(), category_id, barcode: None, price: 10.5, stock, active }
}

#[allow(dead_code)]
pub fn new_customer(id: &str, email: &str) -> NewCustomer {
    NewCustomer {
        id: id.to_string(),
        first_name: "Ana".into(),
        last_name: "Ruiz".into(),
        phone: Some("3001234567".into()),
        address: None,
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".into(),
    }
}

#[allow(dead_code)]
pub fn names(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.name.as_str()).collect()
}
