use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewProduct, Product};

pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY product_id").fetch_all(conn).await?;
    Ok(products)
}

pub async fn fetch_by_id(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE product_id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_by_category(category_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products WHERE category_id = $1 ORDER BY name")
        .bind(category_id)
        .fetch_all(conn)
        .await?;
    Ok(products)
}

/// Active products with at most `quantity` units in stock.
pub async fn fetch_scarce(quantity: i64, conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products WHERE stock <= $1 AND active = 1 ORDER BY stock, product_id")
        .bind(quantity)
        .fetch_all(conn)
        .await?;
    Ok(products)
}

pub async fn insert(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (name, category_id, barcode, price, stock, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.category_id)
    .bind(product.barcode)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.active)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Product #{} inserted", product.product_id);
    Ok(product)
}

/// Returns `true` if a product was deleted.
pub async fn delete(product_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE product_id = $1").bind(product_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
