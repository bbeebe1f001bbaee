use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewPurchase, Purchase, PurchaseItem};

const PURCHASE_COLUMNS: &str = "purchase_id, client_id, date, payment_method, comment, state";

pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Purchase>, sqlx::Error> {
    let q = format!("SELECT {PURCHASE_COLUMNS} FROM purchases ORDER BY purchase_id");
    let purchases = sqlx::query_as(&q).fetch_all(&mut *conn).await?;
    with_items(purchases, conn).await
}

pub async fn fetch_for_client(client_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Purchase>, sqlx::Error> {
    let q = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE client_id = $1 ORDER BY date, purchase_id");
    let purchases = sqlx::query_as(&q).bind(client_id).fetch_all(&mut *conn).await?;
    with_items(purchases, conn).await
}

pub async fn fetch_items(purchase_id: i64, conn: &mut SqliteConnection) -> Result<Vec<PurchaseItem>, sqlx::Error> {
    let items = sqlx::query_as(
        "SELECT product_id, quantity, total, active FROM purchase_items WHERE purchase_id = $1 ORDER BY product_id",
    )
    .bind(purchase_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Inserts the purchase header followed by its items. This is not atomic. Embed the call in a transaction and pass
/// `&mut tx` as the connection argument.
pub async fn insert(purchase: NewPurchase, conn: &mut SqliteConnection) -> Result<Purchase, sqlx::Error> {
    let q = format!(
        "INSERT INTO purchases (client_id, date, payment_method, comment, state) VALUES ($1, $2, $3, $4, $5) \
         RETURNING {PURCHASE_COLUMNS}"
    );
    let mut saved: Purchase = sqlx::query_as(&q)
        .bind(purchase.client_id)
        .bind(purchase.date)
        .bind(purchase.payment_method)
        .bind(purchase.comment)
        .bind(purchase.state)
        .fetch_one(&mut *conn)
        .await?;
    for item in purchase.items {
        sqlx::query(
            "INSERT INTO purchase_items (purchase_id, product_id, quantity, total, active) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(saved.purchase_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.total)
        .bind(item.active)
        .execute(&mut *conn)
        .await?;
    }
    saved.items = fetch_items(saved.purchase_id, conn).await?;
    trace!("🗃️ Purchase #{} inserted with {} items", saved.purchase_id, saved.items.len());
    Ok(saved)
}

async fn with_items(mut purchases: Vec<Purchase>, conn: &mut SqliteConnection) -> Result<Vec<Purchase>, sqlx::Error> {
    for purchase in purchases.iter_mut() {
        purchase.items = fetch_items(purchase.purchase_id, &mut *conn).await?;
    }
    Ok(purchases)
}
