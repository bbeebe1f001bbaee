use sqlx::SqliteConnection;

use crate::db_types::{Customer, NewCustomer};

pub async fn fetch_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<Customer>, sqlx::Error> {
    let customer = sqlx::query_as("SELECT * FROM customers WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(customer)
}

pub async fn insert(customer: NewCustomer, conn: &mut SqliteConnection) -> Result<Customer, sqlx::Error> {
    let customer = sqlx::query_as(
        r#"
            INSERT INTO customers (id, first_name, last_name, phone, address, email, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(customer.id)
    .bind(customer.first_name)
    .bind(customer.last_name)
    .bind(customer.phone)
    .bind(customer.address)
    .bind(customer.email)
    .bind(customer.password_hash)
    .fetch_one(conn)
    .await?;
    Ok(customer)
}
