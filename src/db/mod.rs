use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::*;

const PRODUCT_COLUMNS: &str = "id, name, description, price, quantity, created_at, updated_at";

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

pub async fn fetch_products(pool: &PgPool, offset: i64, limit: i64) -> AppResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {} FROM products ORDER BY id LIMIT $1 OFFSET $2",
        PRODUCT_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(products)
}

pub async fn fetch_product_by_id(pool: &PgPool, id: i64) -> AppResult<Product> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {} FROM products WHERE id = $1",
        PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(not_found)
}

pub async fn insert_product(pool: &PgPool, payload: &CreateProduct) -> AppResult<Product> {
    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products (name, description, price, quantity)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        PRODUCT_COLUMNS
    ))
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn update_product(pool: &PgPool, id: i64, payload: &UpdateProduct) -> AppResult<Product> {
    // Unset fields keep their stored values
    let existing = fetch_product_by_id(pool, id).await?;

    sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET name        = $1,
            description = $2,
            price       = $3,
            quantity    = $4,
            updated_at  = NOW()
        WHERE id = $5
        RETURNING {}
        "#,
        PRODUCT_COLUMNS
    ))
    .bind(payload.name.as_deref().unwrap_or(&existing.name))
    .bind(payload.merged_description(existing.description.as_deref()))
    .bind(payload.price.unwrap_or(existing.price))
    .bind(payload.quantity.unwrap_or(existing.quantity))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(not_found)
}

pub async fn delete_product(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

pub async fn ping(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
