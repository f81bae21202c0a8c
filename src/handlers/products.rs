use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    db,
    error::AppResult,
    models::{CreateProduct, Product, ProductPagination, UpdateProduct},
    AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<ProductPagination>,
) -> AppResult<Json<Vec<Product>>> {
    let (offset, limit) = pagination.bounds()?;

    let start = Instant::now();
    let products = db::fetch_products(&state.db, offset, limit).await?;

    info!(
        count = products.len(),
        offset,
        limit,
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    Ok(Json(products))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    payload.validate()?;

    let start = Instant::now();
    let product = db::insert_product(&state.db, &payload).await?;

    info!(
        id = product.id,
        name = %product.name,
        elapsed_ms = start.elapsed().as_millis(),
        "Created product"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = db::fetch_product_by_id(&state.db, id).await?;
    info!(id, "Fetched product");
    Ok(Json(product))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProduct>,
) -> AppResult<Json<Product>> {
    payload.validate()?;

    let start = Instant::now();
    let product = db::update_product(&state.db, id, &payload).await?;

    info!(id, elapsed_ms = start.elapsed().as_millis(), "Updated product");

    Ok(Json(product))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    db::delete_product(&state.db, id).await?;
    info!(id, "Deleted product");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::handlers::tests::{body_json, test_app};

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn create_rejects_blank_name_before_touching_the_database() {
        let response = test_app()
            .oneshot(post_json(
                "/api/v1/products",
                r#"{"name":"  ","price":1.0,"quantity":1}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "name must not be empty");
    }

    #[tokio::test]
    async fn create_rejects_negative_price() {
        let response = test_app()
            .oneshot(post_json(
                "/api/v1/products",
                r#"{"name":"Lamp","price":-3.0,"quantity":1}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_rejects_negative_offset() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products?offset=-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
