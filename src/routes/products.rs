use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Pagination, Product, ProductInput},
    routes::{
        extract::{AppJson, AppPath, AppQuery},
        AppState,
    },
    services::products,
};

pub async fn list(
    State(state): State<Arc<AppState>>,
    AppQuery(page): AppQuery<Pagination>,
) -> AppResult<Json<Vec<Product>>> {
    let products = products::list_products(&state.db_pool, page).await?;
    Ok(Json(products))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    AppPath(product_id): AppPath<i32>,
) -> AppResult<Json<Product>> {
    let product = products::get_product(&state.db_pool, product_id).await?;
    Ok(Json(product))
}

/// Creates a product; its name is embedded before the insert
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppJson(input): AppJson<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    tracing::info!(
        request_id = %request_id,
        product_name = %input.product_name,
        "Creating product"
    );

    let product = products::create_product(&state.db_pool, &state.embeddings, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(product_id): AppPath<i32>,
    AppJson(input): AppJson<ProductInput>,
) -> AppResult<Json<Product>> {
    tracing::info!(request_id = %request_id, product_id, "Updating product");

    let product =
        products::update_product(&state.db_pool, &state.embeddings, product_id, input).await?;
    Ok(Json(product))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(product_id): AppPath<i32>,
) -> AppResult<Json<Product>> {
    tracing::info!(request_id = %request_id, product_id, "Deleting product");

    let product = products::delete_product(&state.db_pool, product_id).await?;
    Ok(Json(product))
}
