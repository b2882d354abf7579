use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Pagination, Review, ReviewInput},
    routes::{
        extract::{AppJson, AppPath, AppQuery},
        AppState,
    },
    services::reviews,
};

pub async fn list(
    State(state): State<Arc<AppState>>,
    AppQuery(page): AppQuery<Pagination>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = reviews::list_reviews(&state.db_pool, page).await?;
    Ok(Json(reviews))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    AppPath(review_id): AppPath<i32>,
) -> AppResult<Json<Review>> {
    let review = reviews::get_review(&state.db_pool, review_id).await?;
    Ok(Json(review))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppJson(input): AppJson<ReviewInput>,
) -> AppResult<(StatusCode, Json<Review>)> {
    tracing::info!(
        request_id = %request_id,
        product_id = input.product_id,
        reviewer_id = input.reviewer_id,
        "Creating review"
    );

    let review = reviews::create_review(&state.db_pool, &state.embeddings, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(review_id): AppPath<i32>,
    AppJson(input): AppJson<ReviewInput>,
) -> AppResult<Json<Review>> {
    tracing::info!(request_id = %request_id, review_id, "Updating review");

    let review = reviews::update_review(&state.db_pool, &state.embeddings, review_id, input).await?;
    Ok(Json(review))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(review_id): AppPath<i32>,
) -> AppResult<Json<Review>> {
    tracing::info!(request_id = %request_id, review_id, "Deleting review");

    let review = reviews::delete_review(&state.db_pool, review_id).await?;
    Ok(Json(review))
}
