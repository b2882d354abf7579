use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Pagination, Reviewer, ReviewerInput},
    routes::{
        extract::{AppJson, AppPath, AppQuery},
        AppState,
    },
    services::reviewers,
};

pub async fn list(
    State(state): State<Arc<AppState>>,
    AppQuery(page): AppQuery<Pagination>,
) -> AppResult<Json<Vec<Reviewer>>> {
    let reviewers = reviewers::list_reviewers(&state.db_pool, page).await?;
    Ok(Json(reviewers))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    AppPath(reviewer_id): AppPath<i32>,
) -> AppResult<Json<Reviewer>> {
    let reviewer = reviewers::get_reviewer(&state.db_pool, reviewer_id).await?;
    Ok(Json(reviewer))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppJson(input): AppJson<ReviewerInput>,
) -> AppResult<(StatusCode, Json<Reviewer>)> {
    tracing::info!(request_id = %request_id, "Creating reviewer");

    let reviewer = reviewers::create_reviewer(&state.db_pool, input).await?;
    Ok((StatusCode::CREATED, Json(reviewer)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(reviewer_id): AppPath<i32>,
    AppJson(input): AppJson<ReviewerInput>,
) -> AppResult<Json<Reviewer>> {
    tracing::info!(request_id = %request_id, reviewer_id, "Updating reviewer");

    let reviewer = reviewers::update_reviewer(&state.db_pool, reviewer_id, input).await?;
    Ok(Json(reviewer))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(reviewer_id): AppPath<i32>,
) -> AppResult<Json<Reviewer>> {
    tracing::info!(request_id = %request_id, reviewer_id, "Deleting reviewer");

    let reviewer = reviewers::delete_reviewer(&state.db_pool, reviewer_id).await?;
    Ok(Json(reviewer))
}
