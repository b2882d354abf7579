use axum::{
    extract::State,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{BrandReviewRatios, ProductRatingSummary, ReviewSearchRow},
    routes::{
        extract::{AppPath, AppQuery},
        AppState,
    },
    services::review_search,
};

#[derive(Debug, Deserialize)]
pub struct KeywordParams {
    pub product_name: String,
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingParams {
    pub product_id: i32,
    pub rating: i32,
}

/// Dates as `YYYY-MM-DD`
#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SkinTypeParams {
    pub skin_type: String,
}

pub async fn by_keyword(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<KeywordParams>,
) -> AppResult<Json<Vec<ReviewSearchRow>>> {
    let rows =
        review_search::by_product_and_keyword(&state.db_pool, &params.product_name, &params.keyword)
            .await?;
    Ok(Json(rows))
}

pub async fn by_rating(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<RatingParams>,
) -> AppResult<Json<Vec<ReviewSearchRow>>> {
    let rows = review_search::by_rating(&state.db_pool, params.product_id, params.rating).await?;
    Ok(Json(rows))
}

pub async fn by_date_range(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<DateRangeParams>,
) -> AppResult<Json<Vec<ReviewSearchRow>>> {
    let rows =
        review_search::by_date_range(&state.db_pool, params.start_date, params.end_date).await?;
    Ok(Json(rows))
}

pub async fn by_skin_type(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SkinTypeParams>,
) -> AppResult<Json<Vec<ReviewSearchRow>>> {
    let rows = review_search::by_skin_type(&state.db_pool, &params.skin_type).await?;
    Ok(Json(rows))
}

pub async fn rating_summary(
    State(state): State<Arc<AppState>>,
    AppPath(product_id): AppPath<i32>,
) -> AppResult<Json<ProductRatingSummary>> {
    let summary = review_search::product_rating_summary(&state.db_pool, product_id).await?;
    Ok(Json(summary))
}

pub async fn brand_ratios(
    State(state): State<Arc<AppState>>,
    AppPath(brand_name): AppPath<String>,
) -> AppResult<Json<BrandReviewRatios>> {
    let ratios = review_search::brand_review_ratios(&state.db_pool, &brand_name).await?;
    Ok(Json(ratios))
}
