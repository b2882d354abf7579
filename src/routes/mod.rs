use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{postgres, Cache},
    error::AppResult,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::embedding::EmbeddingService,
};

pub mod extract;
pub mod products;
pub mod recsys;
pub mod reviewers;
pub mod reviews;
pub mod search;

/// Shared state handed to every handler
pub struct AppState {
    pub db_pool: PgPool,
    pub embeddings: Arc<EmbeddingService>,
    pub cache: Option<Cache>,
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
        .merge(entity_routes())
        .merge(search_routes())
        .merge(recsys_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn entity_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/reviewers",
            get(reviewers::list).post(reviewers::create),
        )
        .route(
            "/reviewers/:reviewer_id",
            get(reviewers::get).put(reviewers::update).delete(reviewers::delete),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:product_id",
            get(products::get).put(products::update).delete(products::delete),
        )
        .route("/reviews", get(reviews::list).post(reviews::create))
        .route(
            "/reviews/:review_id",
            get(reviews::get).put(reviews::update).delete(reviews::delete),
        )
}

fn search_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search/reviews/keyword", get(search::by_keyword))
        .route("/search/reviews/rating", get(search::by_rating))
        .route("/search/reviews/dates", get(search::by_date_range))
        .route("/search/reviews/skin-type", get(search::by_skin_type))
        .route(
            "/products/:product_id/rating-summary",
            get(search::rating_summary),
        )
        .route("/brands/:brand_name/ratios", get(search::brand_ratios))
}

fn recsys_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recsys/:query", get(recsys::legacy_semantic))
        .route(
            "/recsys1/:query",
            get(recsys::hybrid).post(recsys::hybrid),
        )
        .route("/recsys2", get(recsys::profile).post(recsys::profile))
        .route("/recsys3/:query", get(recsys::semantic))
        .route("/recommendations", axum::routing::post(recsys::recommend))
        .route(
            "/reviewers/:reviewer_id/recommendations",
            get(recsys::for_reviewer),
        )
}

async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Round-trips a `SELECT 1` through the pool
async fn db_health_check(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    postgres::ping(&state.db_pool).await?;
    Ok(Json(json!({ "status": "healthy", "database": "reachable" })))
}
