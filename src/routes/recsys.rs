use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{RecommendationRequest, RecommendationResponse, SemanticMatch, SkinProfile, Strategy},
    routes::{
        extract::{optional_json, AppJson, AppPath, AppQuery},
        AppState,
    },
    services::recsys::{self, semantic::SemanticWeights},
};

#[derive(Debug, Default, Deserialize)]
pub struct TopNParams {
    pub top_n: Option<usize>,
}

/// Query parameters of the legacy semantic ranking; unset weights keep
/// their defaults
#[derive(Debug, Default, Deserialize)]
pub struct LegacyParams {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub top_n: Option<usize>,
}

impl LegacyParams {
    fn weights(&self) -> SemanticWeights {
        let defaults = SemanticWeights::default();
        SemanticWeights {
            alpha: self.alpha.unwrap_or(defaults.alpha),
            beta: self.beta.unwrap_or(defaults.beta),
            gamma: self.gamma.unwrap_or(defaults.gamma),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewerQueryParams {
    pub query: Option<String>,
    pub top_n: Option<usize>,
}

async fn serve(
    state: &AppState,
    request_id: &RequestId,
    request: RecommendationRequest,
    expected: Option<Strategy>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        has_query = request.query.is_some(),
        has_profile = request.profile.is_some(),
        top_n = ?request.top_n,
        "Processing recommendation request"
    );

    let response = recsys::recommend(
        &state.db_pool,
        &state.embeddings,
        state.cache.as_ref(),
        request,
        expected,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        returned = response.recommendations.len(),
        "Recommendation completed"
    );

    Ok(Json(response))
}

/// `GET /recsys/{query}`: ranking by name and review similarity only
pub async fn legacy_semantic(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(query): AppPath<String>,
    AppQuery(params): AppQuery<LegacyParams>,
) -> AppResult<Json<Vec<SemanticMatch>>> {
    tracing::info!(request_id = %request_id, %query, "Processing semantic ranking");

    let matches = recsys::semantic_ranking(
        &state.db_pool,
        &state.embeddings,
        &query,
        params.weights(),
        params.top_n,
    )
    .await?;

    Ok(Json(matches))
}

/// `GET|POST /recsys1/{query}` with a skin profile body
pub async fn hybrid(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(query): AppPath<String>,
    AppQuery(params): AppQuery<TopNParams>,
    body: Result<Json<SkinProfile>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let request = RecommendationRequest {
        query: Some(query),
        profile: optional_json(body)?,
        top_n: params.top_n,
    };
    serve(&state, &request_id, request, Some(Strategy::Hybrid)).await
}

/// `GET|POST /recsys2` with a skin profile body
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppQuery(params): AppQuery<TopNParams>,
    body: Result<Json<SkinProfile>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let request = RecommendationRequest {
        query: None,
        profile: optional_json(body)?,
        top_n: params.top_n,
    };
    serve(&state, &request_id, request, Some(Strategy::Profile)).await
}

/// `GET /recsys3/{query}`
pub async fn semantic(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(query): AppPath<String>,
    AppQuery(params): AppQuery<TopNParams>,
) -> AppResult<Json<RecommendationResponse>> {
    let request = RecommendationRequest {
        query: Some(query),
        profile: None,
        top_n: params.top_n,
    };
    serve(&state, &request_id, request, Some(Strategy::Semantic)).await
}

/// `POST /recommendations`: strategy picked from whichever inputs are present
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    serve(&state, &request_id, request, None).await
}

/// `GET /reviewers/{id}/recommendations`
pub async fn for_reviewer(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppPath(reviewer_id): AppPath<i32>,
    AppQuery(params): AppQuery<ReviewerQueryParams>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(request_id = %request_id, reviewer_id, "Recommending for reviewer");

    let response = recsys::recommend_for_reviewer(
        &state.db_pool,
        &state.embeddings,
        state.cache.as_ref(),
        reviewer_id,
        params.query,
        params.top_n,
    )
    .await?;

    Ok(Json(response))
}
