//! Product recommendations
//!
//! Every candidate product gets up to five signals: semantic similarity to
//! the query, preference match against the skin profile, shrunk product
//! rating, rating among similar reviewers, and brand loyalty. Signals are
//! z-scored across the candidates and summed with per-strategy weights.

use std::collections::{BTreeSet, HashMap};

use sqlx::PgPool;

use crate::{
    db::Cache,
    error::{AppError, AppResult},
    models::{
        ProductFeatures, Recommendation, RecommendationRequest, RecommendationResponse,
        SemanticMatch, Signals, SkinProfile, Strategy,
    },
    services::{embedding::EmbeddingService, products, reviewers},
};

pub mod blend;
pub mod brand;
pub mod category;
pub mod cohort;
pub mod preference;
pub mod semantic;

use blend::Weights;
use preference::Target;
use semantic::SemanticWeights;

pub const DEFAULT_TOP_N: usize = 10;
pub const MAX_TOP_N: usize = 50;

pub fn clamp_top_n(top_n: Option<usize>) -> usize {
    top_n.unwrap_or(DEFAULT_TOP_N).clamp(1, MAX_TOP_N)
}

/// Strategy for the given inputs, checked against the one an endpoint serves
fn resolve_strategy(
    has_profile: bool,
    has_query: bool,
    expected: Option<Strategy>,
) -> AppResult<Strategy> {
    let selected = Strategy::select(has_profile, has_query);

    match (selected, expected) {
        (None, _) => Err(AppError::InvalidInput(
            "Provide a query, a skin profile, or both".to_string(),
        )),
        (Some(selected), Some(expected)) if selected != expected => {
            let needs = match expected {
                Strategy::Hybrid => "both a query and a non-empty skin profile",
                Strategy::Profile => "a non-empty skin profile and no query",
                Strategy::Semantic => "a query and no skin profile",
            };
            Err(AppError::InvalidInput(format!(
                "{:?} recommendations need {}",
                expected, needs
            )))
        }
        (Some(selected), _) => Ok(selected),
    }
}

/// Recommends products for a query, a skin profile, or both
///
/// `expected` pins the strategy for endpoints that serve only one; inputs
/// that select another strategy are rejected.
pub async fn recommend(
    pool: &PgPool,
    embeddings: &EmbeddingService,
    cache: Option<&Cache>,
    request: RecommendationRequest,
    expected: Option<Strategy>,
) -> AppResult<RecommendationResponse> {
    recommend_excluding(pool, embeddings, cache, request, expected, None).await
}

/// [`recommend`], leaving `exclude_reviewer` out of the rating cohort
async fn recommend_excluding(
    pool: &PgPool,
    embeddings: &EmbeddingService,
    cache: Option<&Cache>,
    request: RecommendationRequest,
    expected: Option<Strategy>,
    exclude_reviewer: Option<i32>,
) -> AppResult<RecommendationResponse> {
    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());
    let profile = request.profile.as_ref().filter(|p| !p.is_empty());
    let strategy = resolve_strategy(profile.is_some(), query.is_some(), expected)?;
    let top_n = clamp_top_n(request.top_n);
    let detected = query.and_then(category::detect);

    let semantic_rows = async {
        match query {
            Some(q) => {
                let embedding = embeddings.embed_query(q).await?;
                semantic::similarities(pool, &embedding).await.map(Some)
            }
            None => Ok(None),
        }
    };
    let cohort_scores = async {
        match profile {
            Some(p) => cohort::cohort_scores(pool, p, exclude_reviewer)
                .await
                .map(Some),
            None => Ok(None),
        }
    };

    let (catalog, semantic_rows, cohort_scores, brand_scores) = tokio::try_join!(
        products::list_features(pool),
        semantic_rows,
        cohort_scores,
        brand::brand_scores(pool, cache),
    )?;

    let semantic_weights = SemanticWeights::default();
    let semantic_scores: Option<HashMap<i32, f64>> = semantic_rows.map(|rows| {
        rows.iter()
            .map(|row| (row.product_id, semantic::semantic_score(row, &semantic_weights)))
            .collect()
    });
    let targets = profile.map(preference::targets);

    let candidates = candidates(
        catalog,
        detected,
        semantic_scores.as_ref(),
        targets.as_ref(),
        cohort_scores.as_ref(),
        &brand_scores,
    );

    let candidate_count = candidates.len();
    let recommendations = rank(candidates, strategy, top_n);

    tracing::info!(
        ?strategy,
        category = detected.map(|c| c.name),
        candidates = candidate_count,
        returned = recommendations.len(),
        "Recommendations computed"
    );

    Ok(RecommendationResponse {
        strategy,
        category: detected.map(|c| c.name.to_string()),
        recommendations,
    })
}

/// Catalog products that survive the category filter, with their signals
///
/// Product scores use the whole catalog as prior, before any filtering.
fn candidates(
    catalog: Vec<ProductFeatures>,
    detected: Option<&category::Category>,
    semantic_scores: Option<&HashMap<i32, f64>>,
    targets: Option<&BTreeSet<Target>>,
    cohort_scores: Option<&HashMap<i32, f64>>,
    brand_scores: &HashMap<String, f64>,
) -> Vec<(ProductFeatures, Signals)> {
    let product_scores = blend::product_scores(&catalog);

    catalog
        .into_iter()
        .zip(product_scores)
        .filter(|(product, _)| detected.map_or(true, |c| category::product_matches(c, product)))
        .filter_map(|(product, product_score)| {
            let signals = collect_signals(
                &product,
                product_score,
                semantic_scores,
                targets,
                cohort_scores,
                brand_scores,
            )?;
            Some((product, signals))
        })
        .collect()
}

/// Raw signals of one product; `None` when a query is given and the product
/// has no semantic similarity
fn collect_signals(
    product: &ProductFeatures,
    product_score: Option<f64>,
    semantic_scores: Option<&HashMap<i32, f64>>,
    targets: Option<&BTreeSet<Target>>,
    cohort_scores: Option<&HashMap<i32, f64>>,
    brand_scores: &HashMap<String, f64>,
) -> Option<Signals> {
    let semantic = match semantic_scores {
        Some(scores) => Some(*scores.get(&product.product_id)?),
        None => None,
    };

    Some(Signals {
        semantic,
        preference: targets.and_then(|t| preference::score(t, &product.attributes)),
        product: product_score,
        cohort: cohort_scores.and_then(|c| c.get(&product.product_id).copied()),
        brand: product
            .brand_name
            .as_ref()
            .and_then(|b| brand_scores.get(b).copied()),
    })
}

/// Blends signals, then orders by score (ties by product id) and truncates
pub fn rank(
    candidates: Vec<(ProductFeatures, Signals)>,
    strategy: Strategy,
    top_n: usize,
) -> Vec<Recommendation> {
    let (products, signals): (Vec<ProductFeatures>, Vec<Signals>) = candidates.into_iter().unzip();
    let scores = blend::blend(&signals, Weights::for_strategy(strategy));

    let mut recommendations: Vec<Recommendation> = products
        .into_iter()
        .zip(signals)
        .zip(scores)
        .map(|((product, signals), score)| Recommendation {
            product_id: product.product_id,
            product_name: product.product_name,
            brand_name: product.brand_name,
            product_category: product.product_category,
            final_price: product.final_price,
            score,
            signals,
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.product_id.cmp(&b.product_id))
    });
    recommendations.truncate(top_n);
    recommendations
}

/// Recommendations for a stored reviewer's skin profile, optionally
/// narrowed by a query; the reviewer's own ratings stay out of the cohort
pub async fn recommend_for_reviewer(
    pool: &PgPool,
    embeddings: &EmbeddingService,
    cache: Option<&Cache>,
    reviewer_id: i32,
    query: Option<String>,
    top_n: Option<usize>,
) -> AppResult<RecommendationResponse> {
    let profile: SkinProfile = reviewers::get_skin_profile(pool, reviewer_id).await?;

    let request = RecommendationRequest {
        query,
        profile: Some(profile),
        top_n,
    };
    recommend_excluding(pool, embeddings, cache, request, None, Some(reviewer_id)).await
}

/// Query-only ranking by blended name and review similarity
pub async fn semantic_ranking(
    pool: &PgPool,
    embeddings: &EmbeddingService,
    query: &str,
    weights: SemanticWeights,
    top_n: Option<usize>,
) -> AppResult<Vec<SemanticMatch>> {
    weights.validate()?;
    let embedding = embeddings.embed_query(query).await?;
    let rows = semantic::similarities(pool, &embedding).await?;

    let matches = semantic::rank(rows, &weights, clamp_top_n(top_n));

    tracing::info!(
        alpha = weights.alpha,
        beta = weights.beta,
        gamma = weights.gamma,
        returned = matches.len(),
        "Semantic ranking computed"
    );

    Ok(matches)
}
