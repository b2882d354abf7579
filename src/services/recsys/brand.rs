use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::BrandReviewRatios,
    services::review_search,
};

use super::blend::brand_score;

/// Brand statistics move slowly; a few minutes of staleness is acceptable
const BRAND_STATS_TTL: u64 = 300;

/// Brand score of every brand with reviews, keyed by brand name
pub async fn brand_scores(pool: &PgPool, cache: Option<&Cache>) -> AppResult<HashMap<String, f64>> {
    let ratios: Vec<BrandReviewRatios> = cached!(cache, CacheKey::BrandStats, BRAND_STATS_TTL, async {
        review_search::all_brand_ratios(pool).await
    })?;

    Ok(scores_by_brand(ratios))
}

fn scores_by_brand(ratios: Vec<BrandReviewRatios>) -> HashMap<String, f64> {
    ratios
        .into_iter()
        .filter_map(|r| brand_score(&r).map(|score| (r.brand_name, score)))
        .collect()
}
