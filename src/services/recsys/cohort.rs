use std::collections::HashMap;

use sqlx::PgPool;

use crate::{error::AppResult, models::SkinProfile};

use super::blend::bayesian_average;

/// Smallest Jaccard similarity for a reviewer to join the cohort
pub const MIN_SIMILARITY: f64 = 0.5;
/// Most similar reviewers kept in the cohort
pub const MAX_COHORT_SIZE: i64 = 200;
/// Neutral rating cohort averages shrink toward
pub const PRIOR_RATING: f64 = 3.0;
pub const PRIOR_WEIGHT: f64 = 2.0;

/// Similarity-weighted rating of one product within the cohort
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CohortRating {
    pub product_id: i32,
    pub weighted_rating: f64,
    pub weight_sum: f64,
}

impl CohortRating {
    /// Weighted mean shrunk toward [`PRIOR_RATING`]
    pub fn score(&self) -> f64 {
        bayesian_average(self.weighted_rating, self.weight_sum, PRIOR_RATING, PRIOR_WEIGHT)
    }
}

/// Cohort selection and rating aggregation in one statement
///
/// `$1` holds the profile's flags in [`SkinProfile::COLUMNS`] order. Each
/// reviewer's similarity is the Jaccard index of the two flag sets; two empty
/// sets give NULL and never qualify. `$2` excludes one reviewer, `$3` is the
/// similarity floor and `$4` the cohort cap.
fn cohort_sql() -> String {
    format!(
        r#"
        WITH similarity AS (
            SELECT
                rv.reviewer_id,
                (
                    SELECT COUNT(*) FILTER (WHERE mine AND theirs)::float8
                        / NULLIF(COUNT(*) FILTER (WHERE mine OR theirs), 0)
                    FROM UNNEST($1::bool[], ARRAY[{}]) AS f(mine, theirs)
                ) AS weight
            FROM reviewer rv
            WHERE $2::int4 IS NULL OR rv.reviewer_id <> $2
        ),
        cohort AS (
            SELECT reviewer_id, weight
            FROM similarity
            WHERE weight >= $3
            ORDER BY weight DESC, reviewer_id
            LIMIT $4
        )
        SELECT
            r.product_id,
            SUM(r.rating * c.weight) / SUM(c.weight) AS weighted_rating,
            SUM(c.weight) AS weight_sum
        FROM review r
        JOIN cohort c ON c.reviewer_id = r.reviewer_id
        WHERE r.rating IS NOT NULL
        GROUP BY r.product_id
        "#,
        SkinProfile::COLUMNS
            .iter()
            .map(|column| format!("rv.{}", column))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

/// Cohort score of every product the cohort reviewed
///
/// The cohort is the [`MAX_COHORT_SIZE`] reviewers most similar to
/// `profile`, at least [`MIN_SIMILARITY`] alike, never including
/// `exclude_reviewer`.
pub async fn cohort_scores(
    pool: &PgPool,
    profile: &SkinProfile,
    exclude_reviewer: Option<i32>,
) -> AppResult<HashMap<i32, f64>> {
    if profile.is_empty() {
        return Ok(HashMap::new());
    }

    let ratings = sqlx::query_as::<_, CohortRating>(&cohort_sql())
        .bind(profile.flags().to_vec())
        .bind(exclude_reviewer)
        .bind(MIN_SIMILARITY)
        .bind(MAX_COHORT_SIZE)
        .fetch_all(pool)
        .await?;

    tracing::debug!(
        products = ratings.len(),
        ?exclude_reviewer,
        "Computed cohort ratings"
    );

    Ok(ratings
        .into_iter()
        .map(|rating| (rating.product_id, rating.score()))
        .collect())
}
