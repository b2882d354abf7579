use pgvector::Vector;
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::SemanticMatch,
};

/// Reviews a product needs before long-term reviews weigh in separately
pub const MIN_REVIEWS_FOR_LONG_TERM: i64 = 3;

/// Name, review and long-term-review similarity of one product to a query
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SimilarityRow {
    pub product_id: i32,
    pub product_name: String,
    pub name_similarity: f64,
    pub review_count: i64,
    pub used_count: i64,
    pub avg_similarity: Option<f64>,
    pub avg_similarity_used: Option<f64>,
}

/// Weights of name (α), review (β) and long-term review (γ) similarity
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SemanticWeights {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

fn default_alpha() -> f64 {
    1.0
}

fn default_beta() -> f64 {
    1.0
}

fn default_gamma() -> f64 {
    1.5
}

impl Default for SemanticWeights {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            gamma: default_gamma(),
        }
    }
}

impl SemanticWeights {
    pub fn validate(&self) -> AppResult<()> {
        let weights = [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Blended similarity of a product to the query
///
/// Without reviews the name alone counts. Long-term reviews get their own
/// term once the product has enough reviews and at least one of them is
/// long-term.
pub fn semantic_score(row: &SimilarityRow, weights: &SemanticWeights) -> f64 {
    let SemanticWeights { alpha, beta, gamma } = *weights;

    let Some(avg) = row.avg_similarity else {
        return row.name_similarity;
    };

    match row.avg_similarity_used {
        Some(avg_used) if row.review_count >= MIN_REVIEWS_FOR_LONG_TERM => {
            (alpha * row.name_similarity + beta * avg + gamma * avg_used) / (alpha + beta + gamma)
        }
        _ => (alpha * row.name_similarity + beta * avg) / (alpha + beta),
    }
}

/// Score of the query-only ranking served at `/recsys/{query}`
///
/// Only products with scored reviews take part. From
/// `MIN_REVIEWS_FOR_LONG_TERM` reviews on, the long-term term joins and the
/// divisor grows with the number of long-term reviews:
/// `(α·name + β·avg + γ·avg_used) / (1 + γ + γ·used_count)`; below it the
/// score is `(α·name + β·avg) / (1 + α + β)`.
pub fn legacy_score(row: &SimilarityRow, weights: &SemanticWeights) -> Option<f64> {
    let SemanticWeights { alpha, beta, gamma } = *weights;
    let avg = row.avg_similarity?;

    let score = if row.review_count >= MIN_REVIEWS_FOR_LONG_TERM {
        let long_term = row.avg_similarity_used.map_or(0.0, |used| gamma * used);
        (alpha * row.name_similarity + beta * avg + long_term)
            / (1.0 + gamma + gamma * row.used_count as f64)
    } else {
        (alpha * row.name_similarity + beta * avg) / (1.0 + alpha + beta)
    };
    Some(score)
}

const SIMILARITY_SQL: &str = r#"
    WITH q AS (SELECT $1 AS embedding),
    review_scores AS (
        SELECT
            r.product_id,
            COUNT(*) AS review_count,
            COUNT(*) FILTER (WHERE r.used_over_one_month) AS used_count,
            AVG(1 - (r.review_content_embedding <=> q.embedding)) AS avg_similarity,
            AVG(1 - (r.review_content_embedding <=> q.embedding))
                FILTER (WHERE r.used_over_one_month) AS avg_similarity_used
        FROM review r CROSS JOIN q
        GROUP BY r.product_id
    )
    SELECT
        p.product_id,
        p.product_name,
        1 - (p.product_name_embedding <=> q.embedding) AS name_similarity,
        COALESCE(s.review_count, 0) AS review_count,
        COALESCE(s.used_count, 0) AS used_count,
        s.avg_similarity,
        s.avg_similarity_used
    FROM product p
    CROSS JOIN q
    LEFT JOIN review_scores s ON s.product_id = p.product_id
    WHERE p.product_name_embedding IS NOT NULL
"#;

/// Similarity aggregates of every product that has a name embedding
///
/// Cosine similarity is `1 - (a <=> b)`; reviews without an embedding count
/// towards `review_count` but not towards the averages.
pub async fn similarities(pool: &PgPool, query: &Vector) -> AppResult<Vec<SimilarityRow>> {
    let rows = sqlx::query_as::<_, SimilarityRow>(SIMILARITY_SQL)
        .bind(query)
        .fetch_all(pool)
        .await?;

    tracing::debug!(candidates = rows.len(), "Computed semantic similarities");

    Ok(rows)
}

/// Ranks rows by [`legacy_score`], best first, ties by product id; rows
/// without scored reviews are left out
pub fn rank(rows: Vec<SimilarityRow>, weights: &SemanticWeights, top_n: usize) -> Vec<SemanticMatch> {
    let mut matches: Vec<SemanticMatch> = rows
        .into_iter()
        .filter_map(|row| {
            let final_score = legacy_score(&row, weights)?;
            Some(SemanticMatch {
                product_id: row.product_id,
                product_name: row.product_name,
                name_similarity: row.name_similarity,
                review_count: row.review_count,
                used_count: row.used_count,
                avg_similarity: row.avg_similarity,
                avg_similarity_used: row.avg_similarity_used,
                final_score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.final_score
            .total_cmp(&a.final_score)
            .then(a.product_id.cmp(&b.product_id))
    });
    matches.truncate(top_n);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        product_id: i32,
        name: f64,
        review_count: i64,
        avg: Option<f64>,
        avg_used: Option<f64>,
    ) -> SimilarityRow {
        SimilarityRow {
            product_id,
            product_name: format!("product {}", product_id),
            name_similarity: name,
            review_count,
            used_count: i64::from(avg_used.is_some()),
            avg_similarity: avg,
            avg_similarity_used: avg_used,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_score_without_reviews_is_name_similarity() {
        let weights = SemanticWeights::default();
        assert!(approx(semantic_score(&row(1, 0.42, 0, None, None), &weights), 0.42));
    }

    #[test]
    fn test_score_with_few_reviews_ignores_long_term() {
        let weights = SemanticWeights::default();
        let score = semantic_score(&row(1, 0.8, 2, Some(0.4), Some(1.0)), &weights);
        assert!(approx(score, 0.6));
    }

    #[test]
    fn test_score_with_long_term_reviews() {
        let weights = SemanticWeights::default();
        let score = semantic_score(&row(1, 0.8, 3, Some(0.4), Some(0.6)), &weights);
        assert!(approx(score, (0.8 + 0.4 + 1.5 * 0.6) / 3.5));
    }

    #[test]
    fn test_score_without_long_term_reviews() {
        let weights = SemanticWeights::default();
        let score = semantic_score(&row(1, 0.8, 10, Some(0.4), None), &weights);
        assert!(approx(score, 0.6));
    }

    #[test]
    fn test_weights_validation() {
        assert!(SemanticWeights::default().validate().is_ok());

        let negative = SemanticWeights {
            gamma: -1.0,
            ..Default::default()
        };
        assert!(matches!(negative.validate(), Err(AppError::InvalidInput(_))));

        let unbounded = SemanticWeights {
            alpha: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(unbounded.validate(), Err(AppError::InvalidInput(_))));

        let zeros = SemanticWeights {
            alpha: 0.0,
            beta: 0.0,
            gamma: 0.0,
        };
        assert!(zeros.validate().is_ok());
    }

    #[test]
    fn test_legacy_score_with_enough_reviews() {
        let weights = SemanticWeights::default();
        let mut long_term = row(1, 0.8, 3, Some(0.4), Some(0.6));
        long_term.used_count = 2;
        // (0.8 + 0.4 + 1.5 * 0.6) / (1 + 1.5 + 1.5 * 2)
        let score = legacy_score(&long_term, &weights).unwrap();
        assert!(approx(score, 2.1 / 5.5));
    }

    #[test]
    fn test_legacy_score_without_long_term_reviews() {
        let weights = SemanticWeights::default();
        let score = legacy_score(&row(1, 0.8, 4, Some(0.4), None), &weights).unwrap();
        assert!(approx(score, 1.2 / 2.5));
    }

    #[test]
    fn test_legacy_score_with_few_reviews() {
        let weights = SemanticWeights {
            alpha: 2.0,
            beta: 1.0,
            gamma: 1.5,
        };
        let score = legacy_score(&row(1, 0.8, 2, Some(0.4), Some(1.0)), &weights).unwrap();
        assert!(approx(score, (1.6 + 0.4) / 4.0));
    }

    #[test]
    fn test_legacy_score_needs_reviews() {
        let weights = SemanticWeights::default();
        assert_eq!(legacy_score(&row(1, 0.9, 0, None, None), &weights), None);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let rows = vec![
            row(3, 0.5, 1, Some(0.5), None),
            row(1, 0.9, 1, Some(0.9), None),
            row(4, 0.99, 0, None, None),
            row(2, 0.5, 1, Some(0.5), None),
        ];
        let ranked = rank(rows, &SemanticWeights::default(), 2);
        let ids: Vec<i32> = ranked.iter().map(|m| m.product_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(approx(ranked[0].final_score, 1.8 / 3.0));
    }
}
