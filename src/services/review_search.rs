use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{review::check_rating, BrandReviewRatios, ProductRatingSummary, ReviewSearchRow},
};

const SEARCH_COLUMNS: &str = "product_name, reviewer_name, rating, used_over_one_month, \
    repurchase_intention, skin_type_review, skin_concern_review, irritation_level_review, \
    cleansing_power_review, spreadability_review, review_content, review_date";

/// Wraps user text in `%...%` for ILIKE, escaping its own wildcards
pub fn contains_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn require(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

/// Reviews of products whose name contains `product_name` and whose text
/// contains `keyword`
pub async fn by_product_and_keyword(
    pool: &PgPool,
    product_name: &str,
    keyword: &str,
) -> AppResult<Vec<ReviewSearchRow>> {
    let product_name = require("product_name", product_name)?;
    let keyword = require("keyword", keyword)?;

    let sql = format!(
        "SELECT {SEARCH_COLUMNS} FROM review \
         WHERE product_name ILIKE $1 AND review_content ILIKE $2 \
         ORDER BY review_date DESC NULLS LAST, review_id DESC"
    );

    let rows = sqlx::query_as::<_, ReviewSearchRow>(&sql)
        .bind(contains_pattern(&product_name))
        .bind(contains_pattern(&keyword))
        .fetch_all(pool)
        .await?;

    tracing::debug!(%product_name, %keyword, results = rows.len(), "Keyword review search");

    Ok(rows)
}

/// Reviews of one product carrying exactly `rating` stars
pub async fn by_rating(
    pool: &PgPool,
    product_id: i32,
    rating: i32,
) -> AppResult<Vec<ReviewSearchRow>> {
    check_rating(rating).map_err(AppError::InvalidInput)?;

    let sql = format!(
        "SELECT {SEARCH_COLUMNS} FROM review \
         WHERE product_id = $1 AND rating = $2 \
         ORDER BY review_date DESC NULLS LAST, review_id DESC"
    );

    let rows = sqlx::query_as::<_, ReviewSearchRow>(&sql)
        .bind(product_id)
        .bind(rating)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Reviews dated within `start..=end`, both days inclusive
pub async fn by_date_range(
    pool: &PgPool,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<ReviewSearchRow>> {
    if start > end {
        return Err(AppError::InvalidInput(format!(
            "start_date {} is after end_date {}",
            start, end
        )));
    }

    let from = start.and_time(NaiveTime::MIN);
    let until = end
        .succ_opt()
        .ok_or_else(|| AppError::InvalidInput(format!("end_date {} is out of range", end)))?
        .and_time(NaiveTime::MIN);

    let sql = format!(
        "SELECT {SEARCH_COLUMNS} FROM review \
         WHERE review_date >= $1 AND review_date < $2 \
         ORDER BY review_date DESC, review_id DESC"
    );

    let rows = sqlx::query_as::<_, ReviewSearchRow>(&sql)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Reviews whose skin-type survey answer mentions `skin_type`
pub async fn by_skin_type(pool: &PgPool, skin_type: &str) -> AppResult<Vec<ReviewSearchRow>> {
    let skin_type = require("skin_type", skin_type)?;

    let sql = format!(
        "SELECT {SEARCH_COLUMNS} FROM review \
         WHERE skin_type_review ILIKE $1 \
         ORDER BY review_date DESC NULLS LAST, review_id DESC"
    );

    let rows = sqlx::query_as::<_, ReviewSearchRow>(&sql)
        .bind(contains_pattern(&skin_type))
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn product_rating_summary(
    pool: &PgPool,
    product_id: i32,
) -> AppResult<ProductRatingSummary> {
    sqlx::query_as::<_, ProductRatingSummary>(
        "SELECT product_id, product_name, number_of_reviews, review_rating, \
                review_5_star_ratio, review_4_star_ratio, review_3_star_ratio, \
                review_2_star_ratio, review_1_star_ratio \
         FROM product WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

const BRAND_RATIOS_SQL: &str = r#"
    SELECT
        p.brand_name AS brand_name,
        COUNT(r.review_id) AS total_reviews,
        (COUNT(*) FILTER (WHERE r.used_over_one_month))::float8 / COUNT(r.review_id) AS used_over_one_month_ratio,
        (COUNT(*) FILTER (WHERE r.repurchase_intention))::float8 / COUNT(r.review_id) AS repurchase_intention_ratio,
        AVG(r.rating)::float8 AS average_rating
    FROM review r
    JOIN product p ON p.product_id = r.product_id
    WHERE p.brand_name IS NOT NULL
"#;

/// Long-term-use and repurchase ratios over every review of a brand
pub async fn brand_review_ratios(pool: &PgPool, brand_name: &str) -> AppResult<BrandReviewRatios> {
    let brand_name = require("brand_name", brand_name)?;
    let sql = format!("{BRAND_RATIOS_SQL} AND p.brand_name = $1 GROUP BY p.brand_name");

    sqlx::query_as::<_, BrandReviewRatios>(&sql)
        .bind(&brand_name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No reviews found for brand {}", brand_name)))
}

/// Ratios for every brand that has at least one review
pub async fn all_brand_ratios(pool: &PgPool) -> AppResult<Vec<BrandReviewRatios>> {
    let sql = format!("{BRAND_RATIOS_SQL} GROUP BY p.brand_name ORDER BY p.brand_name");

    let rows = sqlx::query_as::<_, BrandReviewRatios>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
