use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{review::check_rating, Pagination, Review, ReviewInput},
    services::embedding::EmbeddingService,
};

const PLAIN_COLUMNS: [&str; 13] = [
    "review_id",
    "product_id",
    "reviewer_id",
    "product_name",
    "reviewer_name",
    "rating",
    "used_over_one_month",
    "repurchase_intention",
    "skin_type_review",
    "skin_concern_review",
    "irritation_level_review",
    "cleansing_power_review",
    "spreadability_review",
];

/// Review columns, qualified with `alias` when given
fn select_columns(alias: Option<&str>) -> String {
    let qualify = |column: &str| match alias {
        Some(a) => format!("{}.{}", a, column),
        None => column.to_string(),
    };

    let mut columns: Vec<String> = PLAIN_COLUMNS.iter().map(|c| qualify(c)).collect();
    columns.push(qualify("review_content"));
    columns.push(qualify("review_date"));
    columns.push(qualify("review_content_embedding"));
    columns.join(", ")
}

fn not_found() -> AppError {
    AppError::NotFound("Review not found".to_string())
}

fn validate(input: &ReviewInput) -> AppResult<()> {
    check_rating(input.rating).map_err(AppError::InvalidInput)
}

/// Explains which side of a review's references is missing
async fn missing_reference(pool: &PgPool, product_id: i32, reviewer_id: i32) -> AppResult<AppError> {
    let (product_exists, reviewer_exists): (bool, bool) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM product WHERE product_id = $1), \
                EXISTS (SELECT 1 FROM reviewer WHERE reviewer_id = $2)",
    )
    .bind(product_id)
    .bind(reviewer_id)
    .fetch_one(pool)
    .await?;

    let message = if !product_exists {
        "Product not found"
    } else if !reviewer_exists {
        "Reviewer not found"
    } else {
        "Review not found"
    };
    Ok(AppError::NotFound(message.to_string()))
}

pub async fn get_review(pool: &PgPool, review_id: i32) -> AppResult<Review> {
    let sql = format!(
        "SELECT {} FROM review WHERE review_id = $1",
        select_columns(None)
    );

    sqlx::query_as::<_, Review>(&sql)
        .bind(review_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)
}

pub async fn list_reviews(pool: &PgPool, page: Pagination) -> AppResult<Vec<Review>> {
    let sql = format!(
        "SELECT {} FROM review ORDER BY review_id LIMIT $1 OFFSET $2",
        select_columns(None)
    );

    let reviews = sqlx::query_as::<_, Review>(&sql)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok(reviews)
}

/// Creates a review, copying product and reviewer names onto it
///
/// The statistics trigger updates the product's review count and rating in
/// the same statement.
pub async fn create_review(
    pool: &PgPool,
    embeddings: &EmbeddingService,
    input: ReviewInput,
) -> AppResult<Review> {
    validate(&input)?;
    let embedding = embeddings
        .embed_document(input.review_content.as_deref())
        .await;

    let sql = format!(
        r#"
        INSERT INTO review (
            product_id, reviewer_id, product_name, reviewer_name, rating,
            used_over_one_month, repurchase_intention, skin_type_review,
            skin_concern_review, irritation_level_review, cleansing_power_review,
            spreadability_review, review_content, review_date, review_content_embedding
        )
        SELECT p.product_id, r.reviewer_id, p.product_name, r.reviewer_name, $3,
               $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, LOCALTIMESTAMP), $13
        FROM product p, reviewer r
        WHERE p.product_id = $1 AND r.reviewer_id = $2
        RETURNING {}
        "#,
        select_columns(None)
    );

    let created = sqlx::query_as::<_, Review>(&sql)
        .bind(input.product_id)
        .bind(input.reviewer_id)
        .bind(input.rating)
        .bind(input.used_over_one_month)
        .bind(input.repurchase_intention)
        .bind(input.survey.skin_type_review)
        .bind(input.survey.skin_concern_review)
        .bind(input.survey.irritation_level_review)
        .bind(input.survey.cleansing_power_review)
        .bind(input.survey.spreadability_review)
        .bind(input.review_content)
        .bind(input.review_date)
        .bind(embedding)
        .fetch_optional(pool)
        .await?;

    match created {
        Some(review) => {
            tracing::info!(
                review_id = review.review_id,
                product_id = review.product_id,
                reviewer_id = review.reviewer_id,
                "Created review"
            );
            Ok(review)
        }
        None => Err(missing_reference(pool, input.product_id, input.reviewer_id).await?),
    }
}

/// Replaces a review; an omitted `review_date` keeps the stored one
pub async fn update_review(
    pool: &PgPool,
    embeddings: &EmbeddingService,
    review_id: i32,
    input: ReviewInput,
) -> AppResult<Review> {
    validate(&input)?;
    let embedding = embeddings
        .embed_document(input.review_content.as_deref())
        .await;

    let sql = format!(
        r#"
        UPDATE review AS rv
        SET product_id = p.product_id,
            reviewer_id = r.reviewer_id,
            product_name = p.product_name,
            reviewer_name = r.reviewer_name,
            rating = $4,
            used_over_one_month = $5,
            repurchase_intention = $6,
            skin_type_review = $7,
            skin_concern_review = $8,
            irritation_level_review = $9,
            cleansing_power_review = $10,
            spreadability_review = $11,
            review_content = $12,
            review_date = COALESCE($13, rv.review_date),
            review_content_embedding = $14
        FROM product p, reviewer r
        WHERE rv.review_id = $1 AND p.product_id = $2 AND r.reviewer_id = $3
        RETURNING {}
        "#,
        select_columns(Some("rv"))
    );

    let updated = sqlx::query_as::<_, Review>(&sql)
        .bind(review_id)
        .bind(input.product_id)
        .bind(input.reviewer_id)
        .bind(input.rating)
        .bind(input.used_over_one_month)
        .bind(input.repurchase_intention)
        .bind(input.survey.skin_type_review)
        .bind(input.survey.skin_concern_review)
        .bind(input.survey.irritation_level_review)
        .bind(input.survey.cleansing_power_review)
        .bind(input.survey.spreadability_review)
        .bind(input.review_content)
        .bind(input.review_date)
        .bind(embedding)
        .fetch_optional(pool)
        .await?;

    match updated {
        Some(review) => {
            tracing::info!(review_id, "Updated review");
            Ok(review)
        }
        None => {
            // Distinguish a missing review from a dangling reference
            get_review(pool, review_id).await?;
            Err(missing_reference(pool, input.product_id, input.reviewer_id).await?)
        }
    }
}

pub async fn delete_review(pool: &PgPool, review_id: i32) -> AppResult<Review> {
    let sql = format!(
        "DELETE FROM review WHERE review_id = $1 RETURNING {}",
        select_columns(None)
    );

    let review = sqlx::query_as::<_, Review>(&sql)
        .bind(review_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(review_id, product_id = review.product_id, "Deleted review");

    Ok(review)
}
