use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Pagination, Product, ProductAttributes, ProductFeatures, ProductInput},
    services::{embedding::EmbeddingService, placeholders},
};

/// Writable columns after `product_name`, in bind order
const DETAIL_COLUMNS: [&str; 11] = [
    "product_category",
    "brand_name",
    "original_price",
    "final_price",
    "number_of_reviews",
    "review_rating",
    "review_5_star_ratio",
    "review_4_star_ratio",
    "review_3_star_ratio",
    "review_2_star_ratio",
    "review_1_star_ratio",
];

fn writable_columns() -> Vec<&'static str> {
    std::iter::once("product_name")
        .chain(DETAIL_COLUMNS)
        .chain(ProductAttributes::COLUMNS)
        .collect()
}

fn select_columns() -> String {
    let mut columns = vec!["product_id"];
    columns.extend(writable_columns());
    columns.push("product_name_embedding");
    columns.join(", ")
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

fn validate(input: &ProductInput) -> AppResult<()> {
    if input.product_name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "product_name cannot be empty".to_string(),
        ));
    }
    for (field, price) in [
        ("original_price", input.original_price),
        ("final_price", input.final_price),
    ] {
        if price.is_some_and(|p| p < 0) {
            return Err(AppError::InvalidInput(format!("{} cannot be negative", field)));
        }
    }
    Ok(())
}

/// Binds the writable columns of `input` in [`writable_columns`] order
fn bind_input<'q>(
    mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, Product, sqlx::postgres::PgArguments>,
    input: &ProductInput,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Product, sqlx::postgres::PgArguments> {
    query = query
        .bind(input.product_name.trim().to_string())
        .bind(input.product_category.clone())
        .bind(input.brand_name.clone())
        .bind(input.original_price)
        .bind(input.final_price)
        .bind(input.stats.number_of_reviews)
        .bind(input.stats.review_rating)
        .bind(input.stats.review_5_star_ratio)
        .bind(input.stats.review_4_star_ratio)
        .bind(input.stats.review_3_star_ratio)
        .bind(input.stats.review_2_star_ratio)
        .bind(input.stats.review_1_star_ratio);
    for count in input.attributes.values() {
        query = query.bind(count);
    }
    query
}

pub async fn get_product(pool: &PgPool, product_id: i32) -> AppResult<Product> {
    let sql = format!(
        "SELECT {} FROM product WHERE product_id = $1",
        select_columns()
    );

    sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)
}

pub async fn list_products(pool: &PgPool, page: Pagination) -> AppResult<Vec<Product>> {
    let sql = format!(
        "SELECT {} FROM product ORDER BY product_id LIMIT $1 OFFSET $2",
        select_columns()
    );

    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok(products)
}

/// Creates a product, embedding its name on the way in
pub async fn create_product(
    pool: &PgPool,
    embeddings: &EmbeddingService,
    input: ProductInput,
) -> AppResult<Product> {
    validate(&input)?;
    let embedding = embeddings.embed_document(Some(&input.product_name)).await;

    let columns = writable_columns();
    let embedding_param = columns.len() + 1;
    let sql = format!(
        "INSERT INTO product ({}, product_name_embedding) VALUES ({}, ${}) RETURNING {}",
        columns.join(", "),
        placeholders(1, columns.len()),
        embedding_param,
        select_columns()
    );

    let query = bind_input(sqlx::query_as::<_, Product>(&sql), &input);
    let product = query.bind(embedding).fetch_one(pool).await?;

    tracing::info!(
        product_id = product.product_id,
        embedded = product.product_name_embedding.is_some(),
        "Created product"
    );

    Ok(product)
}

/// Replaces every writable field of a product and re-embeds its name
pub async fn update_product(
    pool: &PgPool,
    embeddings: &EmbeddingService,
    product_id: i32,
    input: ProductInput,
) -> AppResult<Product> {
    validate(&input)?;
    let embedding = embeddings.embed_document(Some(&input.product_name)).await;

    let columns = writable_columns();
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE product SET {}, product_name_embedding = ${} WHERE product_id = ${} RETURNING {}",
        assignments,
        columns.len() + 1,
        columns.len() + 2,
        select_columns()
    );

    let query = bind_input(sqlx::query_as::<_, Product>(&sql), &input);
    let product = query
        .bind(embedding)
        .bind(product_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(product_id, "Updated product");

    Ok(product)
}

/// Deletes a product and, through the foreign key cascade, its reviews
pub async fn delete_product(pool: &PgPool, product_id: i32) -> AppResult<Product> {
    let sql = format!(
        "DELETE FROM product WHERE product_id = $1 RETURNING {}",
        select_columns()
    );

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(product_id, "Deleted product");

    Ok(product)
}

/// Every product with the fields the recommender scores on
pub async fn list_features(pool: &PgPool) -> AppResult<Vec<ProductFeatures>> {
    let sql = format!(
        "SELECT product_id, product_name, product_category, brand_name, final_price, \
         number_of_reviews, review_rating, {} FROM product ORDER BY product_id",
        ProductAttributes::COLUMNS.join(", ")
    );

    let products = sqlx::query_as::<_, ProductFeatures>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatingStats;

    fn input(name: &str) -> ProductInput {
        ProductInput {
            product_name: name.to_string(),
            product_category: None,
            brand_name: None,
            original_price: None,
            final_price: None,
            stats: RatingStats::default(),
            attributes: ProductAttributes::default(),
        }
    }

    #[test]
    fn test_writable_columns_cover_input() {
        // name + details + attribute counts
        assert_eq!(writable_columns().len(), 1 + 11 + 15);
    }

    #[test]
    fn test_select_columns_end_with_embedding() {
        let columns = select_columns();
        assert!(columns.starts_with("product_id, product_name, product_category"));
        assert!(columns.ends_with(", product_name_embedding"));
    }

    #[test]
    fn test_validate() {
        assert!(validate(&input("토너")).is_ok());
        assert!(matches!(validate(&input(" ")), Err(AppError::InvalidInput(_))));

        let mut negative = input("크림");
        negative.final_price = Some(-100);
        assert!(matches!(validate(&negative), Err(AppError::InvalidInput(_))));
    }
}
