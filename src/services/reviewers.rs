use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Pagination, PersonalColors, Reviewer, ReviewerInput, SkinProfile},
    services::placeholders,
};

fn flag_columns() -> impl Iterator<Item = &'static str> {
    SkinProfile::COLUMNS
        .into_iter()
        .chain(PersonalColors::COLUMNS)
}

fn select_columns() -> String {
    std::iter::once("reviewer_id")
        .chain(std::iter::once("reviewer_name"))
        .chain(flag_columns())
        .collect::<Vec<_>>()
        .join(", ")
}

fn not_found() -> AppError {
    AppError::NotFound("Reviewer not found".to_string())
}

fn validate(input: &ReviewerInput) -> AppResult<String> {
    let name = input.reviewer_name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "reviewer_name cannot be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

pub async fn get_reviewer(pool: &PgPool, reviewer_id: i32) -> AppResult<Reviewer> {
    let sql = format!(
        "SELECT {} FROM reviewer WHERE reviewer_id = $1",
        select_columns()
    );

    sqlx::query_as::<_, Reviewer>(&sql)
        .bind(reviewer_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)
}

pub async fn list_reviewers(pool: &PgPool, page: Pagination) -> AppResult<Vec<Reviewer>> {
    let sql = format!(
        "SELECT {} FROM reviewer ORDER BY reviewer_id LIMIT $1 OFFSET $2",
        select_columns()
    );

    let reviewers = sqlx::query_as::<_, Reviewer>(&sql)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok(reviewers)
}

pub async fn create_reviewer(pool: &PgPool, input: ReviewerInput) -> AppResult<Reviewer> {
    let name = validate(&input)?;
    let flags: Vec<&str> = flag_columns().collect();

    let sql = format!(
        "INSERT INTO reviewer (reviewer_name, {}) VALUES ($1, {}) RETURNING {}",
        flags.join(", "),
        placeholders(2, flags.len()),
        select_columns()
    );

    let mut query = sqlx::query_as::<_, Reviewer>(&sql).bind(name);
    for flag in input.profile.flags().into_iter().chain(input.colors.flags()) {
        query = query.bind(flag);
    }
    let reviewer = query.fetch_one(pool).await?;

    tracing::info!(reviewer_id = reviewer.reviewer_id, "Created reviewer");

    Ok(reviewer)
}

pub async fn update_reviewer(
    pool: &PgPool,
    reviewer_id: i32,
    input: ReviewerInput,
) -> AppResult<Reviewer> {
    let name = validate(&input)?;

    let assignments = flag_columns()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 3))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE reviewer SET reviewer_name = $2, {} WHERE reviewer_id = $1 RETURNING {}",
        assignments,
        select_columns()
    );

    let mut query = sqlx::query_as::<_, Reviewer>(&sql)
        .bind(reviewer_id)
        .bind(name);
    for flag in input.profile.flags().into_iter().chain(input.colors.flags()) {
        query = query.bind(flag);
    }

    let reviewer = query.fetch_optional(pool).await?.ok_or_else(not_found)?;

    tracing::info!(reviewer_id, "Updated reviewer");

    Ok(reviewer)
}

/// Deletes a reviewer and, through the foreign key cascade, their reviews
pub async fn delete_reviewer(pool: &PgPool, reviewer_id: i32) -> AppResult<Reviewer> {
    let sql = format!(
        "DELETE FROM reviewer WHERE reviewer_id = $1 RETURNING {}",
        select_columns()
    );

    let reviewer = sqlx::query_as::<_, Reviewer>(&sql)
        .bind(reviewer_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(reviewer_id, "Deleted reviewer");

    Ok(reviewer)
}

/// Skin profile of a stored reviewer, for profile-based recommendations
pub async fn get_skin_profile(pool: &PgPool, reviewer_id: i32) -> AppResult<SkinProfile> {
    let sql = format!(
        "SELECT {} FROM reviewer WHERE reviewer_id = $1",
        SkinProfile::COLUMNS.join(", ")
    );

    sqlx::query_as::<_, SkinProfile>(&sql)
        .bind(reviewer_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)
}
