use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Tables whose serial primary key is resynchronised after migrations
const SERIAL_KEYS: [(&str, &str); 3] = [
    ("reviewer", "reviewer_id"),
    ("product", "product_id"),
    ("review", "review_id"),
];

/// pgvector columns filled from the embedding backend
const EMBEDDING_COLUMNS: [(&str, &str); 2] = [
    ("product", "product_name_embedding"),
    ("review", "review_content_embedding"),
];

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations and resyncs id sequences
///
/// Rows bulk-loaded with explicit ids leave the serial sequences behind the
/// table contents; every sequence is moved past the current maximum id.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply database migrations")?;

    for (table, column) in SERIAL_KEYS {
        let sql = format!(
            "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), \
             COALESCE((SELECT MAX({column}) FROM {table}), 0) + 1, false)"
        );
        sqlx::query(&sql)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to resync sequence for {table}.{column}"))?;
    }

    tracing::info!("Database migrations applied");

    Ok(())
}

/// Describes a vector column whose declared size differs from `expected`
///
/// pgvector stores the declared dimension as the type modifier; `-1` means
/// the column takes vectors of any size.
fn dimension_mismatch(table: &str, column: &str, typmod: i32, expected: usize) -> Option<String> {
    if typmod < 0 || usize::try_from(typmod).ok() == Some(expected) {
        return None;
    }
    Some(format!(
        "{table}.{column} is declared vector({typmod}) but EMBEDDING_DIMENSIONS is {expected}"
    ))
}

/// Verifies every embedding column accepts vectors of `expected` dimensions
pub async fn check_embedding_dimensions(pool: &PgPool, expected: usize) -> anyhow::Result<()> {
    for (table, column) in EMBEDDING_COLUMNS {
        let typmod: i32 = sqlx::query_scalar(
            "SELECT atttypmod FROM pg_attribute \
             WHERE attrelid = $1::regclass AND attname = $2 AND NOT attisdropped",
        )
        .bind(table)
        .bind(column)
        .fetch_one(pool)
        .await
        .with_context(|| format!("Failed to read the type of {table}.{column}"))?;

        if let Some(message) = dimension_mismatch(table, column, typmod, expected) {
            anyhow::bail!(message);
        }
    }

    tracing::debug!(dimensions = expected, "Embedding columns match the configured size");

    Ok(())
}

/// Round-trips a trivial query to verify the pool can reach the database
pub async fn ping(pool: &PgPool) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(dimension_mismatch("product", "product_name_embedding", 768, 768), None);
        assert_eq!(dimension_mismatch("product", "product_name_embedding", -1, 384), None);
        assert_eq!(
            dimension_mismatch("review", "review_content_embedding", 768, 384).unwrap(),
            "review.review_content_embedding is declared vector(768) but EMBEDDING_DIMENSIONS is 384"
        );
    }
}
