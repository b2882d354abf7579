pub mod postgres;
pub mod redis;

pub use postgres::{check_embedding_dimensions, create_pool, run_migrations};
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
