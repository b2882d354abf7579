/// Sentence-embedding backends
///
/// The recommender and the CRUD layer only talk to [`EmbeddingService`];
/// the model itself sits behind the [`EmbeddingProvider`] trait so the
/// inference server can be swapped without touching callers.
use std::sync::Arc;

use pgvector::Vector;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
};

pub mod http;

pub use http::HttpEmbeddingProvider;

/// Query embeddings are stable for a given model, so they may live long
const EMBEDDING_CACHE_TTL: u64 = 86_400; // 1 day

/// Trait for sentence-embedding backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds every input text, returning one vector per input in order
    async fn embed(&self, inputs: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Model identifier, part of every cache key
    fn model(&self) -> String;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Validating, caching front for an [`EmbeddingProvider`]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Option<Cache>,
    dimensions: usize,
}

impl EmbeddingService {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        cache: Option<Cache>,
        dimensions: usize,
    ) -> Self {
        Self {
            provider,
            cache,
            dimensions,
        }
    }

    /// Embeds a search query, consulting the cache first
    ///
    /// Empty or whitespace-only text is rejected as invalid input.
    pub async fn embed_query(&self, text: &str) -> AppResult<Vector> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
        }

        let key = CacheKey::Embedding {
            model: self.provider.model(),
            text: text.to_string(),
        };

        let vector: Vec<f32> = cached!(self.cache.as_ref(), key, EMBEDDING_CACHE_TTL, async {
            self.embed_uncached(text).await
        })?;

        Ok(Vector::from(vector))
    }

    /// Embeds stored text (product names, review bodies) without caching
    ///
    /// Returns `None` for empty text and when the backend fails; the row is
    /// then stored without an embedding and simply drops out of semantic
    /// ranking.
    pub async fn embed_document(&self, text: Option<&str>) -> Option<Vector> {
        let text = text.map(str::trim).filter(|t| !t.is_empty())?;

        match self.embed_uncached(text).await {
            Ok(vector) => Some(Vector::from(vector)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = self.provider.name(),
                    "Storing row without embedding"
                );
                None
            }
        }
    }

    async fn embed_uncached(&self, text: &str) -> AppResult<Vec<f32>> {
        let vectors = self.provider.embed(&[text.to_string()]).await?;

        let vector = vectors.into_iter().next().ok_or_else(|| {
            AppError::Embedding(format!("{} returned no embedding", self.provider.name()))
        })?;

        if vector.len() != self.dimensions {
            return Err(AppError::Embedding(format!(
                "{} returned a {}-dimensional vector, expected {}",
                self.provider.name(),
                vector.len(),
                self.dimensions
            )));
        }

        tracing::debug!(
            provider = self.provider.name(),
            chars = text.chars().count(),
            "Computed embedding"
        );

        Ok(vector)
    }
}
