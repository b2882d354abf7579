/// HTTP embedding provider
///
/// Speaks the OpenAI-compatible `POST /v1/embeddings` protocol served by
/// text-embeddings-inference, vLLM, Ollama and most sentence-transformers
/// wrappers:
///
/// ```text
/// → {"model": "...", "input": ["text", ...]}
/// ← {"data": [{"index": 0, "embedding": [0.1, ...]}, ...]}
/// ```
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    services::embedding::EmbeddingProvider,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpEmbeddingProvider {
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.api_url)
    }

    /// Orders the returned vectors by their `index` and checks the count
    fn into_vectors(response: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
        let mut data = response.data;
        if data.len() != expected {
            return Err(AppError::Embedding(format!(
                "expected {} embeddings, received {}",
                expected,
                data.len()
            )));
        }

        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, inputs: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self.http_client.post(self.endpoint()).json(&EmbeddingRequest {
            model: &self.model,
            input: inputs,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                model = %self.model,
                "Embedding request failed"
            );
            return Err(AppError::Embedding(format!(
                "embedding server returned status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        Self::into_vectors(parsed, inputs.len())
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
