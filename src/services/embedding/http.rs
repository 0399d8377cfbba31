//! OpenAI-compatible embeddings API provider
//!
//! Works against any server exposing `POST /v1/embeddings` (text-embeddings-
//! inference, Ollama, vLLM, OpenAI). The model must be the same one the
//! enrichment job used for movie descriptions, or similarities are meaningless.

use crate::{
    error::{AppError, AppResult},
    services::embedding::EmbeddingProvider,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
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
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn parse_response(response: EmbeddingResponse) -> AppResult<Vec<f32>> {
        let vector = response
            .data
            .into_iter()
            .min_by_key(|item| item.index)
            .map(|item| item.embedding)
            .ok_or_else(|| {
                AppError::Embedding("Embedding response contained no vectors".to_string())
            })?;

        if vector.is_empty() {
            return Err(AppError::Embedding(
                "Embedding response contained an empty vector".to_string(),
            ));
        }

        Ok(vector)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    #[instrument(skip(self), fields(model = %self.model))]
    async fn encode(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::Embedding(
                "Cannot embed an empty text".to_string(),
            ));
        }

        let url = format!("{}/v1/embeddings", self.api_url);
        let mut request = self.http_client.post(&url).json(&EmbeddingRequest {
            model: &self.model,
            input: [text],
        });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "Embedding API returned status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let vector = Self::parse_response(parsed)?;

        tracing::debug!(
            model = %self.model,
            dimensions = vector.len(),
            provider = self.name(),
            "Query text embedded"
        );

        Ok(vector)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
