use crate::{
    db::{Cache, CacheKey},
    error::AppResult,
    services::embedding::EmbeddingProvider,
};

/// Redis-backed cache in front of an embedding provider
///
/// Query texts repeat heavily (they are built from a handful of questionnaire
/// answers), so vectors are cached per `(model, text)`. Cache failures never
/// fail an encode; the inner provider is called instead.
pub struct CachedEmbedder<P> {
    inner: P,
    cache: Cache,
    model: String,
    ttl: u64,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    pub fn new(inner: P, cache: Cache, model: impl Into<String>, ttl: u64) -> Self {
        Self {
            inner,
            cache,
            model: model.into(),
            ttl,
        }
    }

    fn key(&self, text: &str) -> CacheKey {
        CacheKey::QueryEmbedding {
            model: self.model.clone(),
            text: text.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    async fn encode(&self, text: &str) -> AppResult<Vec<f32>> {
        let key = self.key(text);

        match self.cache.get_from_cache::<Vec<f32>>(&key).await {
            Ok(Some(vector)) => {
                tracing::debug!(key = %key, "Query embedding cache hit");
                return Ok(vector);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Query embedding cache unavailable, bypassing");
            }
        }

        let vector = self.inner.encode(text).await?;
        self.cache.set_in_background(&key, &vector, self.ttl);

        Ok(vector)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
