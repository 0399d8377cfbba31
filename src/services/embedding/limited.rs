use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{
    error::{AppError, AppResult},
    services::embedding::EmbeddingProvider,
};

/// Bounds the number of concurrent calls into an embedding provider
///
/// With a limit of 1 calls are serialized, which is required for providers
/// wrapping a model that is not safe under concurrent use. The permit is
/// released when the encode future completes or is dropped, so a request
/// timeout never leaves it held.
pub struct ConcurrencyLimitedEmbedder<P> {
    inner: P,
    permits: Arc<Semaphore>,
    limit: usize,
}

impl<P: EmbeddingProvider> ConcurrencyLimitedEmbedder<P> {
    pub fn new(inner: P, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            inner,
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[async_trait::async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for ConcurrencyLimitedEmbedder<P> {
    async fn encode(&self, text: &str) -> AppResult<Vec<f32>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AppError::Internal(format!("Embedding limiter closed: {}", e)))?;

        self.inner.encode(text).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
