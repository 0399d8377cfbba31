//! Text embedding abstraction
//!
//! The recommendation engine treats the embedding model as an opaque
//! capability: text in, fixed-length vector out. Providers compose: the HTTP
//! provider does the work, [`CachedEmbedder`] and [`ConcurrencyLimitedEmbedder`]
//! wrap any provider.

use crate::error::AppResult;

pub mod cached;
pub mod http;
pub mod limited;

pub use cached::CachedEmbedder;
pub use http::HttpEmbeddingProvider;
pub use limited::ConcurrencyLimitedEmbedder;

/// Trait for text embedding providers
///
/// Implementations must be safe to call from many requests at once. A provider
/// backed by a stateful model that is not reentrant should be wrapped in a
/// [`ConcurrencyLimitedEmbedder`] with a limit of 1.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Encode a non-empty text into a vector
    async fn encode(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for std::sync::Arc<P> {
    async fn encode(&self, text: &str) -> AppResult<Vec<f32>> {
        (**self).encode(text).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
