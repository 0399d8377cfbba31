use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use flick_api::{
    config::Config,
    db::{
        create_pool, create_redis_client, Cache, CacheWriterHandle, InMemoryMovieStore,
        MovieStore, PgMovieStore,
    },
    routes::{create_router, AppState},
    services::{
        embedding::{CachedEmbedder, ConcurrencyLimitedEmbedder, HttpEmbeddingProvider},
        EmbeddingProvider, RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flick_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = build_store(&config).await?;
    tracing::info!(store = store.name(), "Movie store ready");

    let (embedder, cache_handle) = build_embedder(&config)?;
    tracing::info!(
        provider = embedder.name(),
        cached = cache_handle.is_some(),
        "Embedding provider ready"
    );

    let engine = RecommendationEngine::new(store, embedder);
    let state = Arc::new(AppState::new(
        engine,
        Duration::from_millis(config.recommendation_timeout_ms),
    ));

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Serves a JSON fixture from memory when configured, PostgreSQL otherwise
async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn MovieStore>> {
    if let Some(path) = &config.movies_fixture {
        let json = tokio::fs::read_to_string(path).await?;
        let store = InMemoryMovieStore::from_json(&json)?.with_order(config.candidate_order);
        tracing::info!(path = %path, movies = store.len(), "Loaded movie fixture");
        return Ok(Arc::new(store));
    }

    let pool = create_pool(&config.database_url).await?;
    Ok(Arc::new(PgMovieStore::new(pool, config.candidate_order)))
}

/// HTTP provider behind the concurrency limit, with the Redis cache in front
/// when `REDIS_URL` is set
fn build_embedder(
    config: &Config,
) -> anyhow::Result<(Arc<dyn EmbeddingProvider>, Option<CacheWriterHandle>)> {
    let http = HttpEmbeddingProvider::new(
        config.embedding_api_url.clone(),
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
        Duration::from_millis(config.embedding_timeout_ms),
    )?;
    let model = http.model().to_string();
    let limited = ConcurrencyLimitedEmbedder::new(http, config.embedding_max_concurrency);
    tracing::info!(
        model = %model,
        max_concurrency = limited.limit(),
        "Embedding provider configured"
    );

    let Some(redis_url) = &config.redis_url else {
        return Ok((Arc::new(limited), None));
    };

    let client = create_redis_client(redis_url)?;
    let (cache, handle) = Cache::new(client);
    let cached = CachedEmbedder::new(
        limited,
        cache,
        model,
        config.embedding_cache_ttl_secs,
    );

    Ok((Arc::new(cached), Some(handle)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
