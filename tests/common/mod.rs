#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum_test::TestServer;

use flick_api::{
    db::InMemoryMovieStore,
    error::{AppError, AppResult},
    models::Movie,
    routes::{create_router, AppState},
    services::{EmbeddingProvider, RecommendationEngine},
};

/// Deterministic embedder returning a fixed vector per text
///
/// Unknown texts get the default vector. Every encoded text is recorded.
pub struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    default: Vec<f32>,
    calls: Mutex<Vec<String>>,
}

impl StubEmbedder {
    pub fn constant(vector: Vec<f32>) -> Self {
        Self {
            vectors: HashMap::new(),
            default: vector,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn encode(&self, text: &str) -> AppResult<Vec<f32>> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Embedder that always fails, as an unreachable embeddings API would
pub struct FailingEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn encode(&self, _text: &str) -> AppResult<Vec<f32>> {
        Err(AppError::Embedding("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Embedder that never answers within any reasonable timeout
pub struct SlowEmbedder(pub Duration);

#[async_trait::async_trait]
impl EmbeddingProvider for SlowEmbedder {
    async fn encode(&self, _text: &str) -> AppResult<Vec<f32>> {
        tokio::time::sleep(self.0).await;
        Ok(vec![1.0, 0.0])
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

/// Builder for corpus movies
pub struct MovieBuilder(Movie);

impl MovieBuilder {
    pub fn new(movie_id: i64) -> Self {
        Self(Movie::new(movie_id, format!("Movie {}", movie_id)))
    }

    pub fn language(mut self, language: &str) -> Self {
        self.0.language = Some(language.to_string());
        self
    }

    pub fn duration(mut self, minutes: i32) -> Self {
        self.0.duration = Some(minutes);
        self
    }

    pub fn genres(mut self, genres: &[&str]) -> Self {
        self.0.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.0.rating = Some(rating);
        self
    }

    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.0.embedding = Some(embedding);
        self
    }

    pub fn classic(mut self) -> Self {
        self.0.is_classic = true;
        self
    }

    pub fn trending(mut self) -> Self {
        self.0.is_trending = true;
        self
    }

    pub fn hidden_gem(mut self) -> Self {
        self.0.is_hidden_gem = true;
        self
    }

    pub fn build(self) -> Movie {
        self.0
    }
}

/// Unit vector in the plane at the given angle in degrees from the x axis
pub fn at_angle(degrees: f32) -> Vec<f32> {
    let radians = degrees.to_radians();
    vec![radians.cos(), radians.sin()]
}

pub fn ids(movies: &[Movie]) -> Vec<i64> {
    movies.iter().map(|m| m.movie_id).collect()
}

pub fn engine(movies: Vec<Movie>, embedder: Arc<dyn EmbeddingProvider>) -> RecommendationEngine {
    RecommendationEngine::new(Arc::new(InMemoryMovieStore::new(movies)), embedder)
}

pub fn test_server(movies: Vec<Movie>, embedder: Arc<dyn EmbeddingProvider>) -> TestServer {
    test_server_with_timeout(movies, embedder, Duration::from_secs(10))
}

pub fn test_server_with_timeout(
    movies: Vec<Movie>,
    embedder: Arc<dyn EmbeddingProvider>,
    timeout: Duration,
) -> TestServer {
    let state = Arc::new(AppState::new(engine(movies, embedder), timeout));
    TestServer::new(create_router(state)).unwrap()
}
