use crate::{
    db::{CandidateOrder, MovieFilter, MovieStore},
    error::AppResult,
    models::Movie,
};

/// Vector-backed movie store
///
/// Evaluates filters in process. Used for local runs from a JSON fixture and
/// as the corpus in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMovieStore {
    movies: Vec<Movie>,
    order: CandidateOrder,
}

impl InMemoryMovieStore {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            movies,
            order: CandidateOrder::Insertion,
        }
    }

    pub fn with_order(mut self, order: CandidateOrder) -> Self {
        self.order = order;
        self
    }

    /// Loads a JSON array of movies, as exported by the import scripts
    pub fn from_json(json: &str) -> AppResult<Self> {
        let movies: Vec<Movie> = serde_json::from_str(json).map_err(|e| {
            crate::error::AppError::InvalidInput(format!("Invalid movie fixture: {}", e))
        })?;
        Ok(Self::new(movies))
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[async_trait::async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn find(&self, filter: &MovieFilter, limit: usize) -> AppResult<Vec<Movie>> {
        let mut matching: Vec<&Movie> = self.movies.iter().filter(|m| filter.matches(m)).collect();

        if self.order == CandidateOrder::MovieId {
            matching.sort_by_key(|m| m.movie_id);
        }

        Ok(matching.into_iter().take(limit).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
