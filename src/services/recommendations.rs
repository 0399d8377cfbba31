use std::sync::Arc;
use std::time::Instant;

use crate::{
    db::MovieStore,
    error::AppResult,
    models::{Movie, PreferenceQuery},
    services::{
        candidates::retrieve_candidates,
        embedding::EmbeddingProvider,
        ranking::{filter_by_tags, rank_by_rating, rank_by_similarity, truncate_results},
    },
};

/// Builds the text embedded for a query
///
/// Must stay byte-for-byte compatible with the text used when the ranking was
/// tuned: `"<mood> feeling movie in genres: <genres lower-cased, space-joined>"`.
pub fn query_text(query: &PreferenceQuery) -> String {
    let genres = query.genres.join(" ").to_lowercase();
    format!("{} feeling movie in genres: {}", query.mood, genres)
}

/// Which ranking path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingPath {
    /// Ordered by cosine similarity to the query embedding
    Similarity,
    /// Embedding-bearing subset in retrieval order (query embedding failed)
    Unranked,
    /// No candidate had an embedding; ordered by rating
    Rating,
}

/// Generates movie recommendations from questionnaire answers
///
/// Pipeline per request:
/// 1. Retrieve up to 500 candidates matching language, runtime and genres
/// 2. If any candidate has an embedding, rank those by similarity to the
///    embedded query text; otherwise rank all candidates by rating
/// 3. Keep movies carrying any requested tag
/// 4. Return the top 12
///
/// Only store failures fail the request. Embedding and scoring failures
/// degrade to retrieval order and are logged.
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn MovieStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn MovieStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Returns at most 12 recommended movies, best first
    pub async fn recommend(&self, query: &PreferenceQuery) -> AppResult<Vec<Movie>> {
        self.recommend_with_path(query)
            .await
            .map(|(movies, _)| movies)
    }

    /// Like [`Self::recommend`], also reporting which ranking path ran
    pub async fn recommend_with_path(
        &self,
        query: &PreferenceQuery,
    ) -> AppResult<(Vec<Movie>, Option<RankingPath>)> {
        let start = Instant::now();

        let candidates = retrieve_candidates(self.store.as_ref(), query).await?;
        tracing::info!(
            candidates = candidates.len(),
            "Candidates retrieved"
        );

        if candidates.is_empty() {
            return Ok((Vec::new(), None));
        }

        let (ranked, path) = if candidates.iter().any(Movie::has_embedding) {
            self.rank_semantically(query, candidates).await
        } else {
            tracing::warn!(
                candidates = candidates.len(),
                "No candidate movies have embeddings, ranking by rating"
            );
            (rank_by_rating(candidates), RankingPath::Rating)
        };

        let filtered = filter_by_tags(ranked, &query.tags);
        if !query.tags.is_empty() {
            let tags: Vec<String> = query.tags.iter().map(ToString::to_string).collect();
            tracing::debug!(
                tags = %tags.join(","),
                remaining = filtered.len(),
                "Applied tag filter"
            );
        }

        let results = truncate_results(filtered);

        tracing::info!(
            results = results.len(),
            path = ?path,
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendations generated"
        );

        Ok((results, Some(path)))
    }

    /// Ranks the embedding-bearing candidates by similarity to the query
    ///
    /// Candidates without an embedding are dropped.
    async fn rank_semantically(
        &self,
        query: &PreferenceQuery,
        candidates: Vec<Movie>,
    ) -> (Vec<Movie>, RankingPath) {
        let with_embeddings: Vec<Movie> = candidates
            .into_iter()
            .filter(Movie::has_embedding)
            .collect();

        let text = query_text(query);
        tracing::debug!(
            text = %text,
            candidates = with_embeddings.len(),
            provider = self.embedder.name(),
            "Embedding query"
        );

        match self.embedder.encode(&text).await {
            Ok(vector) => (rank_by_similarity(&vector, with_embeddings), RankingPath::Similarity),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = self.embedder.name(),
                    "Query embedding failed, keeping retrieval order"
                );
                (with_embeddings, RankingPath::Unranked)
            }
        }
    }
}
