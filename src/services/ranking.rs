use thiserror::Error;

use crate::models::{Movie, PreferenceTag};

/// Maximum number of recommendations returned per request
pub const MAX_RESULTS: usize = 12;

/// Error types for similarity scoring
#[derive(Debug, Error, PartialEq)]
pub enum RankingError {
    #[error("Embedding dimension mismatch for movie {movie_id}: expected {expected}, got {got}")]
    DimensionMismatch {
        movie_id: i64,
        expected: usize,
        got: usize,
    },
}

/// Cosine similarity of two vectors
///
/// Returns `None` when the lengths differ or either vector has zero magnitude
/// (or the result is not finite), in which case similarity is undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return None;
    }

    let similarity = dot / denominator;
    similarity.is_finite().then_some(similarity)
}

/// Scores each movie against the query vector
///
/// Movies must all carry embeddings. An undefined similarity scores
/// `f32::NEG_INFINITY` so the movie ranks last. Any length mismatch fails the
/// whole batch.
pub fn similarity_scores(query: &[f32], movies: &[Movie]) -> Result<Vec<f32>, RankingError> {
    movies
        .iter()
        .map(|movie| {
            let embedding = movie.embedding.as_deref().unwrap_or_default();
            if embedding.len() != query.len() {
                return Err(RankingError::DimensionMismatch {
                    movie_id: movie.movie_id,
                    expected: query.len(),
                    got: embedding.len(),
                });
            }
            Ok(cosine_similarity(query, embedding).unwrap_or(f32::NEG_INFINITY))
        })
        .collect()
}

/// Orders movies by similarity to the query vector, most similar first
///
/// The sort is stable: equal scores keep their input order. If scoring fails
/// the movies are returned in their input order.
pub fn rank_by_similarity(query: &[f32], movies: Vec<Movie>) -> Vec<Movie> {
    let scores = match similarity_scores(query, &movies) {
        Ok(scores) => scores,
        Err(e) => {
            tracing::warn!(error = %e, "Similarity scoring failed, keeping retrieval order");
            return movies;
        }
    };

    let mut scored: Vec<(f32, Movie)> = scores.into_iter().zip(movies).collect();
    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    scored.into_iter().map(|(_, movie)| movie).collect()
}

/// Orders movies by rating, highest first, treating a missing rating as 0
///
/// The sort is stable: equal ratings keep their input order.
pub fn rank_by_rating(mut movies: Vec<Movie>) -> Vec<Movie> {
    movies.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()));
    movies
}

/// Keeps movies carrying at least one of the requested tags
///
/// An empty tag list keeps everything. Order is preserved.
pub fn filter_by_tags(movies: Vec<Movie>, tags: &[PreferenceTag]) -> Vec<Movie> {
    if tags.is_empty() {
        return movies;
    }

    movies
        .into_iter()
        .filter(|movie| tags.iter().any(|tag| tag.matches(movie)))
        .collect()
}

/// Caps the list at [`MAX_RESULTS`]
pub fn truncate_results(mut movies: Vec<Movie>) -> Vec<Movie> {
    movies.truncate(MAX_RESULTS);
    movies
}
