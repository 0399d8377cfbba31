use crate::{
    db::{MovieFilter, MovieStore},
    error::AppResult,
    models::{Movie, PreferenceQuery},
};

/// Maximum number of candidates fetched for ranking
///
/// Bounds the cost of scoring. Which movies make the cut depends on the
/// store's ordering (see `CandidateOrder`).
pub const MAX_CANDIDATES: usize = 500;

/// Translates questionnaire answers into a corpus filter
pub fn build_filter(query: &PreferenceQuery) -> MovieFilter {
    MovieFilter {
        language: query.language_constraint().map(str::to_string),
        max_duration: query.duration.minutes(),
        genres: query.genres.clone(),
    }
}

/// Fetches the bounded candidate set for a query
///
/// Store failures propagate unchanged; they are fatal to the request.
pub async fn retrieve_candidates(
    store: &dyn MovieStore,
    query: &PreferenceQuery,
) -> AppResult<Vec<Movie>> {
    let filter = build_filter(query);

    tracing::debug!(
        store = store.name(),
        language = ?filter.language,
        max_duration = ?filter.max_duration,
        genres = ?filter.genres,
        "Retrieving candidates"
    );

    let mut candidates = store.find(&filter, MAX_CANDIDATES).await?;
    // The cap holds even if a store ignores the limit
    candidates.truncate(MAX_CANDIDATES);

    Ok(candidates)
}
