//! Movie corpus abstraction
//!
//! The recommendation engine only needs a filtered read over the corpus. Stores
//! return matches in their natural order, capped at `limit`; the engine never
//! assumes that order is stable across calls.

use serde::Deserialize;

use crate::{error::AppResult, models::Movie};

/// Conjunctive filter over the movie corpus
///
/// A `None` / empty clause is not applied. A filter with no clauses matches
/// the entire corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    /// Language must equal this code
    pub language: Option<String>,
    /// Runtime must be at most this many minutes (movies without a runtime never match)
    pub max_duration: Option<u32>,
    /// Genre set must intersect this set
    pub genres: Vec<String>,
}

impl MovieFilter {
    /// Returns true if no clause is set
    pub fn is_unconstrained(&self) -> bool {
        self.language.is_none() && self.max_duration.is_none() && self.genres.is_empty()
    }

    /// Evaluates the filter against a single movie
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(language) = &self.language {
            if movie.language.as_deref() != Some(language.as_str()) {
                return false;
            }
        }

        if let Some(max_duration) = self.max_duration {
            match movie.duration {
                Some(duration) if i64::from(duration) <= i64::from(max_duration) => {}
                _ => return false,
            }
        }

        if !self.genres.is_empty() && !movie.shares_genre_with(&self.genres) {
            return false;
        }

        true
    }
}

/// Order in which a store yields candidates before the retrieval cap applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrder {
    /// Storage insertion order
    #[default]
    Insertion,
    /// Ascending external movie id
    MovieId,
}

/// Trait for movie stores
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    /// Fetch at most `limit` movies matching `filter`
    async fn find(&self, filter: &MovieFilter, limit: usize) -> AppResult<Vec<Movie>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
