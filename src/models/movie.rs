use serde::{Deserialize, Serialize};

/// A movie record from the corpus
///
/// Records are populated by the offline import and enrichment jobs; the
/// recommendation engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Stable external identifier (MovieLens id), not the storage key
    #[serde(rename = "movie_id")]
    pub movie_id: i64,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Runtime in minutes
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub streaming_on: Vec<String>,
    #[serde(default)]
    pub is_classic: bool,
    #[serde(default)]
    pub is_hidden_gem: bool,
    #[serde(default)]
    pub is_trending: bool,
    /// Description embedding, present once enrichment has run
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
}

impl Movie {
    /// Creates a bare movie with no optional attributes set
    pub fn new(movie_id: i64, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
            year: None,
            poster_url: None,
            backdrop_url: None,
            rating: None,
            duration: None,
            genres: Vec::new(),
            description: None,
            language: None,
            streaming_on: Vec::new(),
            is_classic: false,
            is_hidden_gem: false,
            is_trending: false,
            embedding: None,
        }
    }

    /// Rating used for non-semantic ordering; a missing rating counts as 0
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Returns true if the movie carries a non-empty embedding
    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Checks whether any of the movie's genres appears in `genres`
    pub fn shares_genre_with(&self, genres: &[String]) -> bool {
        self.genres.iter().any(|g| genres.contains(g))
    }
}
