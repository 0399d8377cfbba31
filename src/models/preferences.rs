use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::Movie;

/// Wire value the questionnaire sends when the user has no runtime limit
pub const NO_DURATION_LIMIT: i64 = 999;

/// Runtime ceiling requested by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum DurationLimit {
    /// No runtime constraint
    #[default]
    Unlimited,
    /// Runtime must be at most this many minutes
    AtMost(u32),
}

impl DurationLimit {
    /// Returns the ceiling in minutes, if any
    pub fn minutes(&self) -> Option<u32> {
        match self {
            DurationLimit::Unlimited => None,
            DurationLimit::AtMost(minutes) => Some(*minutes),
        }
    }
}

impl TryFrom<i64> for DurationLimit {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == NO_DURATION_LIMIT {
            return Ok(DurationLimit::Unlimited);
        }
        if value < 0 {
            return Err(format!(
                "duration must be a non-negative number of minutes, got {}",
                value
            ));
        }
        u32::try_from(value)
            .map(DurationLimit::AtMost)
            .map_err(|_| format!("duration is out of range, got {}", value))
    }
}

impl From<DurationLimit> for i64 {
    fn from(limit: DurationLimit) -> Self {
        match limit {
            DurationLimit::Unlimited => NO_DURATION_LIMIT,
            DurationLimit::AtMost(minutes) => i64::from(minutes),
        }
    }
}

/// Categorical flags a user can ask results to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceTag {
    Trending,
    Classic,
    HiddenGems,
}

impl PreferenceTag {
    /// Checks the corresponding boolean flag on a movie
    pub fn matches(&self, movie: &Movie) -> bool {
        match self {
            PreferenceTag::Trending => movie.is_trending,
            PreferenceTag::Classic => movie.is_classic,
            PreferenceTag::HiddenGems => movie.is_hidden_gem,
        }
    }
}

impl Display for PreferenceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferenceTag::Trending => write!(f, "trending"),
            PreferenceTag::Classic => write!(f, "classic"),
            PreferenceTag::HiddenGems => write!(f, "hidden_gems"),
        }
    }
}

/// Questionnaire answers for a single recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceQuery {
    pub mood: String,
    /// Who the user is watching with; not used for ranking
    #[serde(default)]
    pub watching_with: Option<String>,
    /// Audience age range; not used for ranking
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub duration: DurationLimit,
    #[serde(default, alias = "preferences")]
    pub tags: Vec<PreferenceTag>,
}

impl PreferenceQuery {
    /// Creates a query with no constraints besides the mood
    pub fn new(mood: impl Into<String>) -> Self {
        Self {
            mood: mood.into(),
            watching_with: None,
            age_range: None,
            genres: Vec::new(),
            language: None,
            duration: DurationLimit::Unlimited,
            tags: Vec::new(),
        }
    }

    /// Language constraint, ignoring an absent or blank value
    ///
    /// A non-blank value is compared as sent.
    pub fn language_constraint(&self) -> Option<&str> {
        self.language
            .as_deref()
            .filter(|language| !language.trim().is_empty())
    }
}

/// Response body for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub movies: Vec<Movie>,
}
