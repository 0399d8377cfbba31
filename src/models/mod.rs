pub mod movie;
pub mod preferences;

pub use movie::Movie;
pub use preferences::{
    DurationLimit, PreferenceQuery, PreferenceTag, RecommendationResponse, NO_DURATION_LIMIT,
};
