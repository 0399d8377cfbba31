pub mod candidates;
pub mod embedding;
pub mod ranking;
pub mod recommendations;

pub use embedding::EmbeddingProvider;
pub use recommendations::{query_text, RankingPath, RecommendationEngine};
