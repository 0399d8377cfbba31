pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use memory::InMemoryMovieStore;
pub use postgres::{create_pool, PgMovieStore};
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::{CandidateOrder, MovieFilter, MovieStore};

#[cfg(test)]
pub use store::MockMovieStore;
