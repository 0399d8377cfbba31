use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::{
    db::{CandidateOrder, MovieFilter, MovieStore},
    error::AppResult,
    models::Movie,
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const SELECT_MOVIES: &str = r#"
    SELECT
        movie_id,
        title,
        year,
        poster_url,
        backdrop_url,
        rating,
        duration,
        COALESCE(genres, '{}') AS genres,
        description,
        language,
        COALESCE(streaming_on, '{}') AS streaming_on,
        COALESCE(is_classic, false) AS is_classic,
        COALESCE(is_hidden_gem, false) AS is_hidden_gem,
        COALESCE(is_trending, false) AS is_trending,
        description_embedding AS embedding
    FROM movies
"#;

/// Movie store backed by the `movies` table
///
/// Genres and embeddings are Postgres arrays (`TEXT[]`, `REAL[]`); `id` is the
/// internal surrogate key and is never exposed.
#[derive(Clone)]
pub struct PgMovieStore {
    pool: PgPool,
    order: CandidateOrder,
}

impl PgMovieStore {
    pub fn new(pool: PgPool, order: CandidateOrder) -> Self {
        Self { pool, order }
    }

    /// Builds the filtered, ordered, limited SELECT for a filter
    fn build_query(&self, filter: &MovieFilter, limit: usize) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(SELECT_MOVIES);
        let mut has_clause = false;

        let mut push_conjunction = |query: &mut QueryBuilder<'static, Postgres>| {
            query.push(if has_clause { " AND " } else { " WHERE " });
            has_clause = true;
        };

        if let Some(language) = &filter.language {
            push_conjunction(&mut query);
            query.push("language = ").push_bind(language.clone());
        }

        if let Some(max_duration) = filter.max_duration {
            push_conjunction(&mut query);
            query
                .push("duration <= ")
                .push_bind(i64::from(max_duration));
        }

        if !filter.genres.is_empty() {
            push_conjunction(&mut query);
            query.push("genres && ").push_bind(filter.genres.clone());
        }

        query.push(match self.order {
            CandidateOrder::Insertion => " ORDER BY id",
            CandidateOrder::MovieId => " ORDER BY movie_id",
        });

        query
            .push(" LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));

        query
    }
}

#[async_trait::async_trait]
impl MovieStore for PgMovieStore {
    async fn find(&self, filter: &MovieFilter, limit: usize) -> AppResult<Vec<Movie>> {
        let mut query = self.build_query(filter, limit);
        let movies = query.build_query_as::<Movie>().fetch_all(&self.pool).await?;

        tracing::debug!(
            store = self.name(),
            count = movies.len(),
            "Fetched candidate movies"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
