use std::sync::Arc;

use tracing::{debug, info};

use crate::{entities::movie, error::AppResult, movies::MovieService, tmdb::TmdbClient};

/// Create-if-absent import of catalog movies, keyed by TMDB id. Existing rows
/// are returned as stored and never refreshed.
#[derive(Clone)]
pub struct CatalogImporter {
    movies: MovieService,
    tmdb: Arc<TmdbClient>,
}

impl CatalogImporter {
    pub fn new(movies: MovieService, tmdb: Arc<TmdbClient>) -> Self {
        Self { movies, tmdb }
    }

    /// A stored row is returned before the credential is consulted, so known ids
    /// resolve even without a token.
    pub async fn import_by_id(&self, tmdb_id: i32) -> AppResult<movie::Model> {
        if let Some(existing) = self.movies.find_by_tmdb_id(tmdb_id).await? {
            debug!(tmdb_id, movie_id = existing.id, "movie already imported");
            return Ok(existing);
        }

        let fetched = self.tmdb.movie(tmdb_id).await?;
        let created = self.movies.create(fetched.into_create()).await?;

        info!(tmdb_id, movie_id = created.id, "imported movie");
        Ok(created)
    }

    /// Items are committed one at a time; an error stops the loop but keeps
    /// whatever was already stored.
    pub async fn import_popular(&self, page: u32) -> AppResult<Vec<movie::Model>> {
        let listing = self.tmdb.popular(page).await?;
        debug!(page, results = listing.len(), "fetched popular listing");

        let mut out = Vec::with_capacity(listing.len());
        let mut created = 0usize;
        for item in listing {
            if let Some(existing) = self.movies.find_by_tmdb_id(item.id).await? {
                debug!(tmdb_id = item.id, movie_id = existing.id, "movie already imported");
                out.push(existing);
                continue;
            }

            out.push(self.movies.create(item.into_create()).await?);
            created += 1;
        }

        info!(page, total = out.len(), created, "imported popular movies");
        Ok(out)
    }

    pub async fn search(&self, query: &str) -> AppResult<serde_json::Value> {
        self.tmdb.search(query).await
    }
}
