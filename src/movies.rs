use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
    sea_query::{Expr, Func},
};
use tracing::debug;

use crate::{
    db::now_sec,
    entities::movie,
    error::{AppError, AppResult},
    models::{MovieCreate, MovieListQuery, MovieUpdate},
};

const DUPLICATE_TMDB_ID: &str = "Movie with this TMDB ID already exists.";

#[derive(Clone)]
pub struct MovieService {
    db: DatabaseConnection,
}

impl MovieService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: MovieCreate) -> AppResult<movie::Model> {
        if let Some(tmdb_id) = input.tmdb_id {
            if self.find_by_tmdb_id(tmdb_id).await?.is_some() {
                return Err(AppError::Conflict(DUPLICATE_TMDB_ID.to_string()));
            }
        }

        let model = movie::ActiveModel {
            id: Default::default(),
            tmdb_id: Set(input.tmdb_id),
            title: Set(input.title),
            overview: Set(input.overview),
            release_date: Set(input.release_date.map(|d| d.to_string())),
            genre_ids: Set(input.genre_ids),
            vote_average: Set(input.vote_average),
            vote_count: Set(input.vote_count),
            poster_path: Set(input.poster_path),
            backdrop_path: Set(input.backdrop_path),
            created_at: Set(now_sec()),
        };
        let created = model.insert(&self.db).await?;

        debug!(
            movie_id = created.id,
            tmdb_id = ?created.tmdb_id,
            title = %created.title,
            "created movie"
        );
        Ok(created)
    }

    pub async fn list(&self, q: &MovieListQuery) -> AppResult<Vec<movie::Model>> {
        let mut query = movie::Entity::find();

        if let Some(title) = q.title.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", title.to_lowercase());
            let lowered = Func::lower(Expr::col(movie::Column::Title));
            query = query.filter(Expr::expr(lowered).like(pattern));
        }
        if let Some(min_rating) = q.min_rating {
            query = query.filter(movie::Column::VoteAverage.gte(min_rating));
        }

        let movies = query
            .order_by_asc(movie::Column::Id)
            .offset(q.skip)
            .limit(q.limit)
            .all(&self.db)
            .await?;

        debug!(count = movies.len(), title = ?q.title, min_rating = ?q.min_rating, "listed movies");
        Ok(movies)
    }

    pub async fn get(&self, id: i32) -> AppResult<movie::Model> {
        movie::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Movie"))
    }

    pub async fn find_by_tmdb_id(&self, tmdb_id: i32) -> AppResult<Option<movie::Model>> {
        let found = movie::Entity::find()
            .filter(movie::Column::TmdbId.eq(tmdb_id))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn update(&self, id: i32, patch: MovieUpdate) -> AppResult<movie::Model> {
        let existing = self.get(id).await?;

        if let Some(Some(tmdb_id)) = patch.tmdb_id {
            let clash = movie::Entity::find()
                .filter(movie::Column::TmdbId.eq(tmdb_id))
                .filter(movie::Column::Id.ne(id))
                .one(&self.db)
                .await?;
            if clash.is_some() {
                return Err(AppError::Conflict(DUPLICATE_TMDB_ID.to_string()));
            }
        }

        let mut model: movie::ActiveModel = existing.into();
        if let Some(tmdb_id) = patch.tmdb_id {
            model.tmdb_id = Set(tmdb_id);
        }
        if let Some(title) = patch.title {
            model.title = Set(title);
        }
        if let Some(overview) = patch.overview {
            model.overview = Set(overview);
        }
        if let Some(release_date) = patch.release_date {
            model.release_date = Set(release_date.map(|d| d.to_string()));
        }
        if let Some(genre_ids) = patch.genre_ids {
            model.genre_ids = Set(genre_ids);
        }
        if let Some(vote_average) = patch.vote_average {
            model.vote_average = Set(vote_average);
        }
        if let Some(vote_count) = patch.vote_count {
            model.vote_count = Set(vote_count);
        }
        if let Some(poster_path) = patch.poster_path {
            model.poster_path = Set(poster_path);
        }
        if let Some(backdrop_path) = patch.backdrop_path {
            model.backdrop_path = Set(backdrop_path);
        }

        if !model.is_changed() {
            return self.get(id).await;
        }
        let updated = model.update(&self.db).await?;

        debug!(movie_id = id, "updated movie");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("Movie"));
        }

        debug!(movie_id = id, "deleted movie");
        Ok(())
    }
}
