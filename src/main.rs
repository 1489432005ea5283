mod config;
mod db;
mod entities;
mod error;
mod extract;
mod importer;
mod models;
mod movies;
mod routes;
mod test_support;
mod tmdb;
mod users;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::Config, error::AppResult, importer::CatalogImporter, movies::MovieService,
    tmdb::TmdbClient, users::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub movies: MovieService,
    pub catalog: CatalogImporter,
}

impl AppState {
    pub fn new(config: &Config, db: DatabaseConnection) -> AppResult<Self> {
        let tmdb = TmdbClient::new(
            TmdbClient::http_client()?,
            config.tmdb_access_token.clone(),
            config.tmdb_base_url.clone(),
        );
        let movies = MovieService::new(db.clone());

        Ok(Self {
            users: UserService::new(db),
            catalog: CatalogImporter::new(movies.clone(), Arc::new(tmdb)),
            movies,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,reelbase=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let state = Arc::new(AppState::new(&config, db)?);

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
