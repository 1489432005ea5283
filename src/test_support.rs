#![cfg(test)]

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::{AppState, config::Config, db};

/// Fresh in-memory database. One pooled connection so every query sees the same schema.
pub async fn test_db() -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    db::prepare(&db).await?;
    Ok(db)
}

pub fn test_config(tmdb_base_url: &str, token: Option<&str>) -> Config {
    Config {
        addr: "127.0.0.1:0".parse().expect("addr"),
        database_url: "sqlite::memory:".to_string(),
        tmdb_base_url: tmdb_base_url.to_string(),
        tmdb_access_token: token.map(str::to_string),
    }
}

pub async fn test_state(tmdb_base_url: &str, token: Option<&str>) -> anyhow::Result<Arc<AppState>> {
    let db = test_db().await?;
    let config = test_config(tmdb_base_url, token);
    Ok(Arc::new(AppState::new(&config, db)?))
}
