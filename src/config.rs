use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb_base_url: String,
    /// Only import and search need this; it is checked per call, not at startup.
    pub tmdb_access_token: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "8000".to_string()).parse().context("PORT")?;

        let database_url = database_url(|key| std::env::var(key).ok())?;

        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());

        let tmdb_access_token = std::env::var("TMDB_ACCESS_TOKEN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb_base_url,
            tmdb_access_token,
        })
    }
}

/// `DATABASE_URL`, falling back to the legacy `STRCNX` name.
fn database_url(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    ["DATABASE_URL", "STRCNX"]
        .into_iter()
        .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        .context("DATABASE_URL (or STRCNX) must be set")
}
