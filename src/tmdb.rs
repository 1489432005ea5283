use std::time::Duration;

use jiff::civil::Date;
use reqwest::{RequestBuilder, StatusCode, header::ACCEPT};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::MovieCreate,
};

/// Every outbound catalog call gives up after this long; nothing is retried.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TmdbClient {
    client: reqwest::Client,
    access_token: Option<String>,
    base_url: String,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, access_token: Option<String>, base_url: String) -> Self {
        if access_token.is_none() {
            tracing::warn!("no TMDB_ACCESS_TOKEN provided; import and search will fail");
        }

        Self { client, access_token, base_url }
    }

    pub fn http_client() -> AppResult<reqwest::Client> {
        Self::http_client_with_timeout(REQUEST_TIMEOUT)
    }

    /// The timeout lives on the client so every request inherits it.
    pub fn http_client_with_timeout(timeout: Duration) -> AppResult<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent("reelbase/0.1")
            .timeout(timeout)
            .build()?;
        Ok(client)
    }

    /// Fails with Internal before any network work when no token is configured.
    fn ensure_configured(&self) -> AppResult<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| AppError::Internal("TMDB access token not configured.".to_string()))
    }

    fn get(&self, path: &str) -> AppResult<RequestBuilder> {
        let token = self.ensure_configured()?;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        Ok(self.client.get(url).bearer_auth(token).header(ACCEPT, "application/json"))
    }

    pub async fn movie(&self, tmdb_id: i32) -> AppResult<TmdbMovie> {
        let resp = self.get(&format!("movie/{tmdb_id}"))?.send().await?;
        if resp.status() != StatusCode::OK {
            tracing::debug!(tmdb_id, status = %resp.status(), "catalog movie lookup failed");
            return Err(AppError::NotFound("TMDB movie not found.".to_string()));
        }
        Ok(resp.json().await?)
    }

    pub async fn popular(&self, page: u32) -> AppResult<Vec<TmdbMovie>> {
        let resp = self.get("movie/popular")?.query(&[("page", page)]).send().await?;
        if resp.status() != StatusCode::OK {
            tracing::debug!(page, status = %resp.status(), "catalog popular listing failed");
            return Err(AppError::BadRequest(
                "Failed to fetch popular movies from TMDB.".to_string(),
            ));
        }
        let listing: PopularResponse = resp.json().await?;
        Ok(listing.results)
    }

    /// Raw search payload, passed through untouched.
    pub async fn search(&self, query: &str) -> AppResult<serde_json::Value> {
        let resp = self.get("search/movie")?.query(&[("query", query)]).send().await?;
        if resp.status() != StatusCode::OK {
            tracing::debug!(query, status = %resp.status(), "catalog search failed");
            return Err(AppError::BadRequest("Failed to search TMDB.".to_string()));
        }
        Ok(resp.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct PopularResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

/// The subset of a catalog movie we store. Detail records carry `genres`,
/// listing items carry `genre_ids`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TmdbMovie {
    pub id: i32,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TmdbGenre {
    pub id: i32,
}

impl TmdbMovie {
    pub fn into_create(self) -> MovieCreate {
        let genre_ids = if self.genres.is_empty() {
            self.genre_ids
        } else {
            self.genres.iter().map(|g| g.id).collect()
        };

        MovieCreate {
            tmdb_id: Some(self.id),
            title: self.title.filter(|t| !t.is_empty()).unwrap_or_else(|| "Untitled".to_string()),
            overview: Some(self.overview.unwrap_or_default()),
            release_date: self.release_date.as_deref().and_then(|s| s.parse::<Date>().ok()),
            genre_ids: Some(format_genre_ids(&genre_ids)),
            vote_average: Some(self.vote_average.unwrap_or(0.0)),
            vote_count: Some(self.vote_count.unwrap_or(0)),
            poster_path: Some(self.poster_path.unwrap_or_default()),
            backdrop_path: Some(self.backdrop_path.unwrap_or_default()),
        }
    }
}

/// Renders ids as `[12, 878, 28]`.
fn format_genre_ids(ids: &[i32]) -> String {
    let joined = ids.iter().map(i32::to_string).collect::<Vec<_>>().join(", ");
    format!("[{joined}]")
}
