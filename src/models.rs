use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::entities::{movie, user};

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

fn timestamp_from_secs(secs: i64) -> Timestamp {
    Timestamp::from_second(secs).unwrap_or_default()
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserRead {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: Timestamp,
    pub is_active: bool,
}

impl From<user::Model> for UserRead {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            full_name: m.full_name,
            created_at: timestamp_from_secs(m.created_at),
            is_active: m.is_active,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct MovieCreate {
    pub tmdb_id: Option<i32>,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<Date>,
    pub genre_ids: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

/// Partial movie update. Nullable columns use a double option so `null` clears them.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MovieUpdate {
    #[serde(default, deserialize_with = "double_option")]
    pub tmdb_id: Option<Option<i32>>,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub overview: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub release_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option")]
    pub genre_ids: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub vote_average: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub vote_count: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub poster_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub backdrop_path: Option<Option<String>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MovieRead {
    pub id: i32,
    pub tmdb_id: Option<i32>,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<Date>,
    pub genre_ids: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub created_at: Timestamp,
}

impl From<movie::Model> for MovieRead {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            tmdb_id: m.tmdb_id,
            title: m.title,
            overview: m.overview,
            release_date: m.release_date.as_deref().and_then(|s| s.parse().ok()),
            genre_ids: m.genre_ids,
            vote_average: m.vote_average,
            vote_count: m.vote_count,
            poster_path: m.poster_path,
            backdrop_path: m.backdrop_path,
            created_at: timestamp_from_secs(m.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MovieListQuery {
    pub title: Option<String>,
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    10
}

impl Default for MovieListQuery {
    fn default() -> Self {
        Self { title: None, min_rating: None, skip: 0, limit: default_limit() }
    }
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}
