use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::AppResult,
    extract::{PathParam, QueryParams, ValidatedJson},
    models::{
        MovieCreate, MovieListQuery, MovieRead, MovieUpdate, PopularQuery, UserCreate, UserRead,
        UserUpdate,
    },
};

type AppStateRef = State<Arc<AppState>>;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/users", get(list_users).post(register_user))
        .route("/users/", get(list_users).post(register_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/", get(list_movies).post(create_movie))
        .route("/movies/{id}", get(get_movie).put(update_movie).delete(delete_movie))
        .route("/movies/import/popular", post(import_popular))
        .route("/movies/import/{tmdb_id}", post(import_movie))
        .route("/movies/search/{query}", get(search_catalog));

    Router::new()
        .nest("/api", api)
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn register_user(
    State(state): AppStateRef,
    ValidatedJson(input): ValidatedJson<UserCreate>,
) -> AppResult<(StatusCode, Json<UserRead>)> {
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn list_users(State(state): AppStateRef) -> AppResult<Json<Vec<UserRead>>> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserRead::from).collect()))
}

async fn get_user(
    State(state): AppStateRef,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<UserRead>> {
    Ok(Json(state.users.get(id).await?.into()))
}

async fn update_user(
    State(state): AppStateRef,
    PathParam(id): PathParam<i32>,
    ValidatedJson(patch): ValidatedJson<UserUpdate>,
) -> AppResult<Json<UserRead>> {
    Ok(Json(state.users.update(id, patch).await?.into()))
}

async fn delete_user(
    State(state): AppStateRef,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    state.users.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_movie(
    State(state): AppStateRef,
    ValidatedJson(input): ValidatedJson<MovieCreate>,
) -> AppResult<(StatusCode, Json<MovieRead>)> {
    let movie = state.movies.create(input).await?;
    Ok((StatusCode::CREATED, Json(movie.into())))
}

async fn list_movies(
    State(state): AppStateRef,
    QueryParams(q): QueryParams<MovieListQuery>,
) -> AppResult<Json<Vec<MovieRead>>> {
    let movies = state.movies.list(&q).await?;
    Ok(Json(movies.into_iter().map(MovieRead::from).collect()))
}

async fn get_movie(
    State(state): AppStateRef,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<MovieRead>> {
    Ok(Json(state.movies.get(id).await?.into()))
}

async fn update_movie(
    State(state): AppStateRef,
    PathParam(id): PathParam<i32>,
    ValidatedJson(patch): ValidatedJson<MovieUpdate>,
) -> AppResult<Json<MovieRead>> {
    Ok(Json(state.movies.update(id, patch).await?.into()))
}

async fn delete_movie(
    State(state): AppStateRef,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    state.movies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_popular(
    State(state): AppStateRef,
    QueryParams(q): QueryParams<PopularQuery>,
) -> AppResult<(StatusCode, Json<Vec<MovieRead>>)> {
    let movies = state.catalog.import_popular(q.page).await?;
    Ok((StatusCode::CREATED, Json(movies.into_iter().map(MovieRead::from).collect())))
}

async fn import_movie(
    State(state): AppStateRef,
    PathParam(tmdb_id): PathParam<i32>,
) -> AppResult<(StatusCode, Json<MovieRead>)> {
    let movie = state.catalog.import_by_id(tmdb_id).await?;
    Ok((StatusCode::CREATED, Json(movie.into())))
}

async fn search_catalog(
    State(state): AppStateRef,
    PathParam(query): PathParam<String>,
) -> AppResult<Json<serde_json::Value>> {
    Ok(Json(state.catalog.search(&query).await?))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::test_state;

    async fn app() -> anyhow::Result<Router> {
        Ok(router(test_state("http://127.0.0.1:9", None).await?))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let resp = app.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, value))
    }

    #[tokio::test]
    async fn movie_crud_round_trip() -> anyhow::Result<()> {
        let app = app().await?;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/movies/",
            Some(json!({"title": "Test Movie 1", "tmdb_id": 12346})),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["title"], "Test Movie 1");
        let id = body["id"].as_i64().unwrap_or_default();
        let uri = format!("/api/movies/{id}");

        let (status, body) = send(&app, Method::GET, &uri, None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Test Movie 1");

        let (status, body) =
            send(&app, Method::PUT, &uri, Some(json!({"title": "Updated Movie"}))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Updated Movie");
        assert_eq!(body["tmdb_id"], 12346);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await?;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, &uri, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Movie not found.");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_tmdb_id_is_bad_request() -> anyhow::Result<()> {
        let app = app().await?;
        let movie = json!({"title": "Fight Club", "tmdb_id": 550});

        let (status, _) = send(&app, Method::POST, "/api/movies/", Some(movie.clone())).await?;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::POST, "/api/movies/", Some(movie)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Movie with this TMDB ID already exists.");
        Ok(())
    }

    #[tokio::test]
    async fn movie_list_filters_by_query() -> anyhow::Result<()> {
        let app = app().await?;
        for (title, rating) in [("Fight Club", 8.4), ("Fighting Spirit", 6.1), ("Se7en", 8.3)] {
            let movie = json!({"title": title, "vote_average": rating});
            send(&app, Method::POST, "/api/movies/", Some(movie)).await?;
        }

        let (status, body) =
            send(&app, Method::GET, "/api/movies/?title=FIGHT&min_rating=8.3", None).await?;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<_> =
            body.as_array().into_iter().flatten().map(|m| m["title"].clone()).collect();
        assert_eq!(titles, [json!("Fight Club")]);
        Ok(())
    }

    #[tokio::test]
    async fn user_lifecycle() -> anyhow::Result<()> {
        let app = app().await?;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/users/",
            Some(json!({"username": "testuser1", "email": "test1@example.com", "full_name": "Test User"})),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["is_active"], true);
        let uri = format!("/api/users/{}", body["id"]);

        let (status, body) =
            send(&app, Method::PUT, &uri, Some(json!({"full_name": "Updated Name"}))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_name"], "Updated Name");
        assert_eq!(body["username"], "testuser1");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await?;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, &uri, None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_active"], false);

        let (status, body) = send(&app, Method::GET, "/api/users", None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_email_is_unprocessable() -> anyhow::Result<()> {
        let app = app().await?;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/users/",
            Some(json!({"username": "bad", "email": "not-an-email"})),
        )
        .await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_path_and_query_are_unprocessable() -> anyhow::Result<()> {
        let app = app().await?;

        let (status, body) = send(&app, Method::GET, "/api/movies/abc", None).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, body) = send(&app, Method::GET, "/api/movies/?min_rating=high", None).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, _) =
            send(&app, Method::POST, "/api/movies/import/popular?page=-1", None).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }

    #[tokio::test]
    async fn empty_title_is_unprocessable() -> anyhow::Result<()> {
        let app = app().await?;

        let (status, body) =
            send(&app, Method::POST, "/api/movies/", Some(json!({"title": ""}))).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn imported_movie_resolves_without_token() -> anyhow::Result<()> {
        let app = app().await?;
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/movies/",
            Some(json!({"title": "Fight Club", "tmdb_id": 550})),
        )
        .await?;

        let (status, body) = send(&app, Method::POST, "/api/movies/import/550", None).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], created["id"]);
        Ok(())
    }

    #[tokio::test]
    async fn catalog_routes_need_a_token() -> anyhow::Result<()> {
        let app = app().await?;

        let (status, body) = send(&app, Method::POST, "/api/movies/import/550", None).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "TMDB access token not configured.");

        let (status, _) = send(&app, Method::POST, "/api/movies/import/popular?page=2", None).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&app, Method::GET, "/api/movies/search/fight", None).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_catalog_is_bad_gateway() -> anyhow::Result<()> {
        let app = router(test_state("http://127.0.0.1:9", Some("token")).await?);

        let (status, body) = send(&app, Method::GET, "/api/movies/search/fight", None).await?;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["detail"], "Error communicating with external service");
        assert!(body["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn favicon_is_empty() -> anyhow::Result<()> {
        let (status, _) = send(&app().await?, Method::GET, "/favicon.ico", None).await?;
        assert_eq!(status, StatusCode::NO_CONTENT);
        Ok(())
    }
}
