use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Db(DbErr),
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found."))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) | AppError::Db(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                AppError::Conflict(format!("Record already exists: {detail}"))
            },
            _ => AppError::Db(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }

        let body = match &self {
            AppError::Db(_) | AppError::Other(_) => json!({
                "detail": "Internal server error",
                "error": self.to_string(),
            }),
            AppError::Upstream(_) => json!({
                "detail": "Error communicating with external service",
                "error": self.to_string(),
            }),
            _ => json!({ "detail": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
