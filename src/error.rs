use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("movie {0} not found")]
    NotFound(i32),

    #[error("{0}")]
    Conflict(String),

    #[error("movie search failed: {0}")]
    ExternalService(reqwest::Error),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<reqwest::Error> for AppError {
    /// Request URLs can carry the TMDB `api_key`, so they never reach messages or logs.
    fn from(err: reqwest::Error) -> Self {
        Self::ExternalService(err.without_url())
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Maps unique-index violations to `Conflict`, everything else stays a database error.
    pub fn from_write(err: DbErr, conflict: impl FnOnce() -> String) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(detail = %detail, "unique constraint violated");
                Self::Conflict(conflict())
            },
            _ => Self::Database(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::BAD_GATEWAY => {
                tracing::error!(error = %self, "movie search failed");
                "The movie search service is unavailable. Please try again later.".to_string()
            },
            s if s.is_server_error() => {
                tracing::error!(error = %self, "request failed");
                "Something went wrong on our side.".to_string()
            },
            _ => self.to_string(),
        };
        let body = crate::templates::error_page(status, message);
        (status, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
