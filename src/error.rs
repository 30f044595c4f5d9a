use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced by request handlers and the database layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("only {remaining} seat(s) left, {requested} requested")]
    SoldOut { requested: i64, remaining: i64 },

    /// Admin session missing or expired; `next` is where to return after login.
    #[error("login required")]
    Unauthorized { next: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::SoldOut { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized { .. } => StatusCode::FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Ids are integers; a segment that doesn't parse names no resource.
impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized { next } => {
                let location = crate::urls::login_redirect(&next);
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
            AppError::Database(ref e) => {
                error!("Database error while handling request: {}", e);
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (other.status(), body).into_response()
            }
        }
    }
}
