//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::ScorecastError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ScorecastError> for ServerError {
    fn from(err: ScorecastError) -> Self {
        match err {
            ScorecastError::NotFound(msg) => ServerError::NotFound(msg),
            ScorecastError::Validation(msg) | ScorecastError::Processing(msg) => {
                ServerError::BadRequest(msg)
            }
            other => ServerError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        if status == StatusCode::BAD_REQUEST {
            tracing::warn!(detail = %message, "request failed");
        }

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_mapping() {
        let err: ServerError = ScorecastError::NotFound("x".into()).into();
        assert!(matches!(err, ServerError::NotFound(_)));

        let err: ServerError = ScorecastError::Validation("x".into()).into();
        assert!(matches!(err, ServerError::BadRequest(_)));

        let err: ServerError = ScorecastError::Processing("x".into()).into();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }
}
