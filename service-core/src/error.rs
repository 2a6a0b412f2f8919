use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure of a single request, rendered as an `{ error, details }` JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid JSON body: {0}")]
    InvalidBody(anyhow::Error),

    #[error("Database operation failed: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(anyhow::Error),

    #[error("Request timeout: {0}")]
    Timeout(anyhow::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::DatabaseError(_) | AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn envelope(&self) -> ErrorResponse {
        let (error, err) = match self {
            AppError::InvalidBody(err) => ("Invalid JSON body", err),
            AppError::PayloadTooLarge(err) => ("Payload too large", err),
            AppError::Timeout(err) => ("Request timeout", err),
            AppError::DatabaseError(err) => ("Database operation failed", err),
            AppError::InternalError(err) => ("Server error", err),
            AppError::ServiceUnavailable(err) => ("Service unavailable", err),
            AppError::ConfigError(err) => ("Configuration error", err),
        };

        // `{:#}` keeps the context chain on one line
        let mut details = format!("{:#}", err);
        if details.is_empty() {
            details = error.to_string();
        }

        ErrorResponse {
            error: error.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        (status, Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn database_error_uses_operation_envelope() {
        let (status, body) = render(AppError::DatabaseError(anyhow::anyhow!(
            "server selection timeout"
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database operation failed");
        assert_eq!(body["details"], "server selection timeout");
    }

    #[tokio::test]
    async fn internal_error_renders_server_error() {
        let (status, body) = render(AppError::InternalError(anyhow::anyhow!("cursor died"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server error");
        assert_eq!(body["details"], "cursor died");
    }

    #[tokio::test]
    async fn invalid_body_is_a_client_error() {
        let (status, body) = render(AppError::InvalidBody(anyhow::anyhow!(
            "expected value at line 1 column 1"
        )))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON body");
        assert_eq!(body["details"], "expected value at line 1 column 1");
    }

    #[tokio::test]
    async fn timeout_is_a_json_408() {
        let (status, body) = render(AppError::Timeout(anyhow::anyhow!(
            "request did not complete within 1s"
        )))
        .await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["error"], "Request timeout");
        assert_eq!(body["details"], "request did not complete within 1s");
    }

    #[tokio::test]
    async fn details_are_never_empty() {
        let (_, body) = render(AppError::ServiceUnavailable(anyhow::anyhow!(""))).await;

        assert_eq!(body["error"], "Service unavailable");
        assert_eq!(body["details"], "Service unavailable");
    }

    #[test]
    fn context_chain_is_kept_in_details() {
        let err = anyhow::anyhow!("connection refused").context("insert_one failed");
        let envelope = AppError::DatabaseError(err).envelope();

        assert_eq!(envelope.details, "insert_one failed: connection refused");
    }
}
