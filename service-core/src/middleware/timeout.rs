use crate::error::AppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;

/// Bounds the whole request, body read included.
///
/// On expiry the handler future is dropped and the client gets a 408 with
/// the usual `{ error, details }` envelope.
pub async fn request_timeout_middleware(
    State(timeout): State<Duration>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    match tokio::time::timeout(timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, %uri, ?timeout, "Request timed out");
            AppError::Timeout(anyhow::anyhow!(
                "request did not complete within {:?}",
                timeout
            ))
            .into_response()
        }
    }
}
