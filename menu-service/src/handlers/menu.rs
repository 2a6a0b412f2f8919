use crate::models::{render_document, render_id, MenuItem};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub destination: Value,
}

/// POST: stores the body as a new document and answers with its identifier.
pub async fn create_menu_item(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map_err(|rejection| {
        let details = anyhow::anyhow!(rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(details)
        } else {
            AppError::InvalidBody(details)
        }
    })?;

    let item = MenuItem::from_json_slice(&body).map_err(|e| AppError::InvalidBody(e.into()))?;

    let inserted_id = state
        .store
        .insert_one(item.into_document())
        .await
        .map_err(|e| AppError::DatabaseError(e.into()))?;

    let destination = render_id(inserted_id);
    tracing::info!(destination = %destination, "Menu item stored");

    Ok((StatusCode::CREATED, Json(CreatedResponse { destination })))
}

/// GET: every stored document, unfiltered.
pub async fn list_menu_items(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let documents = state
        .store
        .find_all()
        .await
        .map_err(|e| AppError::InternalError(e.into()))?;

    tracing::debug!(count = documents.len(), "Listed menu items");

    let items: Vec<Value> = documents.into_iter().map(render_document).collect();
    Ok(Json(items))
}

/// Any other method.
pub async fn hello_world() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "Hello World")
}
