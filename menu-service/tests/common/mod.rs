#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use menu_service::config::MenuConfig;
use menu_service::services::{DocumentStore, StoreError};
use menu_service::startup::{api_router, AppState};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceExt;

/// In-process stand-in for the MongoDB collection.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<Document>>,
    shut_down: AtomicBool,
}

impl MemoryStore {
    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, document: Document) -> Result<Bson, StoreError> {
        let id = document
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));

        let mut stored = doc! { "_id": id.clone() };
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }

        self.documents.lock().await.push(stored);
        Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents.lock().await.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

/// A store whose every operation times out.
pub struct FailingStore;

#[async_trait::async_trait]
impl DocumentStore for FailingStore {
    async fn insert_one(&self, _document: Document) -> Result<Bson, StoreError> {
        Err(timeout("insert_one"))
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        Err(timeout("find"))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(timeout("ping"))
    }

    async fn shutdown(&self) {}
}

fn timeout(operation: &'static str) -> StoreError {
    StoreError::Timeout {
        operation,
        timeout: Duration::from_millis(50),
    }
}

/// Config that binds ephemeral ports on loopback.
pub fn test_config() -> MenuConfig {
    let mut config = MenuConfig::default();
    config.common.port = 0;
    config.common.ops_port = 0;
    config.common.request_timeout_secs = 5;
    config
}

pub fn app_with_store(store: Arc<dyn DocumentStore>) -> Router {
    api_router(AppState::new(test_config(), store))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("Response body is not UTF-8")
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .expect("Missing content-type header")
            .to_str()
            .expect("Invalid content-type")
    }
}

pub async fn send(app: &Router, method: &str, uri: &str, body: impl Into<Body>) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request");

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn is_object_id_hex(value: &serde_json::Value) -> bool {
    value
        .as_str()
        .map(|s| s.len() == 24 && s.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}
