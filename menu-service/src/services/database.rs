use crate::config::MongoConfig;
use async_trait::async_trait;
use futures::TryStreamExt;
use metrics::counter;
use mongodb::{
    bson::{doc, Bson, Document},
    options::ClientOptions,
    Client as MongoClient, Collection, Database,
};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

/// The document collection the handlers read from and write to.
///
/// Implementations hold a pooled client; callers borrow it per request and
/// never open or close connections themselves.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts one document and returns the identifier the store assigned.
    async fn insert_one(&self, document: Document) -> Result<Bson, StoreError>;

    /// Every document in the collection, in store order.
    async fn find_all(&self) -> Result<Vec<Document>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Releases pooled connections. Called once when the process stops.
    async fn shutdown(&self);
}

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collection: String,
    operation_timeout: Duration,
}

impl MongoDb {
    /// Builds the pooled client. Connections are opened lazily, so an
    /// unreachable server surfaces on the first operation rather than here.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        tracing::info!(uri = %config.uri, "Connecting to MongoDB");
        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string {}: {}", config.uri, e);
            e
        })?;
        options.app_name = Some("menu-service".to_string());
        options.server_selection_timeout = Some(config.server_selection_timeout());
        options.connect_timeout = Some(config.server_selection_timeout());
        options.max_pool_size = Some(config.max_pool_size);

        let client = MongoClient::with_options(options)?;
        let db = client.database(&config.database);
        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB client ready"
        );

        Ok(Self {
            client,
            db,
            collection: config.collection.clone(),
            operation_timeout: config.operation_timeout(),
        })
    }

    pub fn menu_items(&self) -> Collection<Document> {
        self.db.collection(&self.collection)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, mongodb::error::Error>>,
    {
        let result = match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout {
                operation,
                timeout: self.operation_timeout,
            }),
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        counter!("store_operations_total", "operation" => operation, "outcome" => outcome)
            .increment(1);

        if let Err(e) = &result {
            tracing::error!(operation, collection = %self.collection, "MongoDB operation failed: {}", e);
        }
        result
    }
}

#[async_trait]
impl DocumentStore for MongoDb {
    async fn insert_one(&self, document: Document) -> Result<Bson, StoreError> {
        let collection = self.menu_items();
        let result = self
            .bounded("insert_one", collection.insert_one(document, None))
            .await?;
        Ok(result.inserted_id)
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        let collection = self.menu_items();
        self.bounded("find", async {
            let cursor = collection.find(None, None).await?;
            cursor.try_collect::<Vec<Document>>().await
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let admin = self.client.database("admin");
        self.bounded("ping", admin.run_command(doc! { "ping": 1 }, None))
            .await?;
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::info!("Closing MongoDB connection pool");
        self.client.clone().shutdown().await;
    }
}
