pub mod database;
pub mod metrics;

pub use database::{DocumentStore, MongoDb, StoreError};
pub use metrics::{get_metrics, init_metrics};
