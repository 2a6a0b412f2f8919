use crate::config::MenuConfig;
use crate::handlers;
use crate::services::{DocumentStore, MongoDb};
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, MethodRouter},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, metrics_middleware, request_id_middleware, request_timeout_middleware,
};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: MenuConfig,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: MenuConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }
}

/// The public API. Every path behaves the same; only the method matters.
pub fn api_router(state: AppState) -> Router {
    let request_timeout: Duration = state.config.common.request_timeout();
    let body_limit = state.config.common.body_limit_bytes;

    let menu: MethodRouter<AppState> = get(handlers::list_menu_items)
        .post(handlers::create_menu_item)
        .fallback(handlers::hello_world);

    Router::new()
        .route("/", menu.clone())
        .route("/*path", menu)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(request_timeout, request_timeout_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Health checks and the Prometheus scrape target, kept off the API listener.
pub fn ops_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .with_state(state)
}

pub struct Application {
    port: u16,
    ops_port: u16,
    api_listener: TcpListener,
    ops_listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: MenuConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb).await.map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(e.into())
        })?;

        Self::build_with_store(config, Arc::new(db)).await
    }

    pub async fn build_with_store(
        config: MenuConfig,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, AppError> {
        // Port 0 binds an ephemeral port (tests)
        let addr = config.common.api_addr();
        let api_listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = api_listener.local_addr()?.port();

        let ops_addr = config.common.ops_addr();
        let ops_listener = TcpListener::bind(ops_addr).await.map_err(|e| {
            tracing::error!("Failed to bind ops listener to {}: {}", ops_addr, e);
            AppError::from(e)
        })?;
        let ops_port = ops_listener.local_addr()?.port();

        tracing::info!(
            "Server running at http://{}:{}/ (ops on port {})",
            config.common.host,
            port,
            ops_port
        );

        Ok(Self {
            port,
            ops_port,
            api_listener,
            ops_listener,
            state: AppState::new(config, store),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn ops_port(&self) -> u16 {
        self.ops_port
    }

    /// Serves both listeners until `shutdown` resolves, drains in-flight
    /// requests, then closes the store's connection pool.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown.await;
            tracing::info!("Shutdown signal received");
            let _ = stop_tx.send(true);
        });

        let api_server = axum::serve(self.api_listener, api_router(self.state.clone()))
            .with_graceful_shutdown(stopped(stop_rx.clone()));
        let ops_server = axum::serve(self.ops_listener, ops_router(self.state.clone()))
            .with_graceful_shutdown(stopped(stop_rx));

        let outcome = tokio::try_join!(api_server.into_future(), ops_server.into_future());
        if let Err(e) = &outcome {
            tracing::error!("HTTP server error: {}", e);
        }

        self.state.store.shutdown().await;
        outcome.map(|_| ())
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }
}

async fn stopped(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
