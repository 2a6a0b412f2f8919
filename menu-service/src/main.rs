use menu_service::config::MenuConfig;
use menu_service::services::init_metrics;
use menu_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MenuConfig::load()?;

    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics()?;
    init_tracing(
        "menu-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        e
    })?;

    app.run_until_stopped().await?;
    tracing::info!("menu-service stopped");

    Ok(())
}
