//! Prometheus export for the ops listener's `/metrics` route.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, OnceLock};

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Initialize the metrics recorder.
///
/// Call once at startup before any metrics are recorded. Later calls are
/// no-ops, so test binaries may call it from every test.
pub fn init_metrics() -> Result<(), metrics_exporter_prometheus::BuildError> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}
