pub mod metrics;
pub mod timeout;
pub mod tracing;

pub use metrics::metrics_middleware;
pub use timeout::request_timeout_middleware;
pub use tracing::{REQUEST_ID_HEADER, make_request_span, request_id_middleware};
