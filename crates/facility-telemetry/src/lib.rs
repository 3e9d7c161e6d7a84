//! # Facility Telemetry
//!
//! Observability for the weighbridge runtime.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, human-readable
//!   in development and JSON when shipped to a log collector.
//! - **Metrics**: Prometheus counters and gauges for sessions, tickets, bridge
//!   queue depth and historical-transfer outcomes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use facility_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WB_SERVICE_NAME` | `weighbridge` | Service name attached to logs |
//! | `WB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `WB_JSON_LOGS` | `false` (`true` in containers) | JSON log output |
//! | `WB_CONSOLE_OUTPUT` | `true` | Disable to silence stdout |
//! | `WB_SITE` | `default` | Facility site label |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics, MetricsHandle};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize log subscriber: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    logging::init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        site = %config.site,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}

/// Structured log line with a component field.
///
/// ```rust,ignore
/// log_event!(info, "reconciliation", "Sweep finished", confirmed = 3);
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Structured log line for a session, carrying the standard session fields.
#[macro_export]
macro_rules! log_session_event {
    ($level:ident, $msg:expr, $session_id:expr, $truck_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            session_id = %$session_id,
            truck_id = %$truck_id,
            $($($field)*,)?
            $msg
        )
    };
}
