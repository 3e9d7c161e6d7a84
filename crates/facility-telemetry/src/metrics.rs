//! Prometheus metrics for the weighbridge runtime.
//!
//! All metrics follow the naming convention: `wb_<area>_<metric>_<unit>`
//!
//! Metrics are updated whether or not they have been registered; registration
//! only makes them visible to [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SESSION METRICS
    // =========================================================================

    pub static ref SESSIONS_STARTED: IntCounter = IntCounter::new(
        "wb_sessions_started_total",
        "Weighing sessions opened for a detected truck"
    ).expect("metric creation failed");

    pub static ref SESSIONS_COMPLETED: IntCounter = IntCounter::new(
        "wb_sessions_completed_total",
        "Weighing sessions that reached COMPLETED"
    ).expect("metric creation failed");

    pub static ref SESSIONS_CANCELLED: IntCounter = IntCounter::new(
        "wb_sessions_cancelled_total",
        "Weighing sessions that escaped to CANCELLED"
    ).expect("metric creation failed");

    pub static ref ACTIVE_SESSIONS: IntGauge = IntGauge::new(
        "wb_sessions_active",
        "Non-terminal weighing sessions"
    ).expect("metric creation failed");

    pub static ref ARRIVALS_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("wb_arrivals_rejected_total", "Detected trucks refused a session"),
        &["reason"]  // reason: not_planned/quota_blocked
    ).expect("metric creation failed");

    pub static ref NET_WEIGHED_TONS: Counter = Counter::new(
        "wb_net_weighed_tons_total",
        "Net weight of completed sessions in tons"
    ).expect("metric creation failed");

    // =========================================================================
    // TICKET METRICS
    // =========================================================================

    pub static ref TICKETS_ISSUED: IntCounter = IntCounter::new(
        "wb_tickets_issued_total",
        "Ticket numbers handed out by the sequence allocator"
    ).expect("metric creation failed");

    pub static ref TICKET_HIGH_WATER: IntGauge = IntGauge::new(
        "wb_ticket_high_water",
        "Highest ticket number issued"
    ).expect("metric creation failed");

    // =========================================================================
    // BRIDGE METRICS
    // =========================================================================

    pub static ref BRIDGE_OCCUPIED: IntGauge = IntGauge::new(
        "wb_bridge_occupied",
        "1 while a session holds the weighbridge"
    ).expect("metric creation failed");

    pub static ref BRIDGE_QUEUE_DEPTH: IntGauge = IntGauge::new(
        "wb_bridge_queue_depth",
        "Sessions waiting for the weighbridge"
    ).expect("metric creation failed");

    // =========================================================================
    // RECONCILIATION METRICS
    // =========================================================================

    pub static ref TRANSFERS: IntCounterVec = IntCounterVec::new(
        Opts::new("wb_transfers_total", "Historical transfer attempts by outcome"),
        &["outcome"]  // outcome: confirmed/duplicate/deferred/integrity_violation
    ).expect("metric creation failed");

    pub static ref SWEEP_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "wb_reconciliation_sweep_duration_seconds",
            "Time spent in one reconciliation sweep"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0])
    ).expect("metric creation failed");

    pub static ref SWEEP_FAILURE_STREAK: IntGauge = IntGauge::new(
        "wb_reconciliation_failure_streak",
        "Consecutive sweeps that deferred at least one transfer"
    ).expect("metric creation failed");
}

/// Keeps the registry alive for the lifetime of the application.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with [`REGISTRY`]. Calling it twice is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Sessions
        Box::new(SESSIONS_STARTED.clone()),
        Box::new(SESSIONS_COMPLETED.clone()),
        Box::new(SESSIONS_CANCELLED.clone()),
        Box::new(ACTIVE_SESSIONS.clone()),
        Box::new(ARRIVALS_REJECTED.clone()),
        Box::new(NET_WEIGHED_TONS.clone()),
        // Tickets
        Box::new(TICKETS_ISSUED.clone()),
        Box::new(TICKET_HIGH_WATER.clone()),
        // Bridge
        Box::new(BRIDGE_OCCUPIED.clone()),
        Box::new(BRIDGE_QUEUE_DEPTH.clone()),
        // Reconciliation
        Box::new(TRANSFERS.clone()),
        Box::new(SWEEP_DURATION.clone()),
        Box::new(SWEEP_FAILURE_STREAK.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Render all registered metrics in the Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Count one historical transfer attempt.
pub fn record_transfer(outcome: &str) {
    TRANSFERS.with_label_values(&[outcome]).inc();
}

/// Count one refused arrival.
pub fn record_arrival_rejected(reason: &str) {
    ARRIVALS_REJECTED.with_label_values(&[reason]).inc();
}

/// Publish the bridge occupancy snapshot.
pub fn set_bridge_state(occupied: bool, queue_depth: usize) {
    BRIDGE_OCCUPIED.set(i64::from(occupied));
    BRIDGE_QUEUE_DEPTH.set(queue_depth as i64);
}
