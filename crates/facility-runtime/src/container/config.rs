//! # Facility Configuration
//!
//! One struct per subsystem, all with defaults, overridable from `WB_*`
//! environment variables. Telemetry reads its own variables.

use serde::{Deserialize, Serialize};
use tracing::warn;
use wb_01_ticket_sequence::SequenceConfig;
use wb_05_reconciliation::ReconciliationConfig;

/// Complete facility configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityConfig {
    pub sequence: SequenceConfig,
    pub reconciliation: ReconciliationConfig,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Attempt the historical transfer as soon as a session completes.
    pub fast_path_transfer: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fast_path_transfer: true,
        }
    }
}

impl FacilityConfig {
    /// Low ticket base and a fast sweep.
    pub fn for_testing() -> Self {
        Self {
            sequence: SequenceConfig::for_testing(),
            reconciliation: ReconciliationConfig::for_testing(),
            orchestrator: OrchestratorConfig::default(),
        }
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `WB_*` overrides from `lookup`. Unparsable values are logged
    /// and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = parse(&lookup, "WB_TICKET_BASE") {
            self.sequence.base = base;
        }

        let r = &self.reconciliation;
        let interval = parse(&lookup, "WB_SWEEP_INTERVAL_MS").unwrap_or(r.interval_ms);
        let batch = parse(&lookup, "WB_SWEEP_BATCH").unwrap_or(r.batch_size);
        let max_backoff = parse(&lookup, "WB_SWEEP_MAX_BACKOFF_MS").unwrap_or(r.max_backoff_ms);
        let jitter = parse::<u32>(&lookup, "WB_SWEEP_JITTER_PCT")
            .map_or(r.jitter_pct, |pct| f64::from(pct) / 100.0);
        self.reconciliation = ReconciliationConfig::new(interval, batch, max_backoff, jitter);

        if let Some(raw) = lookup("WB_FAST_PATH_TRANSFER") {
            self.orchestrator.fast_path_transfer = !matches!(raw.to_lowercase().as_str(), "false" | "0" | "no");
        }
    }
}

fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable configuration value");
            None
        }
    }
}
