//! Configuration for the ticket sequence.

use serde::{Deserialize, Serialize};

/// First ticket issued on a facility with no history.
pub const DEFAULT_TICKET_BASE: u64 = 58_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Lowest ticket number the allocator may return.
    pub base: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_TICKET_BASE,
        }
    }
}

impl SequenceConfig {
    /// Small base so test assertions stay readable.
    pub fn for_testing() -> Self {
        Self { base: 1 }
    }

    /// High-water mark implied by the base alone.
    #[must_use]
    pub fn floor(&self) -> u64 {
        self.base.saturating_sub(1)
    }
}
