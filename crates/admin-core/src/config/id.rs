//! Distributed ID allocator configuration.

use serde::{Deserialize, Serialize};

/// Largest machine id representable in the 10-bit machine field.
pub const MAX_MACHINE_ID: u16 = 1023;

/// Upper bound on `max_clock_regression_ms`. The wait blocks the calling
/// thread, which is a tokio worker when ids are allocated from a handler.
pub const MAX_CLOCK_REGRESSION_MS: u64 = 1_000;

/// Snowflake allocator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdConfig {
    /// Machine id embedded in every generated id (0..=1023).
    #[serde(default = "default_machine_id")]
    pub machine_id: u16,
    /// Custom epoch in Unix milliseconds.
    #[serde(default = "default_epoch")]
    pub epoch_ms: i64,
    /// Backward clock jumps up to this many milliseconds are waited out;
    /// larger ones fail the allocation. Capped at [`MAX_CLOCK_REGRESSION_MS`].
    #[serde(default = "default_max_regression")]
    pub max_clock_regression_ms: u64,
    /// Never hand out ids that are zero or a multiple of 1000.
    #[serde(default)]
    pub avoid_round_ids: bool,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            machine_id: default_machine_id(),
            epoch_ms: default_epoch(),
            max_clock_regression_ms: default_max_regression(),
            avoid_round_ids: false,
        }
    }
}

fn default_machine_id() -> u16 {
    1
}

fn default_epoch() -> i64 {
    1_577_836_800_000
}

fn default_max_regression() -> u64 {
    10
}
