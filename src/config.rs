//! Point policy constants and storage table configuration

use std::time::Duration;

/// Upper bound a balance may reach through charging.
pub const MAX_POINT: i64 = 100_000;

/// Smallest amount a single use may spend.
pub const MIN_USE_POINT: i64 = 100;

/// Simulated access latency for the in-memory tables.
///
/// Each read or write sleeps a random duration in `[0, max]`. Zero disables
/// the sleep entirely, which is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableConfig {
    pub max_read_latency: Duration,
    pub max_write_latency: Duration,
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn throttled(max_read_latency: Duration, max_write_latency: Duration) -> Self {
        Self {
            max_read_latency,
            max_write_latency,
        }
    }
}
