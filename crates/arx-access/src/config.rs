use serde::{Deserialize, Serialize};

use arx_types::{Amount, DAY_SECS};

/// Tunable parameters of the access engine.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Price of one day of subscription extension, in base units.
    pub rate_per_day: Amount,
    /// How close to expiry, in seconds, the notification check starts
    /// answering `true`.
    pub notice_window_secs: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            rate_per_day: Amount::new(100_000),
            notice_window_secs: 7 * DAY_SECS,
        }
    }
}
