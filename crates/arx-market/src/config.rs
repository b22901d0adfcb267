use serde::{Deserialize, Serialize};

/// Tunable parameters of the auction engine.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Trailing window, in seconds, inside which a qualifying bid extends
    /// the auction instead of letting it expire under contest.
    pub snipe_window_secs: u64,
    /// How far a qualifying late bid pushes the end time, in seconds.
    pub snipe_extension_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            snipe_window_secs: 900,
            snipe_extension_secs: 900,
        }
    }
}
