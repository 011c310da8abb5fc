//! Engine configuration.

use serde::{Deserialize, Serialize};
use skyhop_core::{SECS_PER_DAY, SECS_PER_HOUR};

/// Tunables for the tick procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Real-time delay before retrying after a gateway failure or a dry window.
    pub retry_delay_secs: i64,

    /// Story-time nudge applied when a window yields no candidates.
    pub dry_window_advance_secs: i64,

    /// Assumed flight duration when the arrival was never observed.
    pub default_flight_secs: i64,

    /// Floor on the real wait after a hop.
    pub min_wait_secs: i64,

    /// Widest window the flight source accepts.
    pub max_window_secs: i64,

    /// Chance of picking at random among the top candidates instead of the best.
    pub explore_probability: f64,

    /// How many top candidates exploration draws from.
    pub explore_top_k: usize,

    /// Half-width of the uniform jitter term.
    pub jitter_amplitude: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_delay_secs: 300,
            dry_window_advance_secs: 3 * SECS_PER_HOUR,
            default_flight_secs: 2 * SECS_PER_HOUR,
            min_wait_secs: 60,
            max_window_secs: 2 * SECS_PER_DAY,
            explore_probability: 0.10,
            explore_top_k: 5,
            jitter_amplitude: 0.05,
        }
    }
}
