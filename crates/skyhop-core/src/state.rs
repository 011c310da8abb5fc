//! The persisted traveler state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkyhopError};

/// Airport the traveler starts from when no location has been persisted.
pub const DEFAULT_AIRPORT: &str = "KCVG";

/// Travel style, selecting the scoring weights.
///
/// Any label outside the known set maps to [`Personality::Balanced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Personality {
    /// Chases new places and randomness.
    #[default]
    Chaotic,
    /// Prefers short hops.
    Budget,
    /// Prefers long hops.
    Scenic,
    /// Neutral weights.
    Balanced,
}

impl Personality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Chaotic => "chaotic",
            Personality::Budget => "budget",
            Personality::Scenic => "scenic",
            Personality::Balanced => "balanced",
        }
    }
}

impl From<&str> for Personality {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "chaotic" => Personality::Chaotic,
            "budget" => Personality::Budget,
            "scenic" => Personality::Scenic,
            _ => Personality::Balanced,
        }
    }
}

impl From<String> for Personality {
    fn from(label: String) -> Self {
        Personality::from(label.as_str())
    }
}

impl From<Personality> for String {
    fn from(personality: Personality) -> Self {
        personality.as_str().to_string()
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_airport() -> String {
    DEFAULT_AIRPORT.to_string()
}

fn default_lag_seconds() -> i64 {
    86_400
}

fn default_lookback_hours() -> i64 {
    36
}

fn default_avoid_recent_n() -> i64 {
    10
}

/// Everything the traveler remembers between ticks.
///
/// Absent fields take their defaults on load, so a hand-written state file
/// only needs the fields it wants to override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerState {
    /// Airport the traveler is currently at.
    #[serde(default = "default_airport")]
    pub current_airport: String,

    /// Story clock (unix seconds). Zero until the first tick initializes it.
    #[serde(default)]
    pub sim_time_utc: i64,

    /// Earliest wall-clock time at which a tick may act. Zero means no gate.
    #[serde(default)]
    pub next_event_utc: i64,

    /// How far behind real time the story clock starts.
    #[serde(default = "default_lag_seconds")]
    pub lag_seconds: i64,

    /// Width of the departure search window.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,

    /// Capacity of the recency buffer.
    #[serde(default = "default_avoid_recent_n")]
    pub avoid_recent_n: i64,

    #[serde(default)]
    pub personality: Personality,

    /// Most recent destinations, oldest first.
    #[serde(default)]
    pub recent_airports: Vec<String>,
}

impl Default for TravelerState {
    fn default() -> Self {
        Self {
            current_airport: default_airport(),
            sim_time_utc: 0,
            next_event_utc: 0,
            lag_seconds: default_lag_seconds(),
            lookback_hours: default_lookback_hours(),
            avoid_recent_n: default_avoid_recent_n(),
            personality: Personality::default(),
            recent_airports: Vec::new(),
        }
    }
}

impl TravelerState {
    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.current_airport.trim().is_empty() {
            return Err(SkyhopError::StateError {
                message: "current_airport must not be empty".to_string(),
            });
        }
        for (name, value) in [
            ("lag_seconds", self.lag_seconds),
            ("lookback_hours", self.lookback_hours),
            ("avoid_recent_n", self.avoid_recent_n),
        ] {
            if value < 0 {
                return Err(SkyhopError::StateError {
                    message: format!("{name} must not be negative (got {value})"),
                });
            }
        }
        Ok(())
    }

    /// Returns true if `airport` is in the recency buffer.
    pub fn recently_visited(&self, airport: &str) -> bool {
        self.recent_airports.iter().any(|a| a == airport)
    }

    /// Append a destination, evicting the oldest entries beyond `avoid_recent_n`.
    pub fn push_recent(&mut self, airport: impl Into<String>) {
        self.recent_airports.push(airport.into());
        let cap = usize::try_from(self.avoid_recent_n).unwrap_or(0);
        if self.recent_airports.len() > cap {
            let excess = self.recent_airports.len() - cap;
            self.recent_airports.drain(..excess);
        }
    }
}
