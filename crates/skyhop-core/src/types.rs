//! Flight records, search windows and tick outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds in one UTC calendar day.
pub const SECS_PER_DAY: i64 = 86_400;

/// Seconds in one hour.
pub const SECS_PER_HOUR: i64 = 3_600;

/// A recorded departure, as returned by the flight data gateway.
///
/// Records reaching the engine always carry an origin, a destination and a
/// positive `first_seen`; the gateway drops anything less.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Transponder address of the aircraft.
    pub icao24: String,

    /// Trimmed callsign, possibly empty.
    pub callsign: String,

    /// Estimated departure airport code.
    pub origin: String,

    /// Estimated arrival airport code.
    pub destination: String,

    /// First observation (unix seconds), used as the departure time.
    pub first_seen: i64,

    /// Last observation (unix seconds), used as the arrival time when known.
    pub last_seen: Option<i64>,
}

impl Flight {
    /// Observed time in the air, zero when the arrival is unknown or precedes departure.
    pub fn duration_secs(&self) -> i64 {
        match self.last_seen {
            Some(last) => (last - self.first_seen).max(0),
            None => 0,
        }
    }

    /// Human label: the callsign, or the transponder address when no callsign was broadcast.
    pub fn label(&self) -> &str {
        if self.callsign.is_empty() {
            &self.icao24
        } else {
            &self.callsign
        }
    }
}

/// Closed time range `[begin_utc, end_utc]` queried against the flight source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub begin_utc: i64,
    pub end_utc: i64,
}

impl SearchWindow {
    /// Width of the window in seconds.
    pub fn span_secs(&self) -> i64 {
        self.end_utc - self.begin_utc
    }

    /// Number of UTC calendar-day boundaries crossed by the window.
    pub fn day_spread(&self) -> i64 {
        day_index(self.end_utc) - day_index(self.begin_utc)
    }
}

/// UTC calendar-day index of a unix timestamp.
pub fn day_index(ts: i64) -> i64 {
    ts.div_euclid(SECS_PER_DAY)
}

/// Format a unix timestamp as `YYYY-MM-DD HH:MM UTC`.
pub fn format_utc(ts: i64) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => format!("@{ts}"),
    }
}

/// Format a duration as `Xh YYm`.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}h {:02}m", secs / SECS_PER_HOUR, (secs % SECS_PER_HOUR) / 60)
}

/// Which branch of the tick produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HopKind {
    /// The gate has not elapsed; nothing was touched.
    Waiting,
    /// The flight source failed; a short retry was scheduled.
    GatewayFailure,
    /// No eligible departures; story time was nudged forward.
    DryWindow,
    /// The traveler moved.
    Hopped,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopResult {
    pub did_hop: bool,
    pub kind: HopKind,

    /// The chosen flight, present only when `did_hop` is true.
    pub flight: Option<Flight>,

    pub depart_utc: i64,
    pub arrive_utc: i64,

    /// Human-readable explanation for logs; not meant to be parsed.
    pub reason: String,

    /// Window that was queried, if the tick got that far.
    pub window: Option<SearchWindow>,

    /// Number of eligible candidates after filtering.
    pub candidates: usize,

    /// Score of the chosen candidate.
    pub score: Option<f64>,
}

impl HopResult {
    fn no_hop(kind: HopKind, reason: impl Into<String>, window: Option<SearchWindow>) -> Self {
        Self {
            did_hop: false,
            kind,
            flight: None,
            depart_utc: 0,
            arrive_utc: 0,
            reason: reason.into(),
            window,
            candidates: 0,
            score: None,
        }
    }

    /// The gate is still closed.
    pub fn waiting(next_event_utc: i64) -> Self {
        Self::no_hop(
            HopKind::Waiting,
            format!("Not time yet (next event at {}).", format_utc(next_event_utc)),
            None,
        )
    }

    /// The gateway failed for this window.
    pub fn gateway_failure(window: SearchWindow, error: &crate::GatewayError) -> Self {
        Self::no_hop(
            HopKind::GatewayFailure,
            format!("Flight source error: {error}"),
            Some(window),
        )
    }

    /// No eligible departures in this window.
    pub fn dry_window(window: SearchWindow, fetched: usize) -> Self {
        Self::no_hop(
            HopKind::DryWindow,
            format!(
                "No candidates in window ({fetched} departures fetched); \
                 advanced story time and scheduled recheck."
            ),
            Some(window),
        )
    }

    /// The traveler took `flight`.
    pub fn hopped(
        flight: Flight,
        depart_utc: i64,
        arrive_utc: i64,
        window: SearchWindow,
        candidates: usize,
        score: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            did_hop: true,
            kind: HopKind::Hopped,
            flight: Some(flight),
            depart_utc,
            arrive_utc,
            reason: reason.into(),
            window: Some(window),
            candidates,
            score: Some(score),
        }
    }
}
