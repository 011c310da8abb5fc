//! Human-readable caption and machine-readable summary of the latest hop.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skyhop_core::{format_duration, format_utc, Result, TravelerState};
use tokio::fs;

use crate::journal::TripLogEntry;

/// Render the social post for a hop.
pub fn render_caption(entry: &TripLogEntry, state: &TravelerState) -> String {
    let flight = if entry.callsign.is_empty() {
        format!("aircraft {}", entry.icao24)
    } else {
        format!("{} ({})", entry.callsign, entry.icao24)
    };

    format!(
        "Hop #{seq}: {from} -> {to}\n\
         Flew {flight}.\n\
         Departed {depart}, landed {arrive} ({duration} in the air).\n\
         Next departure board check after {next}.\n\
         #skyhop #{personality} #{to}\n",
        seq = entry.seq,
        from = entry.from,
        to = entry.to,
        depart = format_utc(entry.depart_utc),
        arrive = format_utc(entry.arrive_utc),
        duration = format_duration(entry.duration_secs()),
        next = format_utc(state.next_event_utc),
        personality = entry.personality,
    )
}

/// Snapshot of the most recent hop, overwritten after each one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestHop {
    pub seq: u64,
    pub from: String,
    pub to: String,
    pub depart_utc: i64,
    pub arrive_utc: i64,
    pub duration_secs: i64,
    pub callsign: String,
    pub icao24: String,
    pub next_event_utc: i64,
    pub sim_time_utc: i64,
    pub recent_airports: Vec<String>,
}

impl LatestHop {
    pub fn new(entry: &TripLogEntry, state: &TravelerState) -> Self {
        Self {
            seq: entry.seq,
            from: entry.from.clone(),
            to: entry.to.clone(),
            depart_utc: entry.depart_utc,
            arrive_utc: entry.arrive_utc,
            duration_secs: entry.duration_secs(),
            callsign: entry.callsign.clone(),
            icao24: entry.icao24.clone(),
            next_event_utc: state.next_event_utc,
            sim_time_utc: state.sim_time_utc,
            recent_airports: state.recent_airports.clone(),
        }
    }

    pub async fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json).await?;
        Ok(())
    }
}

/// Write the caption text, replacing any previous one.
pub async fn write_caption(path: impl AsRef<Path>, caption: &str) -> Result<()> {
    fs::write(path, caption).await?;
    Ok(())
}
