//! Append-only NDJSON trip journal.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skyhop_core::{HopResult, Personality, Result, SkyhopError};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// One line of the journal, written per hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripLogEntry {
    /// 1-based hop number.
    pub seq: u64,
    pub logged_at_utc: i64,
    pub from: String,
    pub to: String,
    pub depart_utc: i64,
    pub arrive_utc: i64,
    pub icao24: String,
    pub callsign: String,
    pub personality: Personality,
    pub reason: String,
}

impl TripLogEntry {
    /// Project a hop into a journal line. `None` if the tick did not hop.
    pub fn from_hop(
        seq: u64,
        logged_at_utc: i64,
        from: &str,
        hop: &HopResult,
        personality: Personality,
    ) -> Option<Self> {
        let flight = hop.flight.as_ref().filter(|_| hop.did_hop)?;
        Some(Self {
            seq,
            logged_at_utc,
            from: from.to_string(),
            to: flight.destination.clone(),
            depart_utc: hop.depart_utc,
            arrive_utc: hop.arrive_utc,
            icao24: flight.icao24.clone(),
            callsign: flight.callsign.clone(),
            personality,
            reason: hop.reason.clone(),
        })
    }

    pub fn duration_secs(&self) -> i64 {
        (self.arrive_utc - self.depart_utc).max(0)
    }
}

/// The journal file.
pub struct TripJournal {
    path: PathBuf,
}

impl TripJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sequence number the next entry should carry.
    pub async fn next_seq(&self) -> Result<u64> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text.lines().filter(|l| !l.trim().is_empty()).count() as u64 + 1),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(1),
            Err(e) => Err(e.into()),
        }
    }

    /// Append one entry as a single JSON line.
    pub async fn append(&self, entry: &TripLogEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        info!("Logged hop #{} {} -> {}", entry.seq, entry.from, entry.to);
        Ok(())
    }

    /// Read every entry back, skipping blank lines.
    #[cfg(test)]
    pub async fn entries(&self) -> Result<Vec<TripLogEntry>> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str::<TripLogEntry>(l).map_err(SkyhopError::from))
            .collect()
    }
}
