//! Departure record schema and validation.

use serde::Deserialize;
use skyhop_core::{Flight, GatewayError};
use tracing::debug;

/// Longest slice of an error body carried into a [`GatewayError`].
const MAX_ERROR_BODY: usize = 200;

/// One element of the departures array, exactly as the source sends it.
///
/// Every field is nullable upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlight {
    pub icao24: Option<String>,
    pub first_seen: Option<i64>,
    pub est_departure_airport: Option<String>,
    pub last_seen: Option<i64>,
    pub est_arrival_airport: Option<String>,
    pub callsign: Option<String>,
}

impl RawFlight {
    /// Convert into a [`Flight`], or `None` if the record is unusable.
    ///
    /// A record needs an origin, a destination and a positive first
    /// observation. A non-positive last observation is treated as unknown.
    pub fn validate(self) -> Option<Flight> {
        let origin = non_blank(self.est_departure_airport)?;
        let destination = non_blank(self.est_arrival_airport)?;
        let first_seen = self.first_seen.filter(|t| *t > 0)?;

        Some(Flight {
            icao24: self.icao24.unwrap_or_default().trim().to_string(),
            callsign: self.callsign.unwrap_or_default().trim().to_string(),
            origin,
            destination,
            first_seen,
            last_seen: self.last_seen.filter(|t| *t > 0),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Turn a departures response into flights.
///
/// 404 is how the source says "nothing recorded here", so it decodes to an
/// empty list. Other non-2xx statuses become [`GatewayError::Status`].
pub fn decode_departures(status: u16, body: &str) -> Result<Vec<Flight>, GatewayError> {
    if status == 404 {
        return Ok(Vec::new());
    }
    if !(200..300).contains(&status) {
        return Err(GatewayError::Status {
            status,
            message: truncate(body.trim(), MAX_ERROR_BODY),
        });
    }

    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Ok(Vec::new());
    }

    let raw: Vec<RawFlight> =
        serde_json::from_str(body).map_err(|e| GatewayError::Decode {
            message: e.to_string(),
        })?;

    let total = raw.len();
    let flights: Vec<Flight> = raw.into_iter().filter_map(RawFlight::validate).collect();
    if flights.len() < total {
        debug!("Dropped {} incomplete departure records", total - flights.len());
    }

    Ok(flights)
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
