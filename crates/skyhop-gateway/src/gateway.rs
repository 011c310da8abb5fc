//! The gateway seam between the engine and the flight data source.

use std::sync::Arc;

use async_trait::async_trait;
use skyhop_core::{Flight, GatewayError};

/// Widest range the departures endpoint accepts: two days.
pub const MAX_QUERY_SPAN_SECS: i64 = 2 * skyhop_core::SECS_PER_DAY;

/// Source of recorded departures.
///
/// Implementations must treat "no data for this window" as an empty
/// success and must only return flights with an origin, a destination and
/// an observed departure. Callers keep `end_utc - begin_utc` within
/// [`MAX_QUERY_SPAN_SECS`]; implementations do not retry.
#[async_trait]
pub trait FlightGateway: Send + Sync {
    /// Departures from `airport` observed in `[begin_utc, end_utc]`.
    async fn fetch_departures(
        &self,
        airport: &str,
        begin_utc: i64,
        end_utc: i64,
    ) -> Result<Vec<Flight>, GatewayError>;
}

#[async_trait]
impl<G: FlightGateway + ?Sized> FlightGateway for Arc<G> {
    async fn fetch_departures(
        &self,
        airport: &str,
        begin_utc: i64,
        end_utc: i64,
    ) -> Result<Vec<Flight>, GatewayError> {
        (**self).fetch_departures(airport, begin_utc, end_utc).await
    }
}

/// Reject ranges the source would refuse anyway.
pub(crate) fn check_range(begin_utc: i64, end_utc: i64) -> Result<(), GatewayError> {
    if end_utc < begin_utc {
        return Err(GatewayError::Status {
            status: 400,
            message: format!("end ({end_utc}) precedes begin ({begin_utc})"),
        });
    }
    if end_utc - begin_utc > MAX_QUERY_SPAN_SECS {
        return Err(GatewayError::Status {
            status: 400,
            message: format!(
                "range of {}s exceeds the {MAX_QUERY_SPAN_SECS}s maximum",
                end_utc - begin_utc
            ),
        });
    }
    Ok(())
}
