//! # Skyhop Gateway
//!
//! Typed access to recorded departures. The engine only sees
//! [`FlightGateway`]; [`OpenSkyClient`] is the production implementation.

pub mod client;
pub mod gateway;
pub mod records;

pub use client::{OpenSkyClient, OpenSkyConfig};
pub use gateway::{FlightGateway, MAX_QUERY_SPAN_SECS};
pub use records::{decode_departures, RawFlight};
