//! # Skyhop Core
//!
//! Core data model and error types for the Skyhop traveler.
//!
//! This crate provides the fundamental building blocks:
//! - [`TravelerState`] - The persisted traveler, mutated once per tick
//! - [`Flight`] - A recorded departure from the flight data source
//! - [`HopResult`] - Outcome of a single tick
//! - [`SkyhopError`] / [`GatewayError`] - Error types

pub mod error;
pub mod state;
pub mod types;

// Re-exports for convenience
pub use error::{GatewayError, Result, SkyhopError};
pub use state::{Personality, TravelerState, DEFAULT_AIRPORT};
pub use types::*;

