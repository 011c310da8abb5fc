//! # Skyhop Engine
//!
//! The tick decision procedure: window computation, candidate filtering,
//! personality-weighted scoring and the advancement of story time.

pub mod config;
pub mod engine;
pub mod scoring;
pub mod window;

pub use config::EngineConfig;
pub use engine::TravelerEngine;
pub use scoring::{score_flight, PersonalityWeights, ScoredFlight};
pub use window::compute_window;
