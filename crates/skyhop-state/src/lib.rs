//! # Skyhop State
//!
//! Everything the runner reads or writes around a tick: the traveler state
//! file, the append-only trip journal and the post artifacts.

pub mod journal;
pub mod post;
pub mod store;

pub use journal::{TripJournal, TripLogEntry};
pub use post::{render_caption, write_caption, LatestHop};
pub use store::{JsonFileStateStore, StateStore};
