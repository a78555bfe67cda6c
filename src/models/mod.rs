//! Core data models for the pairing engine and tournament tracker.

mod match_record;
mod pairing;
mod player;

pub use match_record::*;
pub use pairing::*;
pub use player::*;
