//! # Swiss Pairing
//!
//! A Swiss-system round pairing engine with a small local tournament tracker.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (standings, match records, pairings)
//! - **pairing**: The pairing engine (scoring, round count, byes, matcher)
//! - **tournament**: In-memory tournament that aggregates standings and history
//! - **storage**: JSONL persistence for tournaments
//! - **simulate**: Full-tournament simulation with random outcomes
//! - **config**: Configuration loading and validation

pub mod config;
pub mod models;
pub mod pairing;
pub mod simulate;
pub mod storage;
pub mod tournament;

pub use models::*;
pub use pairing::{compute_total_rounds, PairingConfig, PairingEngine, PairingError, ScoringPolicy};
