//! Player standings rows and scored players.

use serde::{Deserialize, Serialize};

/// Unique player identifier. `0` is reserved for the bye slot.
pub type PlayerId = u32;

/// Opponent id recorded for a bye round.
pub const BYE_OPPONENT: PlayerId = 0;

/// One row of aggregated standings, as supplied by the tournament store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    /// Player identifier
    pub id: PlayerId,

    /// Registered name (need not be unique)
    pub name: String,

    /// Matches won, byes included
    pub wins: u32,

    /// Matches tied
    pub ties: u32,

    /// Matches played, byes included
    pub matches_played: u32,
}

impl PlayerStanding {
    /// Create a new standings row.
    pub fn new(id: PlayerId, name: impl Into<String>, wins: u32, ties: u32, matches_played: u32) -> Self {
        Self {
            id,
            name: name.into(),
            wins,
            ties,
            matches_played,
        }
    }

    /// Matches lost, derived from the other counters.
    pub fn losses(&self) -> u32 {
        self.wins
            .checked_add(self.ties)
            .map_or(0, |counted| self.matches_played.saturating_sub(counted))
    }
}

/// A player with a single ranking score, fixed for the duration of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: f64,
}
