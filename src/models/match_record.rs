//! Match history records.

use serde::{Deserialize, Serialize};

use super::{PlayerId, BYE_OPPONENT};

/// A match between two players, unordered. `player_b == 0` encodes a bye for `player_a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
}

impl MatchRecord {
    pub fn new(player_a: PlayerId, player_b: PlayerId) -> Self {
        Self { player_a, player_b }
    }

    /// A bye round awarded to `player`.
    pub fn bye(player: PlayerId) -> Self {
        Self::new(player, BYE_OPPONENT)
    }

    pub fn is_bye(&self) -> bool {
        self.player_b == BYE_OPPONENT
    }

    /// The pair with the smaller id first, for order-insensitive lookups.
    pub fn key(&self) -> (PlayerId, PlayerId) {
        if self.player_a <= self.player_b {
            (self.player_a, self.player_b)
        } else {
            (self.player_b, self.player_a)
        }
    }
}
