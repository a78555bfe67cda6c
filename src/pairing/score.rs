//! Score normalization for ranking players.

use serde::{Deserialize, Serialize};

use crate::models::{Player, PlayerStanding};

/// How wins and ties convert into a ranking score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// wins × 3 + ties
    #[default]
    ThreePointWin,
    /// wins + ties × 0.5
    HalfPointTie,
}

impl ScoringPolicy {
    /// Score for a single win/tie record.
    pub fn score(&self, wins: u32, ties: u32) -> f64 {
        match self {
            ScoringPolicy::ThreePointWin => f64::from(wins) * 3.0 + f64::from(ties),
            ScoringPolicy::HalfPointTie => f64::from(wins) + f64::from(ties) * 0.5,
        }
    }
}

/// Normalize standings into scored players, preserving input order.
pub fn normalize(standings: &[PlayerStanding], policy: ScoringPolicy) -> Vec<Player> {
    standings
        .iter()
        .map(|s| Player {
            id: s.id,
            name: s.name.clone(),
            score: policy.score(s.wins, s.ties),
        })
        .collect()
}

/// Gap between the highest and lowest score, rounded up to a whole point.
pub fn score_spread(players: &[Player]) -> u32 {
    let (min, max) = players
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.score), hi.max(p.score))
        });

    if players.is_empty() {
        0
    } else {
        (max - min).ceil() as u32
    }
}
