//! Swiss-system pairing engine.
//!
//! Produces the pairing list for the next round from pre-aggregated
//! standings and the full match history:
//! - `score`: collapses win/tie counts into one ranking score
//! - `rounds`: how many rounds a field of N players plays
//! - `bye`: which players already sat out a round
//! - `draw`: adjacency matcher with rematch rescue and bye swaps

mod bye;
mod draw;
mod rounds;
mod score;

pub use bye::already_bye;
pub use rounds::compute_total_rounds;
pub use score::{normalize, score_spread, ScoringPolicy};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{MatchRecord, Pairing, PlayerId, PlayerStanding, BYE_OPPONENT};
use draw::Draw;

/// Errors returned by the pairing engine.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pairing impossible: {reason}")]
    PairingImpossible { reason: String },
}

impl PairingError {
    pub(crate) fn impossible(reason: impl Into<String>) -> Self {
        PairingError::PairingImpossible {
            reason: reason.into(),
        }
    }
}

/// Pairing engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Scoring policy used to rank players
    #[serde(default)]
    pub scoring: ScoringPolicy,

    /// Full standings scans allowed per player before giving up
    #[serde(default = "default_max_passes_per_player")]
    pub max_passes_per_player: u32,
}

fn default_max_passes_per_player() -> u32 {
    2
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::default(),
            max_passes_per_player: default_max_passes_per_player(),
        }
    }
}

/// Rounds already played: the most matches any player has on record.
pub fn rounds_played(standings: &[PlayerStanding]) -> u32 {
    standings
        .iter()
        .map(|s| s.matches_played)
        .max()
        .unwrap_or(0)
}

/// Entry point for pairing rounds. Holds no per-round state, so one engine
/// can pair any number of tournaments.
#[derive(Debug, Clone, Default)]
pub struct PairingEngine {
    config: PairingConfig,
}

impl PairingEngine {
    pub fn new(config: PairingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PairingConfig {
        &self.config
    }

    /// Total rounds a field of `player_count` players plays.
    pub fn compute_total_rounds(&self, player_count: usize) -> u32 {
        compute_total_rounds(player_count)
    }

    /// Pair the next round.
    ///
    /// `standings` must already be sorted (descending by wins, then ties);
    /// players are paired with the next available player below them in
    /// that order. An empty list means the tournament is complete.
    pub fn get_pairings(
        &self,
        standings: &[PlayerStanding],
        history: &[MatchRecord],
    ) -> Result<Vec<Pairing>, PairingError> {
        validate_input(standings, history)?;

        let total_rounds = compute_total_rounds(standings.len());
        let played = rounds_played(standings);
        if played >= total_rounds {
            info!(
                rounds_played = played,
                total_rounds, "Tournament complete, no pairings"
            );
            return Ok(Vec::new());
        }

        let players = normalize(standings, self.config.scoring);
        let max_passes = players.len() * self.config.max_passes_per_player as usize;
        let pairings = Draw::new(&players, history, max_passes).run()?;

        info!(
            round = played + 1,
            total_rounds,
            pairings = pairings.len(),
            "Paired round"
        );
        Ok(pairings)
    }
}

/// Reject malformed standings or history before any pairing work starts.
pub fn validate_input(
    standings: &[PlayerStanding],
    history: &[MatchRecord],
) -> Result<(), PairingError> {
    if standings.is_empty() {
        return Err(PairingError::InvalidInput(
            "standings must not be empty".to_string(),
        ));
    }

    let mut ids: HashSet<PlayerId> = HashSet::with_capacity(standings.len());
    for standing in standings {
        if standing.id == BYE_OPPONENT {
            return Err(PairingError::InvalidInput(format!(
                "player '{}' uses reserved id {}",
                standing.name, BYE_OPPONENT
            )));
        }
        if !ids.insert(standing.id) {
            return Err(PairingError::InvalidInput(format!(
                "duplicate player id {}",
                standing.id
            )));
        }
        if standing
            .wins
            .checked_add(standing.ties)
            .map_or(true, |counted| counted > standing.matches_played)
        {
            return Err(PairingError::InvalidInput(format!(
                "player {} has {} wins and {} ties in {} matches",
                standing.id, standing.wins, standing.ties, standing.matches_played
            )));
        }
    }

    for record in history {
        if record.player_a == BYE_OPPONENT || record.player_a == record.player_b {
            return Err(PairingError::InvalidInput(format!(
                "malformed match record ({}, {})",
                record.player_a, record.player_b
            )));
        }
        for id in [record.player_a, record.player_b] {
            if id != BYE_OPPONENT && !ids.contains(&id) {
                return Err(PairingError::InvalidInput(format!(
                    "match history references unknown player {}",
                    id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn standing(id: PlayerId, name: &str, wins: u32, ties: u32, played: u32) -> PlayerStanding {
        PlayerStanding::new(id, name, wins, ties, played)
    }

    fn fresh_field(n: u32) -> Vec<PlayerStanding> {
        (1..=n)
            .map(|id| standing(id, &format!("P{}", id), 0, 0, 0))
            .collect()
    }

    fn appearances(pairings: &[Pairing]) -> HashMap<PlayerId, usize> {
        let mut counts = HashMap::new();
        for pairing in pairings {
            *counts.entry(pairing.id1).or_insert(0) += 1;
            if !pairing.is_bye() {
                *counts.entry(pairing.id2).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_even_field_pairs_everyone_once() {
        let engine = PairingEngine::default();

        for n in [2u32, 4, 6, 8, 16] {
            let pairings = engine.get_pairings(&fresh_field(n), &[]).unwrap();

            assert_eq!(pairings.len(), (n / 2) as usize);
            assert!(pairings.iter().all(|p| !p.is_bye()));

            let counts = appearances(&pairings);
            assert_eq!(counts.len(), n as usize);
            assert!(counts.values().all(|&c| c == 1));
        }
    }

    #[test]
    fn test_odd_field_has_single_bye() {
        let engine = PairingEngine::default();

        for n in [3u32, 5, 7, 9] {
            let pairings = engine.get_pairings(&fresh_field(n), &[]).unwrap();

            assert_eq!(pairings.len(), (n / 2 + 1) as usize);
            assert_eq!(pairings.iter().filter(|p| p.is_bye()).count(), 1);

            let counts = appearances(&pairings);
            assert_eq!(counts.len(), n as usize);
            assert!(counts.values().all(|&c| c == 1));
        }
    }

    #[test]
    fn test_winners_meet_winners() {
        let standings = vec![
            standing(1, "A", 1, 0, 1),
            standing(2, "B", 1, 0, 1),
            standing(3, "C", 0, 0, 1),
            standing(4, "D", 0, 0, 1),
        ];
        let history = vec![MatchRecord::new(1, 3), MatchRecord::new(2, 4)];

        let pairings = PairingEngine::default()
            .get_pairings(&standings, &history)
            .unwrap();

        assert_eq!(
            pairings,
            vec![Pairing::new(1, "A", 2, "B"), Pairing::new(3, "C", 4, "D")]
        );
    }

    #[test]
    fn test_first_round_bye_goes_to_lowest_ranked() {
        let pairings = PairingEngine::default()
            .get_pairings(&fresh_field(5), &[])
            .unwrap();

        assert_eq!(
            pairings,
            vec![
                Pairing::new(1, "P1", 2, "P2"),
                Pairing::new(3, "P3", 4, "P4"),
                Pairing::bye(5, "P5"),
            ]
        );

        let history: Vec<MatchRecord> = pairings
            .iter()
            .map(|p| MatchRecord::new(p.id1, p.id2))
            .collect();
        assert!(already_bye(5, &history).contains(&5));
    }

    #[test]
    fn test_repeat_bye_is_swapped_away() {
        let standings = vec![
            standing(1, "A", 2, 0, 2),
            standing(5, "E", 2, 0, 2),
            standing(3, "C", 1, 0, 2),
            standing(4, "D", 1, 0, 2),
            standing(2, "B", 0, 0, 2),
        ];
        let history = vec![
            MatchRecord::new(1, 2),
            MatchRecord::new(3, 4),
            MatchRecord::bye(5),
            MatchRecord::new(1, 3),
            MatchRecord::new(5, 2),
            MatchRecord::bye(4),
        ];

        let pairings = PairingEngine::default()
            .get_pairings(&standings, &history)
            .unwrap();

        let bye: Vec<&Pairing> = pairings.iter().filter(|p| p.is_bye()).collect();
        assert_eq!(bye.len(), 1);
        assert_eq!(bye[0].id1, 3);

        for pairing in &pairings {
            assert!(
                !history
                    .iter()
                    .any(|r| r.key() == MatchRecord::new(pairing.id1, pairing.id2).key()),
                "rematch produced: {:?}",
                pairing
            );
        }
    }

    #[test]
    fn test_no_bye_eligible_player_is_impossible() {
        let standings = vec![
            standing(1, "A", 1, 0, 1),
            standing(2, "B", 1, 0, 1),
            standing(3, "C", 1, 0, 1),
        ];
        let history = vec![MatchRecord::bye(1), MatchRecord::bye(2), MatchRecord::bye(3)];

        let result = PairingEngine::default().get_pairings(&standings, &history);
        assert!(matches!(result, Err(PairingError::PairingImpossible { .. })));
    }

    #[test]
    fn test_everyone_met_everyone_is_impossible() {
        let standings = vec![
            standing(1, "A", 0, 0, 1),
            standing(2, "B", 0, 0, 1),
            standing(3, "C", 0, 0, 1),
            standing(4, "D", 0, 0, 1),
        ];
        let history = vec![
            MatchRecord::new(1, 2),
            MatchRecord::new(1, 3),
            MatchRecord::new(1, 4),
            MatchRecord::new(2, 3),
            MatchRecord::new(2, 4),
            MatchRecord::new(3, 4),
        ];

        let result = PairingEngine::default().get_pairings(&standings, &history);
        assert!(matches!(result, Err(PairingError::PairingImpossible { .. })));
    }

    #[test]
    fn test_complete_tournament_returns_no_pairings() {
        let standings = vec![
            standing(1, "A", 2, 0, 2),
            standing(2, "B", 1, 0, 2),
            standing(3, "C", 1, 0, 2),
            standing(4, "D", 0, 0, 2),
        ];

        let pairings = PairingEngine::default().get_pairings(&standings, &[]).unwrap();
        assert!(pairings.is_empty());
    }

    #[test]
    fn test_single_player_is_already_complete() {
        let pairings = PairingEngine::default()
            .get_pairings(&fresh_field(1), &[])
            .unwrap();
        assert!(pairings.is_empty());
    }

    #[test]
    fn test_engine_round_count() {
        let engine = PairingEngine::default();
        assert_eq!(engine.compute_total_rounds(1), 0);
        assert_eq!(engine.compute_total_rounds(6), 3);
    }

    #[test]
    fn test_rounds_played_uses_max() {
        let standings = vec![standing(1, "A", 1, 0, 2), standing(2, "B", 0, 0, 1)];
        assert_eq!(rounds_played(&standings), 2);
        assert_eq!(rounds_played(&[]), 0);
    }

    #[test]
    fn test_rejects_empty_standings() {
        let result = PairingEngine::default().get_pairings(&[], &[]);
        assert!(matches!(result, Err(PairingError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let standings = vec![standing(1, "A", 0, 0, 0), standing(1, "B", 0, 0, 0)];
        assert!(matches!(
            validate_input(&standings, &[]),
            Err(PairingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_reserved_id() {
        let standings = vec![standing(0, "A", 0, 0, 0), standing(1, "B", 0, 0, 0)];
        assert!(validate_input(&standings, &[]).is_err());
    }

    #[test]
    fn test_rejects_impossible_record() {
        let standings = vec![standing(1, "A", 2, 1, 2), standing(2, "B", 0, 0, 2)];
        assert!(validate_input(&standings, &[]).is_err());
    }

    #[test]
    fn test_rejects_overflowing_record() {
        let standings = vec![
            standing(1, "A", u32::MAX, 1, u32::MAX),
            standing(2, "B", 0, 0, 0),
        ];

        match validate_input(&standings, &[]) {
            Err(PairingError::InvalidInput(msg)) => assert!(msg.contains("player 1")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_history_player() {
        let standings = fresh_field(2);
        let history = vec![MatchRecord::new(1, 9)];

        match validate_input(&standings, &history) {
            Err(PairingError::InvalidInput(msg)) => assert!(msg.contains("unknown player 9")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_history() {
        let standings = fresh_field(2);
        assert!(validate_input(&standings, &[MatchRecord::new(0, 1)]).is_err());
        assert!(validate_input(&standings, &[MatchRecord::new(2, 2)]).is_err());
        assert!(validate_input(&standings, &[MatchRecord::bye(2)]).is_ok());
    }

    #[test]
    fn test_half_point_policy_changes_swap_gap() {
        let config = PairingConfig {
            scoring: ScoringPolicy::HalfPointTie,
            ..PairingConfig::default()
        };
        let standings = vec![
            standing(1, "A", 1, 0, 1),
            standing(2, "B", 0, 1, 1),
            standing(3, "C", 0, 0, 1),
        ];
        let history = vec![MatchRecord::bye(3)];

        let pairings = PairingEngine::new(config)
            .get_pairings(&standings, &history)
            .unwrap();

        // Both A and B sit within one point of C, so the most recent board's
        // first member keeps its place and B takes the bye.
        assert_eq!(
            pairings,
            vec![Pairing::new(1, "A", 3, "C"), Pairing::bye(2, "B")]
        );
    }

    #[test]
    fn test_error_display() {
        let err = PairingError::impossible("stuck");
        assert_eq!(err.to_string(), "Pairing impossible: stuck");
    }
}
