//! Full-tournament simulation.
//!
//! Registers a field in shuffled order, then pairs and plays rounds with
//! random outcomes until the engine reports the tournament complete.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::models::{MatchRecord, PlayerStanding};
use crate::pairing::PairingEngine;
use crate::tournament::{MatchOutcome, Tournament, TournamentError};

const OUTCOMES: [MatchOutcome; 3] = [
    MatchOutcome::PlayerAWins,
    MatchOutcome::Tie,
    MatchOutcome::PlayerBWins,
];

/// Summary of a simulated tournament.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub rounds_played: u32,
    pub total_rounds: u32,
    pub standings: Vec<PlayerStanding>,
    pub history: Vec<MatchRecord>,
    /// Rematches and second byes found in `history`
    pub repeated: Vec<MatchRecord>,
}

/// Names "Player 1" through "Player N".
pub fn default_player_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Player {}", i)).collect()
}

/// Play a whole tournament for `names` with outcomes drawn from `seed`.
pub fn simulate<S: AsRef<str>>(
    names: &[S],
    seed: u64,
    engine: &PairingEngine,
) -> Result<SimulationReport, TournamentError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut order: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
    order.shuffle(&mut rng);

    let mut tournament = Tournament::new("simulation");
    for name in order {
        tournament.register_player(name);
    }

    let total_rounds = engine.compute_total_rounds(names.len());

    // One extra iteration observes the empty "complete" result.
    for _ in 0..=total_rounds {
        let pairings = tournament.swiss_pairings(engine)?;
        if pairings.is_empty() {
            break;
        }

        tournament.report_round(&pairings, |_| random_outcome(&mut rng))?;
        info!(
            round = tournament.rounds_played(),
            total_rounds,
            boards = pairings.len(),
            "Simulated round"
        );
    }

    let history = tournament.history();
    Ok(SimulationReport {
        seed,
        rounds_played: tournament.rounds_played(),
        total_rounds,
        standings: tournament.standings(),
        repeated: repeated_pairings(&history),
        history,
    })
}

fn random_outcome<R: Rng>(rng: &mut R) -> MatchOutcome {
    OUTCOMES[rng.gen_range(0..OUTCOMES.len())]
}

/// Records whose pair (in either order) already appeared earlier in
/// `history`. A repeated `(id, 0)` is a second bye.
pub fn repeated_pairings(history: &[MatchRecord]) -> Vec<MatchRecord> {
    let mut seen = HashSet::new();
    history
        .iter()
        .filter(|record| !seen.insert(record.key()))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repeated_pairings_detects_rematch_and_second_bye() {
        let history = vec![
            MatchRecord::new(1, 2),
            MatchRecord::bye(3),
            MatchRecord::new(2, 1),
            MatchRecord::new(1, 3),
            MatchRecord::bye(3),
        ];

        assert_eq!(
            repeated_pairings(&history),
            vec![MatchRecord::new(2, 1), MatchRecord::bye(3)]
        );
    }

    #[test]
    fn test_repeated_pairings_clean_history() {
        let history = vec![MatchRecord::new(1, 2), MatchRecord::new(1, 3)];
        assert!(repeated_pairings(&history).is_empty());
    }

    #[test]
    fn test_even_tournament_has_no_repeats() {
        let engine = PairingEngine::default();
        let names = default_player_names(8);

        for seed in 0..10 {
            let report = simulate(&names, seed, &engine).unwrap();

            assert!(report.repeated.is_empty(), "seed {}: {:?}", seed, report.repeated);
            assert_eq!(report.rounds_played, report.total_rounds);
            assert!(f64::from(report.rounds_played) >= (names.len() as f64).log2());
            assert!(report.history.iter().all(|r| !r.is_bye()));
            assert_eq!(report.history.len(), 4 * 3);
        }
    }

    #[test]
    fn test_odd_tournament_has_no_repeats() {
        let engine = PairingEngine::default();
        let names = default_player_names(9);

        for seed in 0..10 {
            let report = simulate(&names, seed, &engine).unwrap();

            assert!(report.repeated.is_empty(), "seed {}: {:?}", seed, report.repeated);
            assert_eq!(report.rounds_played, 4);
            assert!(f64::from(report.rounds_played) >= (names.len() as f64).log2());

            let byes = report.history.iter().filter(|r| r.is_bye()).count();
            assert_eq!(byes, 4);
        }
    }

    #[test]
    fn test_same_seed_same_tournament() {
        let engine = PairingEngine::default();
        let names = default_player_names(6);

        let first = simulate(&names, 42, &engine).unwrap();
        let second = simulate(&names, 42, &engine).unwrap();

        assert_eq!(first.history, second.history);
        assert_eq!(first.standings, second.standings);
    }

    #[test]
    fn test_single_player_plays_nothing() {
        let report = simulate(&["Solo"], 1, &PairingEngine::default()).unwrap();

        assert_eq!(report.rounds_played, 0);
        assert!(report.history.is_empty());
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let names: Vec<String> = Vec::new();
        let result = simulate(&names, 1, &PairingEngine::default());

        assert!(matches!(result, Err(TournamentError::Pairing(_))));
    }

    #[test]
    fn test_default_player_names() {
        assert_eq!(
            default_player_names(3),
            vec!["Player 1", "Player 2", "Player 3"]
        );
    }
}
