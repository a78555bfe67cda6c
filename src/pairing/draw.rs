//! The matcher: greedy adjacency pairing over the standings, with a rescue
//! for cornered players and a score-widening swap for repeated byes.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::bye::already_bye;
use super::score::score_spread;
use super::PairingError;
use crate::models::{MatchRecord, Pairing, Player, PlayerId};

/// Order-insensitive lookup over every match already played.
#[derive(Debug, Default)]
pub(crate) struct History {
    played: HashSet<(PlayerId, PlayerId)>,
}

impl History {
    pub(crate) fn new(records: &[MatchRecord]) -> Self {
        Self {
            played: records.iter().map(MatchRecord::key).collect(),
        }
    }

    pub(crate) fn played(&self, a: PlayerId, b: PlayerId) -> bool {
        self.played.contains(&MatchRecord::new(a, b).key())
    }
}

/// A board under construction. Indices point into the normalized standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Board {
    Match(usize, usize),
    Bye(usize),
}

/// Order in which existing boards are searched when one has to be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchOrder {
    MostRecentFirst,
}

/// State of one `get_pairings` call. Created fresh, threaded through each
/// pass, and dropped once the round is paired.
#[derive(Debug, Default)]
struct DrawState {
    drawn: HashSet<usize>,
    pending: Option<usize>,
    boards: Vec<Board>,
    changes: usize,
}

impl DrawState {
    fn positions(&self, order: SearchOrder) -> Vec<usize> {
        match order {
            SearchOrder::MostRecentFirst => (0..self.boards.len()).rev().collect(),
        }
    }
}

/// Read-only inputs for one round's draw.
pub(crate) struct Draw<'a> {
    players: &'a [Player],
    history: History,
    already_bye: HashSet<PlayerId>,
    spread: u32,
    max_passes: usize,
}

impl<'a> Draw<'a> {
    pub(crate) fn new(players: &'a [Player], history: &[MatchRecord], max_passes: usize) -> Self {
        Self {
            players,
            history: History::new(history),
            already_bye: already_bye(players.len(), history),
            spread: score_spread(players),
            max_passes,
        }
    }

    /// Repeat full scans of the standings until everyone is drawn.
    pub(crate) fn run(&self) -> Result<Vec<Pairing>, PairingError> {
        let mut state = DrawState::default();

        for pass in 1..=self.max_passes {
            let before = state.changes;
            state = self.pass(state)?;

            debug!(
                pass,
                drawn = state.drawn.len(),
                boards = state.boards.len(),
                "Completed pairing pass"
            );

            if state.drawn.len() == self.players.len() {
                return Ok(state.boards.iter().map(|b| self.to_pairing(*b)).collect());
            }

            if state.changes == before {
                return Err(PairingError::impossible(format!(
                    "pass {} made no progress with {} of {} players drawn",
                    pass,
                    state.drawn.len(),
                    self.players.len()
                )));
            }
        }

        Err(PairingError::impossible(format!(
            "no complete pairing after {} passes",
            self.max_passes
        )))
    }

    fn pass(&self, mut state: DrawState) -> Result<DrawState, PairingError> {
        for idx in 0..self.players.len() {
            if state.drawn.contains(&idx) {
                continue;
            }
            self.visit(&mut state, idx)?;
        }
        Ok(state)
    }

    fn visit(&self, state: &mut DrawState, idx: usize) -> Result<(), PairingError> {
        if self.is_last_slot(state) {
            // only commits add boards while a player is buffered, and they clear it
            debug_assert_eq!(state.pending, None);

            let player = &self.players[idx];
            if self.already_bye.contains(&player.id) {
                return self.swap(state, idx);
            }

            debug!(player = player.id, "Assigning bye");
            state.boards.push(Board::Bye(idx));
            state.drawn.insert(idx);
            state.changes += 1;
            return Ok(());
        }

        match state.pending {
            None => {
                state.pending = Some(idx);
                state.changes += 1;
            }
            Some(pending) if pending == idx || self.played(pending, idx) => {
                self.resolve_conflict(state, idx)?;
            }
            Some(pending) => self.commit(state, pending, idx),
        }

        Ok(())
    }

    /// The single leftover player of an odd field.
    fn is_last_slot(&self, state: &DrawState) -> bool {
        self.players.len() % 2 == 1 && state.boards.len() == self.players.len() / 2
    }

    fn commit(&self, state: &mut DrawState, first: usize, second: usize) {
        state.boards.push(Board::Match(first, second));
        state.drawn.insert(first);
        state.drawn.insert(second);
        state.pending = None;
        state.changes += 1;
    }

    fn resolve_conflict(&self, state: &mut DrawState, idx: usize) -> Result<(), PairingError> {
        if self.has_matchable(state, idx) {
            debug!(
                player = self.players[idx].id,
                "Rematch conflict, deferring to a later opponent"
            );
            return Ok(());
        }
        self.rescue(state, idx)
    }

    /// Whether any undrawn player besides `idx` has not yet met `idx`.
    fn has_matchable(&self, state: &DrawState, idx: usize) -> bool {
        self.has_matchable_besides(state, idx, idx)
    }

    fn has_matchable_besides(&self, state: &DrawState, idx: usize, besides: usize) -> bool {
        (0..self.players.len()).any(|other| {
            other != idx
                && other != besides
                && !state.drawn.contains(&other)
                && !self.played(idx, other)
        })
    }

    /// Break an existing board so a cornered player gets a fresh opponent.
    /// The broken board's other member goes back into the undrawn pool.
    fn rescue(&self, state: &mut DrawState, idx: usize) -> Result<(), PairingError> {
        let mut chosen = None;
        let mut fallback = None;

        'search: for pos in state.positions(SearchOrder::MostRecentFirst) {
            let Board::Match(a, b) = state.boards[pos] else {
                continue;
            };

            for (kept, freed) in [(a, b), (b, a)] {
                if self.played(kept, idx) {
                    continue;
                }
                if self.has_matchable_besides(state, freed, idx) {
                    chosen = Some((pos, kept, freed));
                    break 'search;
                }
                fallback.get_or_insert((pos, kept, freed));
            }
        }

        let Some((pos, kept, freed)) = chosen.or(fallback) else {
            return Err(PairingError::impossible(format!(
                "player {} has no remaining opponent",
                self.players[idx].id
            )));
        };

        warn!(
            player = self.players[idx].id,
            kept = self.players[kept].id,
            freed = self.players[freed].id,
            "Breaking an existing pairing to place a cornered player"
        );

        state.boards.remove(pos);
        state.boards.push(Board::Match(kept, idx));
        state.drawn.remove(&freed);
        state.drawn.insert(idx);
        if state.pending == Some(idx) {
            state.pending = None;
        }
        state.changes += 1;
        Ok(())
    }

    /// Give the stranded player a real opponent by handing the bye to a
    /// member of an existing board instead. The accepted score gap widens
    /// one point at a time up to the field's spread.
    fn swap(&self, state: &mut DrawState, idx: usize) -> Result<(), PairingError> {
        for delta in 0..=self.spread {
            let Some((pos, kept, displaced)) =
                self.swap_candidate(state, idx, delta, SearchOrder::MostRecentFirst)
            else {
                continue;
            };

            debug!(
                stranded = self.players[idx].id,
                kept = self.players[kept].id,
                displaced = self.players[displaced].id,
                delta,
                "Swapping bye"
            );

            state.boards[pos] = Board::Match(kept, idx);
            state.boards.push(Board::Bye(displaced));
            state.drawn.insert(idx);
            state.changes += 1;
            return Ok(());
        }

        Err(PairingError::impossible(format!(
            "player {} already had a bye and no pairing can give it up",
            self.players[idx].id
        )))
    }

    fn swap_candidate(
        &self,
        state: &DrawState,
        idx: usize,
        delta: u32,
        order: SearchOrder,
    ) -> Option<(usize, usize, usize)> {
        let stranded = &self.players[idx];

        state.positions(order).into_iter().find_map(|pos| {
            let Board::Match(a, b) = state.boards[pos] else {
                return None;
            };

            [(a, b), (b, a)]
                .into_iter()
                .find(|&(kept, other)| {
                    (self.players[kept].score - stranded.score).abs() <= f64::from(delta)
                        && !self.played(kept, idx)
                        && !self.already_bye.contains(&self.players[other].id)
                })
                .map(|(kept, other)| (pos, kept, other))
        })
    }

    fn played(&self, a: usize, b: usize) -> bool {
        self.history.played(self.players[a].id, self.players[b].id)
    }

    fn to_pairing(&self, board: Board) -> Pairing {
        match board {
            Board::Match(a, b) => {
                let (a, b) = (&self.players[a], &self.players[b]);
                Pairing::new(a.id, &a.name, b.id, &b.name)
            }
            Board::Bye(a) => Pairing::bye(self.players[a].id, &self.players[a].name),
        }
    }
}
