//! In-memory tournament: player registration, match reporting and standings.
//!
//! This is the collaborator the pairing engine expects: it aggregates the
//! standings and history the engine consumes and records the results of the
//! pairings it produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{MatchRecord, Pairing, PlayerId, PlayerStanding, BYE_OPPONENT};
use crate::pairing::{self, PairingEngine, PairingError};
use crate::storage::{EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError};

/// Tournament errors.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Unknown player id {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} cannot be matched against themselves")]
    SelfMatch(PlayerId),

    #[error(transparent)]
    Pairing(#[from] PairingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result of a single match, from the first player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    PlayerAWins,
    Tie,
    PlayerBWins,
}

/// A registered player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredPlayer {
    pub id: PlayerId,
    pub name: String,
    pub registered_at: DateTime<Utc>,
}

/// A reported match. Byes are stored with `player_b == 0` and count as a win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedMatch {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub outcome: MatchOutcome,
    pub reported_at: DateTime<Utc>,
}

impl ReportedMatch {
    pub fn record(&self) -> MatchRecord {
        MatchRecord::new(self.player_a, self.player_b)
    }
}

/// A single tournament's registrations and results.
#[derive(Debug, Clone)]
pub struct Tournament {
    name: String,
    players: Vec<RegisteredPlayer>,
    matches: Vec<ReportedMatch>,
}

impl Tournament {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            players: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a player and return their serial id (starting at 1).
    pub fn register_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = self.players.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let name = name.into();

        debug!(id, name = %name, "Registered player");
        self.players.push(RegisteredPlayer {
            id,
            name,
            registered_at: Utc::now(),
        });
        id
    }

    pub fn count_players(&self) -> usize {
        self.players.len()
    }

    pub fn delete_matches(&mut self) {
        self.matches.clear();
    }

    /// Remove every player, and with them every match.
    pub fn delete_players(&mut self) {
        self.players.clear();
        self.matches.clear();
    }

    fn ensure_registered(&self, id: PlayerId) -> Result<(), TournamentError> {
        if self.players.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(TournamentError::UnknownPlayer(id))
        }
    }

    /// Record the outcome of a match between two registered players.
    pub fn report_match(
        &mut self,
        player_a: PlayerId,
        player_b: PlayerId,
        outcome: MatchOutcome,
    ) -> Result<(), TournamentError> {
        if player_a == player_b {
            return Err(TournamentError::SelfMatch(player_a));
        }
        self.ensure_registered(player_a)?;
        self.ensure_registered(player_b)?;

        self.matches.push(ReportedMatch {
            player_a,
            player_b,
            outcome,
            reported_at: Utc::now(),
        });
        Ok(())
    }

    /// Record a bye round, scored as a win.
    pub fn report_bye(&mut self, player: PlayerId) -> Result<(), TournamentError> {
        self.ensure_registered(player)?;

        self.matches.push(ReportedMatch {
            player_a: player,
            player_b: BYE_OPPONENT,
            outcome: MatchOutcome::PlayerAWins,
            reported_at: Utc::now(),
        });
        Ok(())
    }

    /// Record a whole round, asking `outcome` for the result of each board.
    /// Byes are recorded without consulting it.
    pub fn report_round(
        &mut self,
        pairings: &[Pairing],
        mut outcome: impl FnMut(&Pairing) -> MatchOutcome,
    ) -> Result<(), TournamentError> {
        for pairing in pairings {
            if pairing.is_bye() {
                self.report_bye(pairing.id1)?;
            } else {
                let result = outcome(pairing);
                self.report_match(pairing.id1, pairing.id2, result)?;
            }
        }

        debug!(
            tournament = %self.name,
            boards = pairings.len(),
            "Reported round"
        );
        Ok(())
    }

    /// Standings sorted by wins, then ties, both descending. Players level
    /// on both keep their registration order.
    pub fn standings(&self) -> Vec<PlayerStanding> {
        let mut standings: Vec<PlayerStanding> = self
            .players
            .iter()
            .map(|p| PlayerStanding::new(p.id, p.name.clone(), 0, 0, 0))
            .collect();

        for m in &self.matches {
            for (id, won) in [
                (m.player_a, MatchOutcome::PlayerAWins),
                (m.player_b, MatchOutcome::PlayerBWins),
            ] {
                // byes have no second row
                let Some(row) = standings.iter_mut().find(|s| s.id == id) else {
                    continue;
                };
                row.matches_played += 1;
                if m.outcome == won {
                    row.wins += 1;
                } else if m.outcome == MatchOutcome::Tie {
                    row.ties += 1;
                }
            }
        }

        standings.sort_by(|a, b| b.wins.cmp(&a.wins).then(b.ties.cmp(&a.ties)));
        standings
    }

    /// Every reported match as an unordered pair.
    pub fn history(&self) -> Vec<MatchRecord> {
        self.matches.iter().map(ReportedMatch::record).collect()
    }

    pub fn rounds_played(&self) -> u32 {
        pairing::rounds_played(&self.standings())
    }

    /// Pairings for the next round. Empty once every round has been played.
    pub fn swiss_pairings(&self, engine: &PairingEngine) -> Result<Vec<Pairing>, TournamentError> {
        Ok(engine.get_pairings(&self.standings(), &self.history())?)
    }

    /// Load a tournament from the data dir. Missing files load as empty.
    pub fn load(config: &StorageConfig, name: &str) -> Result<Self, TournamentError> {
        let players: Vec<RegisteredPlayer> =
            JsonlReader::for_entity(config, EntityType::Player, name)?.read_all()?;
        let matches: Vec<ReportedMatch> =
            JsonlReader::for_entity(config, EntityType::Match, name)?.read_all()?;

        debug!(
            tournament = name,
            players = players.len(),
            matches = matches.len(),
            "Loaded tournament"
        );
        Ok(Self {
            name: name.to_string(),
            players,
            matches,
        })
    }

    /// Write the tournament's players and matches, replacing stored files.
    pub fn save(&self, config: &StorageConfig) -> Result<(), TournamentError> {
        JsonlWriter::for_entity(config, EntityType::Player, &self.name)?.write_all(&self.players)?;
        JsonlWriter::for_entity(config, EntityType::Match, &self.name)?.write_all(&self.matches)?;

        info!(
            tournament = %self.name,
            players = self.players.len(),
            matches = self.matches.len(),
            "Saved tournament"
        );
        Ok(())
    }
}
