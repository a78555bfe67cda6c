//! Round pairing model.

use serde::{Deserialize, Serialize};

use super::{MatchRecord, PlayerId, PlayerStanding, BYE_OPPONENT};

/// A pairing for the next round. `id2 == 0` with no `name2` is a bye for `id1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    /// First player id
    pub id1: PlayerId,

    /// First player name
    pub name1: String,

    /// Second player id, or 0 for a bye
    pub id2: PlayerId,

    /// Second player name, absent for a bye
    pub name2: Option<String>,
}

impl Pairing {
    /// Pair two players against each other.
    pub fn new(id1: PlayerId, name1: impl Into<String>, id2: PlayerId, name2: impl Into<String>) -> Self {
        Self {
            id1,
            name1: name1.into(),
            id2,
            name2: Some(name2.into()),
        }
    }

    /// Award a bye to a single player.
    pub fn bye(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id1: id,
            name1: name.into(),
            id2: BYE_OPPONENT,
            name2: None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.id2 == BYE_OPPONENT
    }

}

/// Input document for a one-shot pairing request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairingRequest {
    pub standings: Vec<PlayerStanding>,

    #[serde(default)]
    pub history: Vec<MatchRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_creation() {
        let pairing = Pairing::new(1, "Alice", 2, "Bob");

        assert!(!pairing.is_bye());
        assert_eq!((pairing.id1, pairing.id2), (1, 2));
        assert_eq!(pairing.name2.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_bye_pairing() {
        let pairing = Pairing::bye(5, "Eve");

        assert!(pairing.is_bye());
        assert_eq!(pairing.id1, 5);
        assert_eq!(pairing.id2, BYE_OPPONENT);
        assert_eq!(pairing.name2, None);
    }

    #[test]
    fn test_bye_serializes_null_name() {
        let json = serde_json::to_string(&Pairing::bye(5, "Eve")).unwrap();
        assert_eq!(json, r#"{"id1":5,"name1":"Eve","id2":0,"name2":null}"#);
    }

    #[test]
    fn test_request_history_defaults_empty() {
        let request: PairingRequest = serde_json::from_str(
            r#"{"standings":[{"id":1,"name":"A","wins":0,"ties":0,"matches_played":0}]}"#,
        )
        .unwrap();

        assert_eq!(request.standings.len(), 1);
        assert!(request.history.is_empty());
    }
}
