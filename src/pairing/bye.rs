//! Bye tracking for odd fields.

use std::collections::HashSet;

use crate::models::{MatchRecord, PlayerId};

/// Ids that already received a bye. Even fields never award byes, so the
/// set is empty for them.
pub fn already_bye(player_count: usize, history: &[MatchRecord]) -> HashSet<PlayerId> {
    if player_count % 2 == 0 {
        return HashSet::new();
    }

    history
        .iter()
        .filter(|record| record.is_bye())
        .map(|record| record.player_a)
        .collect()
}
