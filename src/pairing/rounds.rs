//! Round counting for a Swiss tournament.

/// Minimum number of rounds for `player_count` players: the exponent of the
/// smallest power of two that is at least `player_count`.
///
/// A single player (or an empty field) plays no rounds.
pub fn compute_total_rounds(player_count: usize) -> u32 {
    player_count.next_power_of_two().trailing_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_player_plays_no_rounds() {
        assert_eq!(compute_total_rounds(1), 0);
    }

    #[test]
    fn test_powers_of_two() {
        assert_eq!(compute_total_rounds(2), 1);
        assert_eq!(compute_total_rounds(4), 2);
        assert_eq!(compute_total_rounds(8), 3);
        assert_eq!(compute_total_rounds(64), 6);
    }

    #[test]
    fn test_padded_counts() {
        assert_eq!(compute_total_rounds(3), 2);
        assert_eq!(compute_total_rounds(5), 3);
        assert_eq!(compute_total_rounds(9), 4);
        assert_eq!(compute_total_rounds(33), 6);
    }

    #[test]
    fn test_rounds_bound_player_count() {
        for n in 2..=200usize {
            let r = compute_total_rounds(n);
            assert!(1usize << r >= n, "2^{} < {}", r, n);
            assert!(1usize << (r - 1) < n, "2^({}-1) >= {}", r, n);
        }
    }
}
