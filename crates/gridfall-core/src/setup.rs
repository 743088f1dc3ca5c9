//! Helpers for assembling a new game: board sizing and random starting
//! placements.

use chrono::{DateTime, Utc};
use gridfall_types::{Action, GameEvent, PlayerIndex};
use rand::Rng;
use rand::seq::SliceRandom;

/// Board cells per player when sizing a board.
const BOARD_CELLS_PER_PLAYER: u64 = 14;

/// Cells per player in the synthetic grid used for starting placements.
const PLACEMENT_CELLS_PER_PLAYER: u64 = 16;

/// Smallest `k` with `k * k >= n`.
const fn ceil_sqrt(n: u64) -> u64 {
    let root = n.isqrt();
    if root.saturating_mul(root) < n {
        root.saturating_add(1)
    } else {
        root
    }
}

/// Edge length of a square board for `player_count` players:
/// `ceil(sqrt(14 * player_count))`.
pub fn calc_dimensions(player_count: usize) -> u32 {
    let players = u64::try_from(player_count).unwrap_or(u64::MAX);
    let edge = ceil_sqrt(players.saturating_mul(BOARD_CELLS_PER_PLAYER));
    u32::try_from(edge).unwrap_or(u32::MAX)
}

/// One `PLACE` event per player `0..n`, at distinct random cells, using the
/// thread-local RNG.
///
/// Not reproducible; see [`initial_placement_with`] for a seeded variant.
pub fn initial_placement(n: usize, submitted_at: DateTime<Utc>) -> Vec<GameEvent> {
    initial_placement_with(&mut rand::rng(), n, submitted_at)
}

/// One `PLACE` event per player `0..n`, at distinct cells drawn from `rng`.
///
/// Cells come from a shuffled synthetic grid of `ceil(sqrt(16 * n))` cells
/// per side. That grid is larger than a [`calc_dimensions`] board, so
/// callers placing onto such a board must expect some placements to be
/// rejected as out of bounds.
pub fn initial_placement_with<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    submitted_at: DateTime<Utc>,
) -> Vec<GameEvent> {
    let players = u64::try_from(n).unwrap_or(u64::MAX);
    let side = i64::try_from(ceil_sqrt(players.saturating_mul(PLACEMENT_CELLS_PER_PLAYER)))
        .unwrap_or(i64::MAX);

    let mut cells: Vec<(i64, i64)> = (0..side)
        .flat_map(|row| (0..side).map(move |col| (row, col)))
        .collect();
    let (chosen, _) = cells.partial_shuffle(rng, n);

    chosen
        .iter()
        .enumerate()
        .map(|(player, &(row, col))| {
            GameEvent::new(
                submitted_at,
                Action::Place {
                    player: PlayerIndex(player),
                    row,
                    col,
                },
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreachable, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn dimensions_round_up() {
        assert_eq!(calc_dimensions(0), 0);
        assert_eq!(calc_dimensions(1), 4); // sqrt(14) = 3.74
        assert_eq!(calc_dimensions(2), 6); // sqrt(28) = 5.29
        assert_eq!(calc_dimensions(14), 14); // sqrt(196) = 14 exactly
        assert_eq!(calc_dimensions(20), 17); // sqrt(280) = 16.73
    }

    #[test]
    fn placements_are_distinct_and_in_grid() {
        let mut rng = StdRng::seed_from_u64(7);
        let at = Utc::now();
        let events = initial_placement_with(&mut rng, 25, at);
        assert_eq!(events.len(), 25);

        let mut cells = BTreeSet::new();
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.submitted_at, at);
            let Action::Place { player, row, col } = event.action else {
                unreachable!("only placements are produced");
            };
            assert_eq!(player, PlayerIndex(i));
            // ceil(sqrt(16 * 25)) = 20
            assert!((0..20).contains(&row) && (0..20).contains(&col));
            assert!(cells.insert((row, col)));
        }
    }

    #[test]
    fn seeded_placements_are_reproducible() {
        let at = Utc::now();
        let a = initial_placement_with(&mut StdRng::seed_from_u64(42), 10, at);
        let b = initial_placement_with(&mut StdRng::seed_from_u64(42), 10, at);
        assert_eq!(a, b);
    }

    #[test]
    fn thread_rng_placement_covers_every_player() {
        assert_eq!(initial_placement(3, Utc::now()).len(), 3);
        assert!(initial_placement(0, Utc::now()).is_empty());
    }
}
