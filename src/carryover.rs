//! Trial-to-trial persistence: carrying cell strings over from the previous
//! grid.
//!
//! Carryover is applied after relation and interference insertion, so a
//! carried cell can incidentally destroy or create a pattern. That is the
//! point of the manipulation — it is what produces proactive-interference
//! load across trials.
//!
//! The count policy is split from the mixing step so tests can inject a
//! fixed count: [`carryover_count`] is the only randomized policy decision,
//! [`apply_carryover`] takes the count it is given.

use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::Rng;

use crate::constants::{CARRYOVER_MAX, CARRYOVER_MIN, GRID_CELLS};
use crate::types::{Grid, WmLoadMode};

/// How many cells carry over, as a function of the working-memory-load mode.
///
/// - easy: always 4
/// - medium: uniform 1–4 (the original study's policy)
/// - hard: 0 or 1, even odds
/// - extreme: never
pub fn carryover_count(mode: WmLoadMode, rng: &mut SmallRng) -> usize {
    match mode {
        WmLoadMode::Easy => CARRYOVER_MAX,
        WmLoadMode::Medium => rng.random_range(CARRYOVER_MIN..=CARRYOVER_MAX),
        WmLoadMode::Hard => usize::from(rng.random_bool(0.5)),
        WmLoadMode::Extreme => 0,
    }
}

/// Overwrite `count` cells of `grid`, chosen uniformly without replacement,
/// with the same-index cells of `previous`. Returns the chosen indices
/// (sorted) for observability in tests.
pub fn apply_carryover(
    grid: &mut Grid,
    previous: &Grid,
    count: usize,
    rng: &mut SmallRng,
) -> Vec<usize> {
    let count = count.min(GRID_CELLS);
    let mut indices: Vec<usize> = sample(rng, GRID_CELLS, count).iter().collect();
    indices.sort_unstable();
    for &idx in &indices {
        grid[idx] = previous[idx];
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::random_grid;
    use crate::constants::{CONSONANTS, DIGITS};
    use rand::SeedableRng;

    #[test]
    fn test_policy_bounds() {
        let mut rng = SmallRng::seed_from_u64(20);
        for _ in 0..200 {
            assert_eq!(carryover_count(WmLoadMode::Easy, &mut rng), 4);
            assert_eq!(carryover_count(WmLoadMode::Extreme, &mut rng), 0);
            let medium = carryover_count(WmLoadMode::Medium, &mut rng);
            assert!((1..=4).contains(&medium));
            let hard = carryover_count(WmLoadMode::Hard, &mut rng);
            assert!(hard <= 1);
        }
    }

    #[test]
    fn test_apply_copies_exactly_count_cells() {
        // Disjoint alphabets guarantee carried cells are distinguishable.
        let mut rng = SmallRng::seed_from_u64(21);
        for _ in 0..100 {
            let previous = random_grid(&DIGITS, &mut rng);
            let mut grid = random_grid(&CONSONANTS, &mut rng);
            let picked = apply_carryover(&mut grid, &previous, 4, &mut rng);
            assert_eq!(picked.len(), 4);
            let carried = grid
                .iter()
                .zip(previous.iter())
                .filter(|(g, p)| g == p)
                .count();
            assert_eq!(carried, 4);
        }
    }

    #[test]
    fn test_zero_count_is_identity() {
        let mut rng = SmallRng::seed_from_u64(22);
        let previous = random_grid(&DIGITS, &mut rng);
        let original = random_grid(&CONSONANTS, &mut rng);
        let mut grid = original;
        apply_carryover(&mut grid, &previous, 0, &mut rng);
        assert_eq!(grid, original);
    }
}
