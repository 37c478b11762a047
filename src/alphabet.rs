//! Random cell-string and grid generation.
//!
//! Every cell string is 3 symbols drawn independently and uniformly from one
//! alphabet. Grids are always fully random here; relation structure is
//! layered on afterwards by [`crate::relation`].

use rand::rngs::SmallRng;
use rand::Rng;

use crate::constants::GRID_CELLS;
use crate::types::{CellString, Grid};

/// Draw one symbol uniformly from the alphabet.
#[inline(always)]
pub fn random_symbol(alphabet: &[u8], rng: &mut SmallRng) -> u8 {
    alphabet[rng.random_range(0..alphabet.len())]
}

/// Draw a 3-symbol cell string, each symbol independent and uniform.
pub fn random_cell(alphabet: &[u8], rng: &mut SmallRng) -> CellString {
    CellString([
        random_symbol(alphabet, rng),
        random_symbol(alphabet, rng),
        random_symbol(alphabet, rng),
    ])
}

/// Draw a full 9-cell random grid.
pub fn random_grid(alphabet: &[u8], rng: &mut SmallRng) -> Grid {
    std::array::from_fn(|_| random_cell(alphabet, rng))
}

/// Whether every symbol of every cell belongs to the alphabet.
pub fn grid_in_alphabet(grid: &Grid, alphabet: &[u8]) -> bool {
    debug_assert_eq!(grid.len(), GRID_CELLS);
    grid.iter()
        .all(|cell| cell.0.iter().all(|s| alphabet.contains(s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CONSONANTS, DIGITS};
    use rand::SeedableRng;

    #[test]
    fn test_random_grid_well_formed() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let g = random_grid(&CONSONANTS, &mut rng);
            assert!(grid_in_alphabet(&g, &CONSONANTS));
            assert!(!grid_in_alphabet(&g, &DIGITS));
        }
    }

    #[test]
    fn test_random_symbol_covers_alphabet() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut seen = [false; 10];
        for _ in 0..1000 {
            let s = random_symbol(&DIGITS, &mut rng);
            let pos = DIGITS.iter().position(|&d| d == s).expect("in alphabet");
            seen[pos] = true;
        }
        assert!(seen.iter().all(|&s| s), "1000 draws should hit all 10 symbols");
    }
}
