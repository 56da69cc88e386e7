//! Food placement

use rand::Rng;

use super::state::Cell;

/// Random draws before falling back to sampling from the free cells
const MAX_REJECTION_TRIES: u32 = 64;

/// Pick a uniformly random free cell, or `None` when the grid is full.
///
/// Rejection sampling first (cheap while the snake is short), then a pick
/// from the explicit set difference so termination never depends on luck.
pub fn generate_food<R: Rng>(rng: &mut R, grid: i32, occupied: &[Cell]) -> Option<Cell> {
    if grid <= 0 {
        return None;
    }

    for _ in 0..MAX_REJECTION_TRIES {
        let cell = Cell::new(rng.random_range(0..grid), rng.random_range(0..grid));
        if !occupied.contains(&cell) {
            return Some(cell);
        }
    }

    let free: Vec<Cell> = (0..grid)
        .flat_map(|y| (0..grid).map(move |x| Cell::new(x, y)))
        .filter(|cell| !occupied.contains(cell))
        .collect();

    if free.is_empty() {
        None
    } else {
        Some(free[rng.random_range(0..free.len())])
    }
}
