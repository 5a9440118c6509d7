use rand::Rng;

use crate::config::{FOOD_RESAMPLE_ATTEMPTS, GridSize};
use crate::snake::{Position, Snake};

/// Picks a cell not occupied by the snake, uniformly over the free cells.
///
/// Random draws are tried first since the board is usually mostly empty.
/// After [`FOOD_RESAMPLE_ATTEMPTS`] misses the free cells are enumerated
/// and one is chosen directly. Returns `None` when the snake covers the
/// whole board.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
) -> Option<Position> {
    if snake.len() >= bounds.total_cells() {
        return None;
    }

    for _ in 0..FOOD_RESAMPLE_ATTEMPTS {
        let candidate = random_cell(rng, bounds);
        if !snake.occupies(candidate) {
            return Some(candidate);
        }
    }

    log::warn!(
        "food placement missed {FOOD_RESAMPLE_ATTEMPTS} random draws, enumerating free cells"
    );

    let candidates = free_cells(bounds, snake);
    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R, bounds: GridSize) -> Position {
    Position {
        x: rng.gen_range(0..i32::from(bounds.width)),
        y: rng.gen_range(0..i32::from(bounds.height)),
    }
}

fn free_cells(bounds: GridSize, snake: &Snake) -> Vec<Position> {
    let mut candidates = Vec::new();

    for y in 0..i32::from(bounds.height) {
        for x in 0..i32::from(bounds.width) {
            let position = Position { x, y };
            if !snake.occupies(position) {
                candidates.push(position);
            }
        }
    }

    candidates
}
