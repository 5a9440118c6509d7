use std::collections::VecDeque;

use crate::config::{GridSize, INITIAL_SNAKE_LENGTH};
use crate::input::{Direction, direction_change_is_valid};

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns this position wrapped into bounds on both axes.
    #[must_use]
    pub fn wrapped(self, bounds: GridSize) -> Self {
        Self {
            x: self.x.rem_euclid(i32::from(bounds.width)),
            y: self.y.rem_euclid(i32::from(bounds.height)),
        }
    }

    /// Returns the neighbouring cell in `direction`, re-entering from the
    /// opposite edge when the move leaves the board.
    #[must_use]
    pub fn neighbour(self, direction: Direction, bounds: GridSize) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
        .wrapped(bounds)
    }
}

/// Snake body plus the applied and pending movement directions.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
    pending_direction: Option<Direction>,
}

impl Snake {
    /// Creates the starting snake: head at the board centre, body trailing
    /// to the left, moving right.
    #[must_use]
    pub fn centered(bounds: GridSize) -> Self {
        let head = Position {
            x: i32::from(bounds.width / 2),
            y: i32::from(bounds.height / 2),
        };

        let mut segments = Vec::with_capacity(INITIAL_SNAKE_LENGTH);
        let mut segment = head;
        for _ in 0..INITIAL_SNAKE_LENGTH {
            segments.push(segment);
            segment = segment.neighbour(Direction::Left, bounds);
        }

        Self::from_segments(segments, Direction::Right)
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// # Panics
    ///
    /// Panics when `segments` is empty.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>, direction: Direction) -> Self {
        assert!(!segments.is_empty(), "snake needs at least one segment");

        Self {
            body: VecDeque::from(segments),
            direction,
            pending_direction: None,
        }
    }

    /// Stores `direction` for the next tick unless it reverses the applied
    /// direction. Returns whether the request was kept.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if !direction_change_is_valid(self.direction, direction) {
            return false;
        }

        self.pending_direction = Some(direction);
        true
    }

    /// Promotes the pending direction to the applied one and returns the
    /// direction this tick moves in.
    pub fn commit_direction(&mut self) -> Direction {
        if let Some(next) = self.pending_direction.take() {
            if direction_change_is_valid(self.direction, next) {
                self.direction = next;
            }
        }

        self.direction
    }

    /// Returns the head position after one move in the applied direction.
    #[must_use]
    pub fn next_head_position(&self, bounds: GridSize) -> Position {
        self.head().neighbour(self.direction, bounds)
    }

    /// Adds a new head segment.
    pub fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    /// Drops the tail segment, keeping at least the head.
    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; a snake keeps at least its head.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the direction used by the most recent move.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the direction queued for the next move, if any.
    #[must_use]
    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}
