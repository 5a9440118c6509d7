use thiserror::Error;

/// Default board width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 20;

/// Default board height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 20;

/// Smallest accepted board dimension: a 3-cell snake plus room for food.
pub const MIN_GRID_DIMENSION: u16 = 3;

/// Segment count of a freshly reset snake.
pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// Tick interval at the start of every session.
pub const INITIAL_TICK_INTERVAL_MS: u64 = 200;

/// Fastest tick interval the speed progression may reach.
pub const MIN_TICK_INTERVAL_MS: u64 = 50;

/// Amount the tick interval shrinks at each speed step.
pub const TICK_INTERVAL_STEP_MS: u64 = 10;

/// Score needed per speed step.
pub const POINTS_PER_SPEED_STEP: u32 = 5;

/// Speed level shown at the initial tick interval.
pub const INITIAL_SPEED_LEVEL: u64 = 5;

/// Speed levels gained per speed step.
pub const SPEED_LEVELS_PER_STEP: u64 = 2;

/// Random draws attempted before food placement enumerates free cells.
pub const FOOD_RESAMPLE_ATTEMPTS: usize = 64;

/// Errors raised while building a game configuration.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "board must be at least {min}x{min} and at most {max}x{max} cells, got {cols}x{rows}",
        min = MIN_GRID_DIMENSION,
        max = u16::MAX
    )]
    InvalidDimensions { cols: usize, rows: usize },
}

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Validates `cols` x `rows` and returns the board size.
    pub fn new(cols: usize, rows: usize) -> Result<Self, ConfigError> {
        let invalid = ConfigError::InvalidDimensions { cols, rows };
        let width = u16::try_from(cols).map_err(|_| invalid)?;
        let height = u16::try_from(rows).map_err(|_| invalid)?;

        if width < MIN_GRID_DIMENSION || height < MIN_GRID_DIMENSION {
            return Err(invalid);
        }

        Ok(Self { width, height })
    }

    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
        }
    }
}
