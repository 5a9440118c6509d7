use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{
    ConfigError, GridSize, INITIAL_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS, POINTS_PER_SPEED_STEP,
    TICK_INTERVAL_STEP_MS,
};
use crate::food::spawn_position;
use crate::input::Direction;
use crate::score::ScoreStore;
use crate::snake::{Position, Snake};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

/// Outcome of one simulation tick.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StepResult {
    /// The snake moved; carries the updated view.
    Continue(GameView),
    /// The head ran into the body. The session is stopped.
    GameOver { final_score: u32 },
    /// The session is not running, nothing changed.
    Idle,
}

/// Read-only snapshot handed to renderers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GameView {
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub score: u32,
    pub best_score: u32,
    pub speed_ms: u64,
    pub run_state: RunState,
    pub bounds: GridSize,
    pub game_over: bool,
}

/// Complete mutable game state for one session.
pub struct GameState {
    snake: Snake,
    food: Option<Position>,
    score: u32,
    best_score: u32,
    speed_ms: u64,
    run_state: RunState,
    game_over: bool,
    tick_count: u64,
    bounds: GridSize,
    rng: StdRng,
    store: Box<dyn ScoreStore>,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("snake", &self.snake)
            .field("food", &self.food)
            .field("score", &self.score)
            .field("best_score", &self.best_score)
            .field("speed_ms", &self.speed_ms)
            .field("run_state", &self.run_state)
            .field("game_over", &self.game_over)
            .field("tick_count", &self.tick_count)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Creates a stopped session on a `cols` x `rows` board seeded from OS entropy.
    pub fn new(cols: usize, rows: usize, store: Box<dyn ScoreStore>) -> Result<Self, ConfigError> {
        let bounds = GridSize::new(cols, rows)?;
        Ok(Self::with_rng(bounds, store, StdRng::from_entropy()))
    }

    /// Creates a deterministic state for tests and reproducible simulations.
    pub fn new_with_seed(
        cols: usize,
        rows: usize,
        store: Box<dyn ScoreStore>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let bounds = GridSize::new(cols, rows)?;
        Ok(Self::with_rng(bounds, store, StdRng::seed_from_u64(seed)))
    }

    fn with_rng(bounds: GridSize, mut store: Box<dyn ScoreStore>, rng: StdRng) -> Self {
        let best_score = store.load_best_score().unwrap_or_else(|error| {
            log::warn!("failed to load best score, starting from 0: {error}");
            0
        });

        let mut state = Self {
            snake: Snake::centered(bounds),
            food: None,
            score: 0,
            best_score,
            speed_ms: INITIAL_TICK_INTERVAL_MS,
            run_state: RunState::Stopped,
            game_over: false,
            tick_count: 0,
            bounds,
            rng,
            store,
        };
        state.reset();
        state
    }

    /// Puts a fresh snake and food on the board and stops the session.
    pub fn reset(&mut self) {
        self.run_state = RunState::Stopped;
        self.game_over = false;
        self.snake = Snake::centered(self.bounds);
        self.score = 0;
        self.speed_ms = INITIAL_TICK_INTERVAL_MS;
        self.tick_count = 0;
        self.place_food();

        log::debug!(
            "board reset: {}x{}, head at {:?}",
            self.bounds.width,
            self.bounds.height,
            self.snake.head()
        );
    }

    /// Queues a direction for the next tick.
    ///
    /// Reversals of the direction applied by the last tick are ignored.
    pub fn set_direction(&mut self, direction: Direction) {
        if !self.snake.request_direction(direction) {
            log::trace!("ignored reversal {direction:?}");
        }
    }

    /// Advances simulation by one gameplay tick.
    pub fn step(&mut self) -> StepResult {
        if self.run_state != RunState::Running {
            return StepResult::Idle;
        }

        self.tick_count += 1;
        self.snake.commit_direction();
        let next_head = self.snake.next_head_position(self.bounds);

        // Tested against the body before the tail moves.
        if self.snake.occupies(next_head) {
            let final_score = self.score;
            self.record_score();
            self.run_state = RunState::Stopped;
            self.game_over = true;
            log::info!(
                "game over after {} ticks with score {final_score}",
                self.tick_count
            );
            return StepResult::GameOver { final_score };
        }

        self.snake.push_head(next_head);

        if self.food == Some(next_head) {
            self.score += 1;
            self.record_score();
            self.place_food();
            self.update_speed();
        } else {
            self.snake.pop_tail();
        }

        StepResult::Continue(self.view())
    }

    /// Starts a stopped session. A board left by a game over is reset first.
    pub fn start(&mut self) {
        if self.run_state != RunState::Stopped {
            return;
        }

        if self.game_over {
            self.reset();
        }

        self.run_state = RunState::Running;
        log::debug!("session started");
    }

    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
            log::debug!("session paused");
        }
    }

    pub fn resume(&mut self) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
            log::debug!("session resumed");
        }
    }

    /// Pauses a running session or resumes a paused one.
    pub fn toggle_pause(&mut self) {
        match self.run_state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Stopped => {}
        }
    }

    /// Returns a snapshot of everything a renderer needs.
    #[must_use]
    pub fn view(&self) -> GameView {
        GameView {
            snake: self.snake.segments().copied().collect(),
            food: self.food,
            score: self.score,
            best_score: self.best_score,
            speed_ms: self.speed_ms,
            run_state: self.run_state,
            bounds: self.bounds,
            game_over: self.game_over,
        }
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[must_use]
    pub fn food(&self) -> Option<Position> {
        self.food
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Current tick interval in milliseconds.
    #[must_use]
    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// True from a game over until the next reset.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.bounds
    }

    /// Replaces the snake, keeping the current food.
    ///
    /// Test hook for staging positions: nothing re-checks that the food
    /// stays off the new body.
    #[doc(hidden)]
    pub fn set_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    /// Moves the food to `position` without checking the snake.
    ///
    /// Test hook for staging positions, like [`GameState::set_snake`].
    #[doc(hidden)]
    pub fn set_food(&mut self, position: Option<Position>) {
        self.food = position;
    }

    fn place_food(&mut self) {
        self.food = spawn_position(&mut self.rng, self.bounds, &self.snake);
        if self.food.is_none() {
            log::info!("snake covers the whole board, no food left to place");
        }
    }

    fn record_score(&mut self) {
        if self.score <= self.best_score {
            return;
        }

        self.best_score = self.score;
        log::info!("new best score {}", self.best_score);
        if let Err(error) = self.store.save_best_score(self.best_score) {
            log::warn!("failed to save best score: {error}");
        }
    }

    fn update_speed(&mut self) {
        if self.score == 0 || self.score % POINTS_PER_SPEED_STEP != 0 {
            return;
        }

        if self.speed_ms > MIN_TICK_INTERVAL_MS {
            self.speed_ms = self
                .speed_ms
                .saturating_sub(TICK_INTERVAL_STEP_MS)
                .max(MIN_TICK_INTERVAL_MS);
            log::debug!("speed increased, tick interval now {}ms", self.speed_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use crate::config::ConfigError;
    use crate::input::Direction;
    use crate::score::{MemoryScoreStore, ScoreStore};
    use crate::snake::{Position, Snake};

    use super::{GameState, RunState, StepResult};

    /// Store whose saves are observable from the test after the state owns it.
    #[derive(Clone, Default)]
    struct SharedStore {
        saves: Rc<RefCell<Vec<u32>>>,
        initial: u32,
    }

    impl ScoreStore for SharedStore {
        fn load_best_score(&mut self) -> io::Result<u32> {
            Ok(self.initial)
        }

        fn save_best_score(&mut self, score: u32) -> io::Result<()> {
            self.saves.borrow_mut().push(score);
            Ok(())
        }
    }

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn load_best_score(&mut self) -> io::Result<u32> {
            Err(io::Error::other("unreadable"))
        }

        fn save_best_score(&mut self, _score: u32) -> io::Result<()> {
            Err(io::Error::other("read-only"))
        }
    }

    fn running_state(cols: usize, rows: usize, seed: u64) -> GameState {
        let mut state =
            GameState::new_with_seed(cols, rows, Box::new(MemoryScoreStore::default()), seed)
                .expect("board should be valid");
        state.start();
        state
    }

    fn pos(x: i32, y: i32) -> Position {
        Position { x, y }
    }

    #[test]
    fn degenerate_board_is_rejected() {
        let result = GameState::new(2, 20, Box::new(MemoryScoreStore::default()));
        assert_eq!(
            result.err(),
            Some(ConfigError::InvalidDimensions { cols: 2, rows: 20 })
        );
    }

    #[test]
    fn reset_centres_a_three_cell_snake() {
        let state = GameState::new_with_seed(20, 20, Box::new(MemoryScoreStore::default()), 1)
            .expect("board should be valid");

        let view = state.view();
        assert_eq!(view.snake, vec![pos(10, 10), pos(9, 10), pos(8, 10)]);
        assert_eq!(view.run_state, RunState::Stopped);
        assert_eq!(view.score, 0);
        assert_eq!(view.speed_ms, 200);
        assert_eq!(state.snake().direction(), Direction::Right);
        let food = view.food.expect("food should be placed");
        assert!(!view.snake.contains(&food));
    }

    #[test]
    fn step_moves_the_snake_without_food() {
        let mut state = running_state(20, 20, 2);
        state.set_snake(Snake::from_segments(
            vec![pos(9, 9), pos(8, 9), pos(7, 9)],
            Direction::Right,
        ));
        state.set_food(Some(pos(0, 0)));

        let StepResult::Continue(view) = state.step() else {
            panic!("step should continue");
        };

        assert_eq!(view.snake, vec![pos(10, 9), pos(9, 9), pos(8, 9)]);
        assert_eq!(view.score, 0);
    }

    #[test]
    fn staged_food_is_kept_even_on_the_body() {
        let mut state = running_state(10, 10, 3);
        state.set_snake(Snake::from_segments(
            vec![pos(5, 5), pos(4, 5), pos(3, 5)],
            Direction::Right,
        ));
        state.set_food(Some(pos(4, 5)));

        assert_eq!(state.food(), Some(pos(4, 5)));
        assert!(state.snake().occupies(pos(4, 5)));
    }

    #[test]
    fn head_wraps_across_the_right_edge() {
        let mut state = running_state(20, 20, 3);
        state.set_snake(Snake::from_segments(
            vec![pos(19, 5), pos(18, 5), pos(17, 5)],
            Direction::Right,
        ));
        state.set_food(Some(pos(10, 10)));

        let result = state.step();

        assert!(matches!(result, StepResult::Continue(_)));
        assert_eq!(state.snake().head(), pos(0, 5));
    }

    #[test]
    fn eating_grows_scores_and_replaces_food() {
        let mut state = running_state(20, 20, 4);
        state.set_snake(Snake::from_segments(
            vec![pos(5, 5), pos(4, 5), pos(3, 5)],
            Direction::Right,
        ));
        state.set_food(Some(pos(6, 5)));

        state.step();

        assert_eq!(state.snake().len(), 4);
        assert_eq!(state.score(), 1);
        assert_eq!(state.best_score(), 1);
        let food = state.food().expect("new food should be placed");
        assert!(!state.snake().occupies(food));
    }

    #[test]
    fn running_into_the_second_segment_ends_the_game() {
        let saves = SharedStore::default();
        let mut state = GameState::new_with_seed(10, 10, Box::new(saves.clone()), 5)
            .expect("board should be valid");
        state.start();
        state.set_snake(Snake::from_segments(
            vec![pos(5, 5), pos(4, 5), pos(3, 5)],
            Direction::Right,
        ));
        state.set_food(Some(pos(6, 5)));
        state.step();
        assert_eq!(state.score(), 1);

        // Head pointed straight back at its neck.
        state.set_snake(Snake::from_segments(
            vec![pos(6, 5), pos(7, 5), pos(8, 5)],
            Direction::Right,
        ));
        let result = state.step();

        assert_eq!(result, StepResult::GameOver { final_score: 1 });
        assert_eq!(state.run_state(), RunState::Stopped);
        assert!(state.is_game_over());
        assert_eq!(state.best_score(), 1);
        assert_eq!(*saves.saves.borrow(), vec![1]);
    }

    #[test]
    fn tail_cell_counts_as_a_collision() {
        let mut state = running_state(10, 10, 6);
        // Square loop: the head's next cell is the tail that would move away.
        state.set_snake(Snake::from_segments(
            vec![pos(1, 1), pos(2, 1), pos(2, 2), pos(1, 2)],
            Direction::Down,
        ));
        state.set_food(Some(pos(8, 8)));

        assert_eq!(state.step(), StepResult::GameOver { final_score: 0 });
    }

    #[test]
    fn reversal_request_is_ignored() {
        let mut state = running_state(20, 20, 7);
        state.set_direction(Direction::Left);
        state.step();

        assert_eq!(state.snake().direction(), Direction::Right);
        assert_eq!(state.snake().head(), pos(11, 10));
    }

    #[test]
    fn double_tap_turns_back_over_two_ticks() {
        let mut state = running_state(20, 20, 8);
        state.set_food(Some(pos(0, 0)));

        state.set_direction(Direction::Up);
        state.step();
        state.set_direction(Direction::Left);
        state.step();

        assert_eq!(state.snake().head(), pos(9, 9));
        assert_eq!(state.snake().direction(), Direction::Left);
        assert_eq!(state.run_state(), RunState::Running);
    }

    #[test]
    fn speed_drops_every_five_points_and_stops_at_the_floor() {
        let mut state = running_state(200, 3, 9);
        let mut previous_speed = state.speed_ms();

        for eaten in 1..=120u32 {
            let head = state.snake().head();
            state.set_food(Some(head.neighbour(Direction::Right, state.bounds())));
            state.step();

            assert_eq!(state.score(), eaten);
            if eaten % 5 == 0 && previous_speed > 50 {
                assert_eq!(state.speed_ms(), previous_speed - 10);
            } else {
                assert_eq!(state.speed_ms(), previous_speed);
            }
            assert!(state.speed_ms() >= 50);
            previous_speed = state.speed_ms();
        }

        assert_eq!(state.speed_ms(), 50);
    }

    #[test]
    fn step_is_idle_unless_running() {
        let mut state = GameState::new_with_seed(10, 10, Box::new(MemoryScoreStore::default()), 10)
            .expect("board should be valid");
        let before = state.view();

        assert_eq!(state.step(), StepResult::Idle);
        assert_eq!(state.view(), before);

        state.start();
        state.pause();
        assert_eq!(state.step(), StepResult::Idle);
    }

    #[test]
    fn run_state_transitions_ignore_invalid_requests() {
        let mut state = GameState::new_with_seed(10, 10, Box::new(MemoryScoreStore::default()), 11)
            .expect("board should be valid");

        state.pause();
        assert_eq!(state.run_state(), RunState::Stopped);
        state.resume();
        assert_eq!(state.run_state(), RunState::Stopped);

        state.start();
        assert_eq!(state.run_state(), RunState::Running);
        state.start();
        state.resume();
        assert_eq!(state.run_state(), RunState::Running);

        state.pause();
        state.pause();
        assert_eq!(state.run_state(), RunState::Paused);
        state.start();
        assert_eq!(state.run_state(), RunState::Paused);

        state.toggle_pause();
        assert_eq!(state.run_state(), RunState::Running);

        state.reset();
        assert_eq!(state.run_state(), RunState::Stopped);
    }

    #[test]
    fn start_after_game_over_begins_a_fresh_board() {
        let mut state = running_state(10, 10, 12);
        state.set_snake(Snake::from_segments(
            vec![pos(1, 1), pos(2, 1), pos(2, 2), pos(1, 2)],
            Direction::Down,
        ));
        state.step();
        assert!(state.is_game_over());

        state.start();

        assert!(!state.is_game_over());
        assert_eq!(state.run_state(), RunState::Running);
        assert_eq!(state.snake().len(), 3);
        assert_eq!(state.snake().head(), pos(5, 5));
    }

    #[test]
    fn best_score_is_loaded_and_only_saved_on_improvement() {
        let store = SharedStore {
            initial: 2,
            ..SharedStore::default()
        };
        let mut state = GameState::new_with_seed(20, 20, Box::new(store.clone()), 13)
            .expect("board should be valid");
        state.start();
        assert_eq!(state.best_score(), 2);

        for _ in 0..3 {
            let head = state.snake().head();
            state.set_food(Some(head.neighbour(Direction::Right, state.bounds())));
            state.step();
        }

        assert_eq!(state.score(), 3);
        assert_eq!(state.best_score(), 3);
        assert_eq!(*store.saves.borrow(), vec![3]);
    }

    #[test]
    fn persistence_failures_do_not_stop_the_game() {
        let mut state = GameState::new_with_seed(20, 20, Box::new(BrokenStore), 14)
            .expect("board should be valid");
        assert_eq!(state.best_score(), 0);

        state.start();
        let head = state.snake().head();
        state.set_food(Some(head.neighbour(Direction::Right, state.bounds())));
        state.step();

        assert_eq!(state.best_score(), 1);
        assert_eq!(state.run_state(), RunState::Running);
    }

    #[test]
    fn reset_clears_score_speed_and_pending_direction() {
        let mut state = running_state(200, 3, 15);
        for _ in 0..5 {
            let head = state.snake().head();
            state.set_food(Some(head.neighbour(Direction::Right, state.bounds())));
            state.step();
        }
        state.set_direction(Direction::Up);
        assert_eq!(state.speed_ms(), 190);

        state.reset();

        assert_eq!(state.score(), 0);
        assert_eq!(state.best_score(), 5);
        assert_eq!(state.speed_ms(), 200);
        assert_eq!(state.snake().pending_direction(), None);
        assert_eq!(state.snake().direction(), Direction::Right);
    }
}
