use std::fs::File;
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use wrap_snake::config::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use wrap_snake::game::{GameState, RunState, StepResult};
use wrap_snake::input::GameInput;
use wrap_snake::scheduler::TickScheduler;
use wrap_snake::score::{JsonScoreStore, MemoryScoreStore, ScoreStore};
use wrap_snake::terminal_runtime::TerminalSession;

#[derive(Debug, Parser)]
#[command(version, about = "Wrap-around Snake in the terminal")]
struct Cli {
    /// Board width in cells.
    #[arg(long, default_value_t = usize::from(DEFAULT_GRID_WIDTH))]
    cols: usize,

    /// Board height in cells.
    #[arg(long, default_value_t = usize::from(DEFAULT_GRID_HEIGHT))]
    rows: usize,

    /// Seed food placement for a reproducible game.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the best score in memory only.
    #[arg(long = "no-persist")]
    no_persist: bool,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let store: Box<dyn ScoreStore> = if cli.no_persist {
        Box::new(MemoryScoreStore::default())
    } else {
        let store = JsonScoreStore::new();
        log::info!("best score file: {}", store.path().display());
        Box::new(store)
    };

    let state = match cli.seed {
        Some(seed) => GameState::new_with_seed(cli.cols, cli.rows, store, seed),
        None => GameState::new(cli.cols, cli.rows, store),
    }
    .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    log::info!("starting {}x{} board", cli.cols, cli.rows);

    run(state)
}

fn run(mut state: GameState) -> io::Result<()> {
    let mut session = TerminalSession::enter()?;
    let mut scheduler = TickScheduler::new(state.speed_ms());

    loop {
        session.draw(&state.view())?;

        let until_tick = scheduler.time_until_tick(Instant::now());
        if let Some(input) = session.next_input(until_tick)? {
            if handle_input(&mut state, input).is_break() {
                break;
            }
            sync_scheduler(&state, &mut scheduler, Instant::now());
        }

        let now = Instant::now();
        if scheduler.poll(now) {
            match state.step() {
                StepResult::GameOver { final_score } => {
                    log::debug!("session finished with {final_score}");
                }
                StepResult::Continue(_) | StepResult::Idle => {}
            }
            sync_scheduler(&state, &mut scheduler, now);
        }
    }

    log::info!("quit with best score {}", state.best_score());
    Ok(())
}

fn handle_input(state: &mut GameState, input: GameInput) -> ControlFlow<()> {
    match input {
        GameInput::Direction(direction) => state.set_direction(direction),
        GameInput::Start => match state.run_state() {
            RunState::Stopped => state.start(),
            RunState::Paused => state.resume(),
            RunState::Running => {}
        },
        GameInput::Pause => state.toggle_pause(),
        GameInput::Reset => state.reset(),
        GameInput::Quit => return ControlFlow::Break(()),
    }

    ControlFlow::Continue(())
}

/// Keeps the timer in step with the session: armed only while running and
/// always at the current speed.
fn sync_scheduler(state: &GameState, scheduler: &mut TickScheduler, now: Instant) {
    scheduler.set_interval(state.speed_ms(), now);

    match state.run_state() {
        RunState::Running if !scheduler.is_armed() => scheduler.arm(now),
        RunState::Running => {}
        RunState::Stopped | RunState::Paused => scheduler.disarm(),
    }
}

fn init_logging(path: Option<&Path>) -> io::Result<()> {
    // Stderr is unusable once the alternate screen is up.
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    Ok(())
}
