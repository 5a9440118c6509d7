use std::io;
use std::panic;
use std::sync::Once;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::game::GameView;
use crate::input::{GameInput, map_key};
use crate::renderer;

/// Upper bound on how long one input poll may block, so the frame keeps
/// redrawing while the tick timer is disarmed.
pub const MAX_POLL_WAIT: Duration = Duration::from_millis(50);

static PANIC_HOOK: Once = Once::new();

/// Terminal side of a game: raw mode, alternate screen, frames and keys.
///
/// Dropping the session puts the terminal back, as does a panic while it is
/// active.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        PANIC_HOOK.call_once(|| {
            let default_hook = panic::take_hook();
            panic::set_hook(Box::new(move |panic_info| {
                leave_game_screen();
                default_hook(panic_info);
            }));
        });

        enable_raw_mode()?;
        if let Err(error) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            leave_game_screen();
            return Err(error);
        }

        let terminal = Terminal::new(CrosstermBackend::new(io::stdout())).inspect_err(|_| {
            leave_game_screen();
        })?;
        log::debug!("terminal session entered");

        Ok(Self { terminal })
    }

    /// Paints one frame of `view`.
    pub fn draw(&mut self, view: &GameView) -> io::Result<()> {
        self.terminal
            .draw(|frame| renderer::render(frame, view))
            .map(|_| ())
    }

    /// Waits for the next game input, giving up after `poll_timeout(until_tick)`.
    ///
    /// Keys without a game meaning and non-key events yield `Ok(None)`.
    pub fn next_input(&mut self, until_tick: Option<Duration>) -> io::Result<Option<GameInput>> {
        if !event::poll(poll_timeout(until_tick))? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) => Ok(map_key(key)),
            _ => Ok(None),
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        leave_game_screen();
        log::debug!("terminal session left");
    }
}

/// Time to block on input: up to the next tick, never past [`MAX_POLL_WAIT`].
#[must_use]
pub fn poll_timeout(until_tick: Option<Duration>) -> Duration {
    until_tick.map_or(MAX_POLL_WAIT, |until| until.min(MAX_POLL_WAIT))
}

fn leave_game_screen() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
}
