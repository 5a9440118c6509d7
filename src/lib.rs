//! Wrap-around Snake: a deterministic game core plus terminal collaborators.
//!
//! [`game::GameState`] owns the simulation. Everything else is a thin
//! collaborator around it: [`scheduler`] decides when to tick, [`input`]
//! turns keys into directions, [`renderer`] paints a [`game::GameView`],
//! and [`score`] persists the best score.

pub mod config;
pub mod food;
pub mod game;
pub mod input;
pub mod renderer;
pub mod scheduler;
pub mod score;
pub mod snake;
pub mod terminal_runtime;

pub mod ui {
    pub mod hud;
    pub mod menu;
}
