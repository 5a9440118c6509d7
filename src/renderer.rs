use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;

use crate::config::GridSize;
use crate::game::{GameView, RunState};
use crate::snake::Position;
use crate::ui::hud::render_hud;
use crate::ui::menu::{render_game_over_menu, render_pause_menu, render_start_menu};

pub const GLYPH_SNAKE_HEAD: &str = "@";
pub const GLYPH_SNAKE_BODY: &str = "o";
pub const GLYPH_FOOD: &str = "*";

/// Renders the full game frame from an immutable view.
pub fn render(frame: &mut Frame<'_>, view: &GameView) {
    let area = frame.area();
    let play_area = render_hud(frame, area, view);

    let board = board_area(play_area, view.bounds);
    let block = Block::bordered();
    let inner = block.inner(board);
    frame.render_widget(block, board);

    render_food(frame, inner, view);
    render_snake(frame, inner, view);

    match view.run_state {
        RunState::Paused => render_pause_menu(frame, play_area),
        RunState::Stopped if view.game_over => {
            render_game_over_menu(frame, play_area, view.score, view.best_score);
        }
        RunState::Stopped => render_start_menu(frame, play_area, view.best_score),
        RunState::Running => {}
    }
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, view: &GameView) {
    let Some(food) = view.food else {
        return;
    };
    let Some((x, y)) = logical_to_terminal(inner, view.bounds, food) else {
        return;
    };

    frame
        .buffer_mut()
        .set_string(x, y, GLYPH_FOOD, Style::new().fg(Color::Red));
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, view: &GameView) {
    let buffer = frame.buffer_mut();

    // Tail first so the head wins if segments ever share a cell.
    for (index, segment) in view.snake.iter().enumerate().rev() {
        let Some((x, y)) = logical_to_terminal(inner, view.bounds, *segment) else {
            continue;
        };

        if index == 0 {
            buffer.set_string(
                x,
                y,
                GLYPH_SNAKE_HEAD,
                Style::new().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
            );
        } else {
            buffer.set_string(x, y, GLYPH_SNAKE_BODY, Style::new().fg(Color::Green));
        }
    }
}

/// Centres a bordered rectangle exactly the size of the board, so the border
/// marks the cells where the snake wraps.
fn board_area(area: Rect, bounds: GridSize) -> Rect {
    let width = bounds.width.saturating_add(2).min(area.width);
    let height = bounds.height.saturating_add(2).min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn logical_to_terminal(inner: Rect, bounds: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(bounds) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
