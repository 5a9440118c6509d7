use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::config::{
    INITIAL_SPEED_LEVEL, INITIAL_TICK_INTERVAL_MS, SPEED_LEVELS_PER_STEP, TICK_INTERVAL_STEP_MS,
};
use crate::game::GameView;

/// Renders the one-line HUD and returns the remaining play area above it.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, view: &GameView) -> Rect {
    let [play_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    frame.render_widget(
        Paragraph::new(status_line(view)).alignment(Alignment::Right),
        status_area,
    );

    play_area
}

fn status_line(view: &GameView) -> Line<'static> {
    let value = Style::default().add_modifier(Modifier::BOLD);

    Line::from(vec![
        Span::raw("Length "),
        Span::styled(view.snake.len().to_string(), value),
        Span::raw("  Speed "),
        Span::styled(speed_level(view.speed_ms).to_string(), value),
        Span::raw(format!(" ({}ms)", view.speed_ms)),
        Span::raw("  Score "),
        Span::styled(view.score.to_string(), value),
        Span::raw("  Best "),
        Span::styled(view.best_score.to_string(), value),
        Span::raw(" "),
    ])
}

/// Player-facing speed level: starts at 5 and gains 2 per speed step.
#[must_use]
pub fn speed_level(speed_ms: u64) -> u64 {
    let steps = INITIAL_TICK_INTERVAL_MS.saturating_sub(speed_ms) / TICK_INTERVAL_STEP_MS;
    INITIAL_SPEED_LEVEL + steps * SPEED_LEVELS_PER_STEP
}

#[cfg(test)]
mod tests {
    use crate::config::GridSize;
    use crate::game::{GameView, RunState};
    use crate::snake::Position;

    use super::{speed_level, status_line};

    #[test]
    fn status_line_lists_score_best_and_speed() {
        let view = GameView {
            snake: vec![Position { x: 1, y: 1 }, Position { x: 0, y: 1 }],
            food: None,
            score: 4,
            best_score: 9,
            speed_ms: 190,
            run_state: RunState::Running,
            bounds: GridSize::default(),
            game_over: false,
        };

        let text: String = status_line(&view)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();

        assert_eq!(text, "Length 2  Speed 7 (190ms)  Score 4  Best 9 ");
    }

    #[test]
    fn speed_level_climbs_two_per_step() {
        assert_eq!(speed_level(200), 5);
        assert_eq!(speed_level(190), 7);
        assert_eq!(speed_level(150), 15);
        assert_eq!(speed_level(50), 35);
    }
}
