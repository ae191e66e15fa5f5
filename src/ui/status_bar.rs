use crate::app::AppState;
use crate::clock::Clock;
use crate::ui::styles::{error_style, hint_style};
use ratatui::{layout::Rect, text::Span, widgets::Paragraph, Frame};

/// Render the one-line status bar (last action or persistence failure)
pub fn render_status_bar<C: Clock>(f: &mut Frame, app: &AppState<C>, area: Rect) {
    let failing = app.is_failing();
    let text = app.status_line().unwrap_or_default();
    let style = if failing { error_style() } else { hint_style() };

    f.render_widget(Paragraph::new(Span::styled(format!(" {}", text), style)), area);
}
