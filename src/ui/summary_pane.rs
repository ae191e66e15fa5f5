use crate::app::AppState;
use crate::clock::Clock;
use crate::report::format_hms;
use crate::ui::styles::{border_style, default_style, idle_style, title_style, total_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render today's per-category totals, live session included
pub fn render_summary_pane<C: Clock>(f: &mut Frame, app: &AppState<C>, area: Rect) {
    let summary = app.tracker.summary();
    let mut lines = Vec::new();

    lines.push(Line::raw(""));
    if summary.is_empty() {
        lines.push(Line::styled("  No time tracked yet.", idle_style()));
    } else {
        for total in &summary.totals {
            let style = if total.counts_as_active { default_style() } else { idle_style() };
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", total.name), style),
                Span::styled(format_hms(total.seconds), style),
            ]));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("  Active    ", total_style()),
        Span::styled(format_hms(summary.total_active_seconds), total_style()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  Tracked   ", idle_style()),
        Span::styled(format_hms(summary.total_seconds), idle_style()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  Entries   ", idle_style()),
        Span::styled(app.tracker.entries().len().to_string(), idle_style()),
    ]));

    let title = format!(" Today {} ", app.tracker.tracked_day().format("%Y-%m-%d"));
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(paragraph, area);
}
