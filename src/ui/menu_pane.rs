use crate::app::AppState;
use crate::clock::Clock;
use crate::report::format_hms;
use crate::ui::styles::{
    border_style, category_style, default_style, idle_style, running_style, selected_style,
    title_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the category menu
pub fn render_menu_pane<C: Clock>(f: &mut Frame, app: &AppState<C>, area: Rect) {
    let running = app.tracker.state().category();
    let summary = app.tracker.summary();

    let items: Vec<ListItem> = app
        .tracker
        .categories()
        .iter()
        .enumerate()
        .map(|(idx, category)| {
            let is_running = running == Some(category.name);
            let marker = if is_running { "● " } else { "○ " };
            let name_style = if is_running { running_style() } else { default_style() };

            let mut spans = vec![
                Span::styled(format!(" {} ", idx + 1), idle_style()),
                Span::styled(marker, category_style(category.color)),
                Span::styled(format!("{:<10}", category.name), name_style),
                Span::styled(format_hms(summary.seconds_for(category.name)), idle_style()),
            ];
            if !category.counts_as_active {
                spans.push(Span::styled("  (not active time)", idle_style()));
            }

            let line = Line::from(spans);
            if idx == app.selected_index {
                ListItem::new(line).style(selected_style())
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let title = match &app.tracker.presenter().elapsed_label {
        Some(label) => format!(" Tracking: {} ", label),
        None => " Not tracking ".to_string(),
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}
