pub mod keybindings;
pub mod layout;
pub mod menu_pane;
pub mod status_bar;
pub mod styles;
pub mod summary_pane;

use crate::app::AppState;
use crate::clock::Clock;
use keybindings::render_keybindings;
use layout::create_layout;
use menu_pane::render_menu_pane;
use ratatui::Frame;
use status_bar::render_status_bar;
use summary_pane::render_summary_pane;

/// Main render function - draws the entire UI
pub fn render<C: Clock>(f: &mut Frame, app: &mut AppState<C>) {
    let layout = create_layout(f.size());

    render_keybindings(f, layout.keybindings_area);
    render_menu_pane(f, app, layout.menu_area);
    render_summary_pane(f, app, layout.summary_area);
    render_status_bar(f, app, layout.status_area);

    app.tracker.presenter_mut().needs_redraw = false;
}
