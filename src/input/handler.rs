use crate::app::AppState;
use crate::clock::Clock;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle a key press; returns true when the app should quit
pub fn handle_key<C: Clock>(app: &mut AppState<C>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_selection_up();
            false
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_selection_down();
            false
        }

        // Toggle highlighted category
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.toggle_selected();
            false
        }

        // Number keys toggle the category with that menu number
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            app.toggle_index(index);
            false
        }

        KeyCode::Char('s') => {
            app.stop();
            false
        }
        KeyCode::Char('e') => {
            app.export();
            false
        }

        _ => false,
    }
}
