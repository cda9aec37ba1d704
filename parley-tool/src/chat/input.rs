use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::ChatApp;

pub fn handle_event(app: &mut ChatApp, event: Event) {
    if let Event::Key(key) = event {
        if key.kind == KeyEventKind::Press {
            handle_key(app, key);
        }
    }
}

/// Typing is accepted while a reply is outstanding; only sending is gated.
fn handle_key(app: &mut ChatApp, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        (KeyCode::Enter, KeyModifiers::NONE) => {
            app.send_message();
        }
        // Shift+Enter is reserved for multi-line input.
        (KeyCode::Enter, _) => {}
        (KeyCode::Up, KeyModifiers::CONTROL) => {
            app.scroll_up();
        }
        (KeyCode::Down, KeyModifiers::CONTROL) => {
            app.scroll_down();
        }
        (KeyCode::PageUp, _) => {
            app.page_up();
        }
        (KeyCode::PageDown, _) => {
            app.page_down();
        }
        (KeyCode::Backspace, _) => {
            app.input_backspace();
        }
        (KeyCode::Delete, _) => {
            app.input_delete();
        }
        (KeyCode::Left, _) => {
            app.input_left();
        }
        (KeyCode::Right, _) => {
            app.input_right();
        }
        (KeyCode::Home, _) => {
            app.input_home();
        }
        (KeyCode::End, _) => {
            app.input_end();
        }
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            app.input_char(c);
        }
        _ => {}
    }
}
