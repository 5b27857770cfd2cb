use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::trace;

use crate::app::App;
use crate::multiselect::Key;

pub fn key_from_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

/// Handles a key event. Returns `true` when the app should quit.
pub fn handle_key(app: &mut App, event: KeyEvent) -> bool {
    if event.kind != KeyEventKind::Press {
        return false;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return true;
    }

    match event.code {
        KeyCode::Tab => {
            app.move_focus(true);
            return false;
        }
        KeyCode::BackTab => {
            app.move_focus(false);
            return false;
        }
        _ => {}
    }

    if let Some(part) = app.focused_part() {
        let key = key_from_code(event.code);
        trace!(?part, ?key, "key routed to multiselect");
        app.handle.lock().key(part, key);
        app.keep_focus_in_place();
        return false;
    }

    let on_submit = app.focus.active() == Some(app.submit_id());
    match event.code {
        KeyCode::Enter | KeyCode::Char(' ') if on_submit => app.submit(),
        KeyCode::Char('s') if on_submit => {
            if let Err(e) = app.save_selection() {
                app.report_error("Saving selection failed", &e);
            }
        }
        KeyCode::Char('q') | KeyCode::Esc => return true,
        _ => {}
    }
    false
}

/// Handles a mouse event: left presses click and move focus, movement drives
/// the menu highlight.
pub async fn handle_mouse(app: &mut App, event: MouseEvent) {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => app.press(event.column, event.row).await,
        MouseEventKind::Moved => app.hover(event.column, event.row),
        _ => {}
    }
}
