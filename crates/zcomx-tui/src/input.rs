use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use zcomx_core::ReaderCommand;

use crate::app::{App, Mode};
use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reader(ReaderCommand),
    /// First 'g' press, waiting for the second
    PendingG,
    /// Focus the page-number box
    OpenGoto,
    ToggleHelp,
    ExitMode,
    /// Left click at a terminal column
    Click(u16),
    Confirm,
    Cancel,
    InputChar(char),
    Backspace,
    None,
}

/// Map a key event to an action
///
/// While the page-number box has focus every key goes to the box; reader
/// bindings are not consulted.
pub fn handle_key_event(key: KeyEvent, app: &App, keymap: &Keymap) -> Action {
    if app.is_input_mode() {
        return handle_input_mode(key);
    }

    if app.mode == Mode::Help {
        // Any key closes help
        return Action::ExitMode;
    }

    let binding = KeyBinding::from_event(&key);
    if keymap.is_g_prefix(&binding) {
        if app.pending_key == Some('g') {
            return keymap.get_pending_g_action().copied().unwrap_or(Action::None);
        }
        return Action::PendingG;
    }

    keymap.get(&binding).copied().unwrap_or(Action::None)
}

fn handle_input_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => Action::InputChar(c),
        _ => Action::None,
    }
}

/// Map a mouse event to an action: clicks turn pages, the wheel scrolls
pub fn handle_mouse_event(mouse: MouseEvent, app: &App) -> Action {
    if app.mode != Mode::Normal {
        return Action::None;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::Click(mouse.column),
        MouseEventKind::ScrollDown => Action::Reader(ReaderCommand::ScrollDown),
        MouseEventKind::ScrollUp => Action::Reader(ReaderCommand::ScrollUp),
        _ => Action::None,
    }
}
