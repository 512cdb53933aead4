use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;
use zcomx_core::config::KeymapConfig;
use zcomx_core::ReaderCommand;

use crate::input::Action;

/// Parsed key binding (key code + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn simple(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    pub fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }

    /// Binding for a key event, with terminal-specific Shift reporting evened out
    ///
    /// Uppercase letters always carry Shift; punctuation such as `?` or `:`
    /// never does, whatever the terminal sent.
    pub fn from_event(key: &KeyEvent) -> Self {
        let mut modifiers = key.modifiers;
        if let KeyCode::Char(c) = key.code {
            if c.is_ascii_uppercase() {
                modifiers.insert(KeyModifiers::SHIFT);
            } else if !c.is_ascii_alphabetic() {
                modifiers.remove(KeyModifiers::SHIFT);
            }
        }
        Self::new(key.code, modifiers)
    }
}

/// Runtime keymap for key-to-action lookup
pub struct Keymap {
    bindings: HashMap<KeyBinding, Action>,
    /// Action of the "gg" sequence, if configured
    pending_g_action: Option<Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut bindings = HashMap::new();
        let mut pending_g_action = None;

        let mut add_binding = |key_str: &str, action: Action| {
            if key_str == "gg" {
                pending_g_action = Some(action);
                return;
            }

            if let Some(binding) = parse_key_binding(key_str) {
                if let Some(existing) = bindings.get(&binding) {
                    warn!(
                        "Key conflict: '{}' already bound to {:?}, ignoring binding to {:?}",
                        key_str, existing, action
                    );
                } else {
                    bindings.insert(binding, action);
                }
            } else {
                warn!("Invalid key binding: '{}', ignoring", key_str);
            }
        };

        add_binding(&config.next_page, Action::Reader(ReaderCommand::Next));
        add_binding(&config.prev_page, Action::Reader(ReaderCommand::Prev));
        add_binding(&config.first_page, Action::Reader(ReaderCommand::First));
        add_binding(&config.last_page, Action::Reader(ReaderCommand::Last));
        add_binding(&config.scroll_down, Action::Reader(ReaderCommand::ScrollDown));
        add_binding(&config.scroll_up, Action::Reader(ReaderCommand::ScrollUp));
        add_binding(&config.toggle_mode, Action::Reader(ReaderCommand::ToggleMode));
        add_binding(&config.goto_page, Action::OpenGoto);
        add_binding(&config.help, Action::ToggleHelp);
        add_binding(&config.close, Action::Reader(ReaderCommand::Close));

        // Always available, never configurable
        bindings.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Reader(ReaderCommand::Close));
        // Popups take Esc before the keymap is consulted
        bindings.insert(KeyBinding::simple(KeyCode::Esc), Action::Reader(ReaderCommand::Close));
        let fixed = [
            (KeyCode::Right, ReaderCommand::Next),
            (KeyCode::Left, ReaderCommand::Prev),
            (KeyCode::PageDown, ReaderCommand::Next),
            (KeyCode::PageUp, ReaderCommand::Prev),
            (KeyCode::Home, ReaderCommand::First),
            (KeyCode::End, ReaderCommand::Last),
            (KeyCode::Down, ReaderCommand::ScrollDown),
            (KeyCode::Up, ReaderCommand::ScrollUp),
            (KeyCode::Char(' '), ReaderCommand::Next),
        ];
        for (code, command) in fixed {
            bindings
                .entry(KeyBinding::simple(code))
                .or_insert(Action::Reader(command));
        }

        Self {
            bindings,
            pending_g_action,
        }
    }

    pub fn get(&self, binding: &KeyBinding) -> Option<&Action> {
        self.bindings.get(binding)
    }

    pub fn get_pending_g_action(&self) -> Option<&Action> {
        self.pending_g_action.as_ref()
    }

    /// Whether a plain 'g' starts the "gg" sequence
    pub fn is_g_prefix(&self, binding: &KeyBinding) -> bool {
        self.pending_g_action.is_some()
            && binding.code == KeyCode::Char('g')
            && binding.modifiers == KeyModifiers::NONE
    }
}

/// Parse Vim-style key notation into KeyBinding
/// Supported formats:
/// - Single char: "l", "h", "q", ":", "?"
/// - Uppercase (Shift): "G"
/// - Ctrl / Shift: "<C-f>", "<S-Tab>"
/// - Special keys: "<CR>", "<Esc>", "<Space>", "<PageDown>", "<Home>", ...
pub fn parse_key_binding(s: &str) -> Option<KeyBinding> {
    let s = s.trim();

    if s.len() > 2 && s.starts_with('<') && s.ends_with('>') {
        return parse_special_key(&s[1..s.len() - 1]);
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if c.is_ascii_uppercase() {
        Some(KeyBinding::shift(KeyCode::Char(c)))
    } else {
        Some(KeyBinding::simple(KeyCode::Char(c)))
    }
}

fn parse_special_key(inner: &str) -> Option<KeyBinding> {
    if let Some(rest) = inner.strip_prefix("C-") {
        return parse_key_name(rest).map(KeyBinding::ctrl);
    }
    if let Some(rest) = inner.strip_prefix("S-") {
        return parse_key_name(rest).map(KeyBinding::shift);
    }
    parse_key_name(inner).map(KeyBinding::simple)
}

fn parse_key_name(name: &str) -> Option<KeyCode> {
    match name.to_lowercase().as_str() {
        "cr" | "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backtab" => Some(KeyCode::BackTab),
        "space" | "spc" => Some(KeyCode::Char(' ')),
        "bs" | "backspace" => Some(KeyCode::Backspace),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c.to_ascii_lowercase())),
                _ => None,
            }
        }
    }
}
