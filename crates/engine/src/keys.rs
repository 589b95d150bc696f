//! Key-name resolution for the press-key operation.
//!
//! Callers pass either a literal character ("a", "1") or a named key
//! ("Enter", "ArrowDown"). Named keys map to the WebDriver private-use
//! codepoints carried by [`thirtyfour::Key`].

use thirtyfour::Key;

/// Resolves a key argument to the character the WebDriver actions API
/// expects. Returns `None` for multi-character strings that are not a known
/// key name.
pub fn resolve_key(name: &str) -> Option<char> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c);
    }

    let key = match name.to_ascii_lowercase().as_str() {
        "enter" => Key::Enter,
        "return" => Key::Return,
        "tab" => Key::Tab,
        "escape" | "esc" => Key::Escape,
        "space" => Key::Space,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "insert" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "page_up" => Key::PageUp,
        "pagedown" | "page_down" => Key::PageDown,
        "arrowup" | "up" => Key::Up,
        "arrowdown" | "down" => Key::Down,
        "arrowleft" | "left" => Key::Left,
        "arrowright" | "right" => Key::Right,
        "shift" => Key::Shift,
        "control" | "ctrl" => Key::Control,
        "alt" => Key::Alt,
        "meta" | "command" | "cmd" => Key::Meta,
        "pause" => Key::Pause,
        "clear" => Key::Clear,
        "help" => Key::Help,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        _ => return None,
    };
    Some(key.into())
}
