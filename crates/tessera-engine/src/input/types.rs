use std::fmt;

/// Keyboard key identifier.
///
/// Only keys the shell reacts to or logs by name are listed. Everything else
/// maps to `Key::Unknown` carrying the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Keyboard event emitted by the runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub state: KeyState,
    /// Stable platform code when available.
    pub code: u32,
    /// True when event is a key-repeat.
    pub repeat: bool,
}

impl KeyEvent {
    /// Key-down event for `key`, as produced by a fresh press.
    pub fn pressed(key: Key) -> Self {
        Self { key, state: KeyState::Pressed, code: 0, repeat: false }
    }

    /// Key-up event for `key`.
    pub fn released(key: Key) -> Self {
        Self { key, state: KeyState::Released, code: 0, repeat: false }
    }

    /// Returns true for a key-down (including repeats) of `key`.
    pub fn is_down(&self, key: Key) -> bool {
        self.state == KeyState::Pressed && self.key == key
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Unknown(code) => write!(f, "Unknown({code:#x})"),
            other => write!(f, "{:?}", other),
        }
    }
}
