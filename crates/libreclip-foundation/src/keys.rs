//! Key-event types shared by the page stream and the per-instance
//! interceptors, plus the platform probe that picks the command modifier.

use serde::{Deserialize, Serialize};

/// The handful of key identities the override layer cares about. Everything
/// else is carried opaquely so interceptors can yield to default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    KeyA,
    KeyC,
    KeyM,
    KeyV,
    KeyX,
    Other(u16),
}

/// A keyboard event as observed on a capturing listener, before the widget
/// or page handlers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyEvent {
    /// Plain keypress with no modifiers.
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
        }
    }

    /// The platform command chord (Cmd on macOS, Ctrl elsewhere) for `code`.
    pub fn command(platform: Platform, code: KeyCode) -> Self {
        let mut ev = Self::plain(code);
        match platform {
            Platform::MacOs => ev.meta = true,
            Platform::Other => ev.ctrl = true,
        }
        ev
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Which modifier counts as the command key on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Whether the event carries this platform's command modifier.
    pub fn command_modifier(&self, ev: &KeyEvent) -> bool {
        match self {
            Platform::MacOs => ev.meta,
            Platform::Other => ev.ctrl,
        }
    }
}

/// The emergency re-initialization chord: command modifier + Shift + M.
pub fn is_rearm_chord(platform: Platform, ev: &KeyEvent) -> bool {
    platform.command_modifier(ev) && ev.shift && ev.code == KeyCode::KeyM
}
