#![forbid(unsafe_code)]

//! Raw key identities as reported by a native layer.
//!
//! These are physical keys, not meanings: the [`input_decoder`] turns them
//! into semantic events using the per-window modifier latch. Keys that
//! produce text (letters, Enter, Tab, Backspace, Escape) also arrive as
//! character notifications; the decoder takes their meaning from those.
//!
//! [`input_decoder`]: crate::input_decoder

/// A physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Shift,
    Control,
    Alt,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Backspace,
    Enter,
    Tab,
    Escape,
    Pause,
    /// Function key F1-F24.
    F(u8),
    /// A key that produces a character; its meaning arrives separately.
    Char(char),
    /// A native key code with no portable identity.
    Other(u32),
}

impl Key {
    /// True for keys whose state is latched while held.
    #[inline]
    pub const fn is_modifier(self) -> bool {
        matches!(self, Key::Shift | Key::Control | Key::Alt)
    }
}
