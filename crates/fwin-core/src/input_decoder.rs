#![forbid(unsafe_code)]

//! Keyboard decoding: raw key transitions and characters to semantic events.
//!
//! Modifier keys are latched per window on key-down and cleared on key-up.
//! The meaning of a navigation key depends on the latch at the moment it goes
//! down (see the table on [`KeyDecoder::key_down`]). Characters map one to one
//! except for a small reserved set of control codes.
//!
//! # Usage
//!
//! ```
//! use fwin_core::event::EventKind;
//! use fwin_core::input_decoder::KeyDecoder;
//! use fwin_core::key::Key;
//!
//! let mut decoder = KeyDecoder::new();
//! assert_eq!(decoder.key_down(Key::Control), None);
//! assert_eq!(decoder.key_down(Key::Left), Some(EventKind::LeftWord));
//! decoder.key_up(Key::Control);
//! assert_eq!(decoder.key_down(Key::Left), Some(EventKind::Left));
//! ```

use bitflags::bitflags;

use crate::event::EventKind;
use crate::key::Key;

bitflags! {
    /// Modifier keys currently held down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierLatch: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

/// Carriage return.
pub const CR: char = '\r';
/// Backspace.
pub const BS: char = '\x08';
/// Horizontal tab.
pub const HT: char = '\t';
/// Escape, used as cancel.
pub const ESC: char = '\x1b';
/// DC3 (control-S), stop output.
pub const DC3: char = '\x13';
/// DC1 (control-Q), continue output.
pub const DC1: char = '\x11';
/// ETX (control-C), end of text.
pub const ETX: char = '\x03';

/// Per-window key decoding state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyDecoder {
    latch: ModifierLatch,
}

impl KeyDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Modifiers currently latched.
    #[inline]
    pub const fn latch(&self) -> ModifierLatch {
        self.latch
    }

    /// Drop all latched modifiers (used when focus is lost).
    pub fn reset(&mut self) {
        if !self.latch.is_empty() {
            crate::trace!(latch = ?self.latch, "modifier latch cleared");
        }
        self.latch = ModifierLatch::empty();
    }

    /// Decode a key-down transition.
    ///
    /// | key | none | control | shift |
    /// |-----|------|---------|-------|
    /// | Up | Up | ScrollUp | Up |
    /// | Down | Down | ScrollDown | Down |
    /// | Left | Left | LeftWord | ScrollLeft |
    /// | Right | Right | RightWord | ScrollRight |
    /// | Home | HomeLine | Home | HomeScreen |
    /// | End | EndLine | End | EndScreen |
    /// | Insert | InsertToggle | InsertLine | Insert |
    /// | Delete | DeleteCharForward | DeleteLine | Delete |
    ///
    /// Control wins when both control and shift are held. Modifier keys
    /// latch and produce nothing. Keys whose meaning arrives as a character
    /// return `None`.
    pub fn key_down(&mut self, key: Key) -> Option<EventKind> {
        let ctrl = self.latch.contains(ModifierLatch::CTRL);
        let shift = self.latch.contains(ModifierLatch::SHIFT);
        let pick = |plain: EventKind, with_ctrl: EventKind, with_shift: EventKind| {
            if ctrl {
                with_ctrl
            } else if shift {
                with_shift
            } else {
                plain
            }
        };

        let kind = match key {
            Key::Shift => {
                self.latch |= ModifierLatch::SHIFT;
                return None;
            }
            Key::Control => {
                self.latch |= ModifierLatch::CTRL;
                return None;
            }
            Key::Alt => {
                self.latch |= ModifierLatch::ALT;
                return None;
            }
            Key::Up => pick(EventKind::Up, EventKind::ScrollUp, EventKind::Up),
            Key::Down => pick(EventKind::Down, EventKind::ScrollDown, EventKind::Down),
            Key::Left => pick(EventKind::Left, EventKind::LeftWord, EventKind::ScrollLeft),
            Key::Right => pick(
                EventKind::Right,
                EventKind::RightWord,
                EventKind::ScrollRight,
            ),
            Key::Home => pick(EventKind::HomeLine, EventKind::Home, EventKind::HomeScreen),
            Key::End => pick(EventKind::EndLine, EventKind::End, EventKind::EndScreen),
            Key::PageUp => EventKind::PageUp,
            Key::PageDown => EventKind::PageDown,
            Key::Insert => pick(
                EventKind::InsertToggle,
                EventKind::InsertLine,
                EventKind::Insert,
            ),
            Key::Delete => pick(
                EventKind::DeleteCharForward,
                EventKind::DeleteLine,
                EventKind::Delete,
            ),
            Key::Pause => EventKind::Stop,
            Key::F(n) if (1..=12).contains(&n) => EventKind::Function(n),
            Key::F(_)
            | Key::Backspace
            | Key::Enter
            | Key::Tab
            | Key::Escape
            | Key::Char(_)
            | Key::Other(_) => return None,
        };
        Some(kind)
    }

    /// Decode a key-up transition. Only modifiers matter.
    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Shift => self.latch.remove(ModifierLatch::SHIFT),
            Key::Control => self.latch.remove(ModifierLatch::CTRL),
            Key::Alt => self.latch.remove(ModifierLatch::ALT),
            _ => {}
        }
    }
}

/// Decode a character notification.
///
/// The reserved control codes become control events; every other character
/// is delivered as [`EventKind::Char`].
#[must_use]
pub fn decode_char(ch: char) -> EventKind {
    match ch {
        CR => EventKind::Enter,
        BS => EventKind::DeleteCharBackward,
        HT => EventKind::Tab,
        ESC => EventKind::Cancel,
        DC3 => EventKind::Stop,
        DC1 => EventKind::Continue,
        ETX => EventKind::Terminate,
        other => EventKind::Char(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_keys_latch_and_release() {
        let mut d = KeyDecoder::new();
        assert_eq!(d.key_down(Key::Shift), None);
        assert_eq!(d.key_down(Key::Control), None);
        assert_eq!(d.latch(), ModifierLatch::SHIFT | ModifierLatch::CTRL);
        d.key_up(Key::Shift);
        assert_eq!(d.latch(), ModifierLatch::CTRL);
        d.key_up(Key::Control);
        assert!(d.latch().is_empty());
    }

    #[test]
    fn left_meaning_depends_on_latch() {
        let mut d = KeyDecoder::new();
        assert_eq!(d.key_down(Key::Left), Some(EventKind::Left));
        d.key_down(Key::Control);
        assert_eq!(d.key_down(Key::Left), Some(EventKind::LeftWord));
        d.key_up(Key::Control);
        d.key_down(Key::Shift);
        assert_eq!(d.key_down(Key::Left), Some(EventKind::ScrollLeft));
    }

    #[test]
    fn control_wins_over_shift() {
        let mut d = KeyDecoder::new();
        d.key_down(Key::Shift);
        d.key_down(Key::Control);
        assert_eq!(d.key_down(Key::Home), Some(EventKind::Home));
        assert_eq!(d.key_down(Key::Right), Some(EventKind::RightWord));
    }

    #[test]
    fn home_end_table() {
        let mut d = KeyDecoder::new();
        assert_eq!(d.key_down(Key::Home), Some(EventKind::HomeLine));
        assert_eq!(d.key_down(Key::End), Some(EventKind::EndLine));
        d.key_down(Key::Shift);
        assert_eq!(d.key_down(Key::Home), Some(EventKind::HomeScreen));
        assert_eq!(d.key_down(Key::End), Some(EventKind::EndScreen));
    }

    #[test]
    fn text_keys_defer_to_characters() {
        let mut d = KeyDecoder::new();
        assert_eq!(d.key_down(Key::Enter), None);
        assert_eq!(d.key_down(Key::Backspace), None);
        assert_eq!(d.key_down(Key::Char('a')), None);
        assert_eq!(d.key_down(Key::F(13)), None);
        assert_eq!(d.key_down(Key::F(5)), Some(EventKind::Function(5)));
    }

    #[test]
    fn reset_clears_latch() {
        let mut d = KeyDecoder::new();
        d.key_down(Key::Control);
        d.reset();
        assert_eq!(d.key_down(Key::Up), Some(EventKind::Up));
    }

    #[test]
    fn reserved_characters_become_controls() {
        assert_eq!(decode_char('\r'), EventKind::Enter);
        assert_eq!(decode_char('\x08'), EventKind::DeleteCharBackward);
        assert_eq!(decode_char('\t'), EventKind::Tab);
        assert_eq!(decode_char('\x1b'), EventKind::Cancel);
        assert_eq!(decode_char('\x13'), EventKind::Stop);
        assert_eq!(decode_char('\x11'), EventKind::Continue);
        assert_eq!(decode_char('\x03'), EventKind::Terminate);
        assert_eq!(decode_char('x'), EventKind::Char('x'));
        assert_eq!(decode_char('é'), EventKind::Char('é'));
    }
}
