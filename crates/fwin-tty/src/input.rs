#![forbid(unsafe_code)]

//! Terminal input as native messages.
//!
//! A terminal reports a key together with the modifiers held at the time.
//! The native vocabulary reports modifier transitions instead, so each key
//! press expands to:
//!
//! ```text
//! KeyDown(mod)...  KeyDown(key)  [Char(ch)]  KeyUp(key)  KeyUp(mod)...
//! ```
//!
//! Keys whose meaning is a character (enter, tab, backspace, escape, and
//! control letters) are reported through `Char` with the matching control
//! code.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{
    Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use fwin_backend::{ControlHandles, ControlSpec, NativeEventLoop, NativeMsg};
use fwin_core::error::{Error, Result};
use fwin_core::geometry::Rect;
use fwin_core::handle::NativeHandle;
use fwin_core::input_decoder::{BS, CR, ESC, HT};
use fwin_core::key::Key;

use crate::TERMINAL_WINDOW;
use crate::session::TerminalSession;

/// Longest single wait on the terminal, so timer messages are not held up.
const POLL_SLICE: Duration = Duration::from_millis(10);

/// Native messages for one terminal event.
#[must_use]
pub fn translate(event: TermEvent, window: NativeHandle) -> Vec<NativeMsg> {
    match event {
        TermEvent::Key(key) => translate_key(key, window),
        TermEvent::Mouse(mouse) => translate_mouse(mouse, window),
        TermEvent::Resize(cols, rows) => {
            let (width, height) = (i32::from(cols), i32::from(rows));
            vec![
                NativeMsg::Resized {
                    window,
                    width,
                    height,
                },
                NativeMsg::Paint {
                    window,
                    rect: Rect::new(0, 0, width, height),
                },
            ]
        }
        TermEvent::FocusGained => vec![NativeMsg::Focus {
            window,
            focused: true,
        }],
        TermEvent::FocusLost => vec![NativeMsg::Focus {
            window,
            focused: false,
        }],
        TermEvent::Paste(text) => text
            .chars()
            .map(|ch| NativeMsg::Char { window, ch })
            .collect(),
    }
}

fn translate_key(event: KeyEvent, window: NativeHandle) -> Vec<NativeMsg> {
    if event.kind == KeyEventKind::Release {
        return Vec::new();
    }
    let mut modifiers = held_modifiers(event.modifiers);
    let (key, ch) = match event.code {
        KeyCode::Backspace => (Key::Backspace, Some(BS)),
        KeyCode::Enter => (Key::Enter, Some(CR)),
        KeyCode::Tab => (Key::Tab, Some(HT)),
        KeyCode::BackTab => {
            if !modifiers.contains(&Key::Shift) {
                modifiers.push(Key::Shift);
            }
            (Key::Tab, Some(HT))
        }
        KeyCode::Esc => (Key::Escape, Some(ESC)),
        KeyCode::Left => (Key::Left, None),
        KeyCode::Right => (Key::Right, None),
        KeyCode::Up => (Key::Up, None),
        KeyCode::Down => (Key::Down, None),
        KeyCode::Home => (Key::Home, None),
        KeyCode::End => (Key::End, None),
        KeyCode::PageUp => (Key::PageUp, None),
        KeyCode::PageDown => (Key::PageDown, None),
        KeyCode::Insert => (Key::Insert, None),
        KeyCode::Delete => (Key::Delete, None),
        KeyCode::Pause => (Key::Pause, None),
        KeyCode::F(n) => (Key::F(n), None),
        KeyCode::Char(c) => {
            let ch = if event.modifiers.contains(KeyModifiers::CONTROL) {
                control_code(c)
            } else {
                c
            };
            (Key::Char(c), Some(ch))
        }
        other => {
            tracing::trace!(?other, "terminal key without a native identity");
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(modifiers.len() * 2 + 3);
    out.extend(
        modifiers
            .iter()
            .map(|&key| NativeMsg::KeyDown { window, key }),
    );
    out.push(NativeMsg::KeyDown { window, key });
    if let Some(ch) = ch {
        out.push(NativeMsg::Char { window, ch });
    }
    out.push(NativeMsg::KeyUp { window, key });
    out.extend(
        modifiers
            .iter()
            .rev()
            .map(|&key| NativeMsg::KeyUp { window, key }),
    );
    out
}

fn held_modifiers(mods: KeyModifiers) -> Vec<Key> {
    let mut keys = Vec::with_capacity(3);
    if mods.contains(KeyModifiers::CONTROL) {
        keys.push(Key::Control);
    }
    if mods.contains(KeyModifiers::SHIFT) {
        keys.push(Key::Shift);
    }
    if mods.contains(KeyModifiers::ALT) {
        keys.push(Key::Alt);
    }
    keys
}

/// Control-letter to its C0 code; anything else passes through.
fn control_code(c: char) -> char {
    match c {
        'a'..='z' | 'A'..='Z' | '@' | '[' | '\\' | ']' | '^' | '_' => {
            char::from((c.to_ascii_uppercase() as u8) & 0x1f)
        }
        other => other,
    }
}

fn translate_mouse(event: MouseEvent, window: NativeHandle) -> Vec<NativeMsg> {
    let moved = NativeMsg::MouseMove {
        window,
        x: i32::from(event.column),
        y: i32::from(event.row),
    };
    match event.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => vec![moved],
        MouseEventKind::Down(b) => vec![
            moved,
            NativeMsg::MouseButton {
                window,
                button: button_number(b),
                down: true,
            },
        ],
        MouseEventKind::Up(b) => vec![
            moved,
            NativeMsg::MouseButton {
                window,
                button: button_number(b),
                down: false,
            },
        ],
        MouseEventKind::ScrollUp
        | MouseEventKind::ScrollDown
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => Vec::new(),
    }
}

const fn button_number(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Right => 2,
        MouseButton::Middle => 3,
    }
}

/// Native message loop over the terminal and the display's timers.
///
/// A detached loop (no session) only delivers timer messages.
#[derive(Debug)]
pub struct TtyEventLoop {
    session: Option<Arc<TerminalSession>>,
    timers: Receiver<NativeMsg>,
    pending: VecDeque<NativeMsg>,
}

impl TtyEventLoop {
    pub(crate) fn new(session: Option<Arc<TerminalSession>>, timers: Receiver<NativeMsg>) -> Self {
        Self {
            session,
            timers,
            pending: VecDeque::new(),
        }
    }

    fn next_timer(&mut self) -> Option<NativeMsg> {
        match self.timers.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

impl NativeEventLoop for TtyEventLoop {
    fn wait_message(&mut self, timeout: Duration) -> Result<Option<NativeMsg>> {
        if let Some(msg) = self.pending.pop_front() {
            return Ok(Some(msg));
        }
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(msg) = self.next_timer() {
                return Ok(Some(msg));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let slice = (deadline - now).min(POLL_SLICE);
            if self.session.is_none() {
                match self.timers.recv_timeout(slice) {
                    Ok(msg) => return Ok(Some(msg)),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => std::thread::sleep(slice),
                }
                continue;
            }
            if crossterm::event::poll(slice)? {
                let event = crossterm::event::read()?;
                self.pending.extend(translate(event, TERMINAL_WINDOW));
                if let Some(msg) = self.pending.pop_front() {
                    return Ok(Some(msg));
                }
            }
        }
    }

    fn create_control(&mut self, _spec: &ControlSpec) -> Result<ControlHandles> {
        Err(Error::Unsupported("controls on a text terminal"))
    }

    fn destroy_control(&mut self, _handles: ControlHandles) -> Result<()> {
        Err(Error::Unsupported("controls on a text terminal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const W: NativeHandle = TERMINAL_WINDOW;

    fn key(code: KeyCode, mods: KeyModifiers) -> TermEvent {
        TermEvent::Key(KeyEvent::new(code, mods))
    }

    #[test]
    fn plain_letter_is_down_char_up() {
        assert_eq!(
            translate(key(KeyCode::Char('a'), KeyModifiers::NONE), W),
            vec![
                NativeMsg::KeyDown { window: W, key: Key::Char('a') },
                NativeMsg::Char { window: W, ch: 'a' },
                NativeMsg::KeyUp { window: W, key: Key::Char('a') },
            ]
        );
    }

    #[test]
    fn control_left_brackets_the_key_with_the_modifier() {
        assert_eq!(
            translate(key(KeyCode::Left, KeyModifiers::CONTROL), W),
            vec![
                NativeMsg::KeyDown { window: W, key: Key::Control },
                NativeMsg::KeyDown { window: W, key: Key::Left },
                NativeMsg::KeyUp { window: W, key: Key::Left },
                NativeMsg::KeyUp { window: W, key: Key::Control },
            ]
        );
    }

    #[test]
    fn control_c_carries_etx() {
        let msgs = translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL), W);
        assert!(msgs.contains(&NativeMsg::Char { window: W, ch: '\x03' }));
    }

    #[test]
    fn editing_keys_carry_their_control_codes() {
        for (code, ch) in [
            (KeyCode::Enter, '\r'),
            (KeyCode::Tab, '\t'),
            (KeyCode::Backspace, '\x08'),
            (KeyCode::Esc, '\x1b'),
        ] {
            let msgs = translate(key(code, KeyModifiers::NONE), W);
            assert_eq!(msgs[1], NativeMsg::Char { window: W, ch });
        }
    }

    #[test]
    fn back_tab_holds_shift() {
        let msgs = translate(key(KeyCode::BackTab, KeyModifiers::NONE), W);
        assert_eq!(msgs.first(), Some(&NativeMsg::KeyDown { window: W, key: Key::Shift }));
        assert_eq!(msgs.last(), Some(&NativeMsg::KeyUp { window: W, key: Key::Shift }));
    }

    #[test]
    fn releases_are_ignored() {
        let mut ev = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        ev.kind = KeyEventKind::Release;
        assert!(translate(TermEvent::Key(ev), W).is_empty());
    }

    #[test]
    fn mouse_press_moves_then_presses() {
        let ev = TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(
            translate(ev, W),
            vec![
                NativeMsg::MouseMove { window: W, x: 4, y: 2 },
                NativeMsg::MouseButton { window: W, button: 2, down: true },
            ]
        );
    }

    #[test]
    fn resize_repaints_everything() {
        let msgs = translate(TermEvent::Resize(100, 30), W);
        assert_eq!(
            msgs,
            vec![
                NativeMsg::Resized { window: W, width: 100, height: 30 },
                NativeMsg::Paint { window: W, rect: Rect::new(0, 0, 100, 30) },
            ]
        );
    }

    #[test]
    fn paste_is_typed() {
        let msgs = translate(TermEvent::Paste("hi".into()), W);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1], NativeMsg::Char { window: W, ch: 'i' });
    }

    #[test]
    fn detached_loop_delivers_timers_and_times_out() {
        let (tx, rx) = mpsc::channel();
        let mut lp = TtyEventLoop::new(None, rx);
        assert_eq!(lp.wait_message(Duration::from_millis(5)).unwrap(), None);
        tx.send(NativeMsg::TimerExpired { param: 9 }).unwrap();
        assert_eq!(
            lp.wait_message(Duration::from_millis(50)).unwrap(),
            Some(NativeMsg::TimerExpired { param: 9 })
        );
    }

    #[test]
    fn controls_are_unsupported() {
        let (_tx, rx) = mpsc::channel();
        let mut lp = TtyEventLoop::new(None, rx);
        let spec = ControlSpec::new(W, fwin_backend::ControlClass::PushButton, Rect::new(0, 0, 4, 1));
        assert!(lp.create_control(&spec).is_err());
    }

    proptest::proptest! {
        #[test]
        fn modifier_transitions_are_balanced(
            c in proptest::char::range('a', 'z'),
            ctrl in proptest::bool::ANY,
            shift in proptest::bool::ANY,
            alt in proptest::bool::ANY,
        ) {
            let mut mods = KeyModifiers::NONE;
            mods.set(KeyModifiers::CONTROL, ctrl);
            mods.set(KeyModifiers::SHIFT, shift);
            mods.set(KeyModifiers::ALT, alt);
            let msgs = translate(key(KeyCode::Char(c), mods), W);
            let downs: Vec<Key> = msgs.iter().filter_map(|m| match m {
                NativeMsg::KeyDown { key, .. } => Some(*key),
                _ => None,
            }).collect();
            let mut ups: Vec<Key> = msgs.iter().filter_map(|m| match m {
                NativeMsg::KeyUp { key, .. } => Some(*key),
                _ => None,
            }).collect();
            ups.reverse();
            proptest::prop_assert_eq!(downs, ups);
            let chars = msgs.iter().filter(|m| matches!(m, NativeMsg::Char { .. })).count();
            proptest::prop_assert_eq!(chars, 1);
        }
    }
}
