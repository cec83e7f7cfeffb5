#![forbid(unsafe_code)]

//! Native message → semantic event translation and routing.
//!
//! [`dispatch`] takes one message off the native queue, finds the window it
//! addresses, updates that window's input state, and posts whatever
//! semantic events result onto the window's input queue. Messages for
//! unknown windows or stale timers are dropped.

use fwin_backend::{ControlNotify, NativeDisplay, NativeMsg, ShowState};
use fwin_core::error::Result;
use fwin_core::event::EventKind;
use fwin_core::handle::NativeHandle;
use fwin_core::input_decoder::decode_char;

use crate::registry::Registry;
use crate::timer::{self, TimerKind};
use crate::widget::WidgetKind;
use crate::window::Window;

/// Translate and route one native message.
pub fn dispatch(
    registry: &mut Registry,
    display: &mut dyn NativeDisplay,
    msg: NativeMsg,
) -> Result<()> {
    match msg {
        NativeMsg::Quit => {
            tracing::debug!("native quit");
            registry.broadcast(&EventKind::Terminate);
            Ok(())
        }
        NativeMsg::TimerExpired { param } => timer_expired(registry, param),
        msg => {
            let Some(native) = msg.window() else {
                return Ok(());
            };
            let Some(window) = registry.by_native_mut(native) else {
                tracing::trace!(?native, ?msg, "message for unknown window dropped");
                return Ok(());
            };
            let id = window.id();
            let kinds = translate(window, display, msg)?;
            for kind in kinds {
                registry.post(id, kind)?;
            }
            Ok(())
        }
    }
}

fn timer_expired(registry: &mut Registry, param: u32) -> Result<()> {
    let Some((id, kind)) = timer::decode(param) else {
        tracing::warn!(param, "undecodable timer parameter dropped");
        return Ok(());
    };
    let Ok(window) = registry.window_mut(id) else {
        tracing::trace!(window = %id, "timer for closed window dropped");
        return Ok(());
    };
    let event = match kind {
        TimerKind::Frame => window.timers.frame().map(|_| EventKind::Frame),
        TimerKind::Caller(slot) => match window.timers.get(slot) {
            Some(t) => {
                if !t.repeat {
                    window.timers.take(slot);
                }
                Some(EventKind::Timer(slot))
            }
            None => None,
        },
    };
    match event {
        Some(kind) => registry.post(id, kind),
        None => {
            tracing::trace!(window = %id, ?kind, "stale timer dropped");
            Ok(())
        }
    }
}

/// Update `window` for `msg` and return the events it produces.
fn translate(
    window: &mut Window,
    display: &mut dyn NativeDisplay,
    msg: NativeMsg,
) -> Result<Vec<EventKind>> {
    let mut out = Vec::new();
    match msg {
        NativeMsg::KeyDown { key, .. } => out.extend(window.key_down(key)),
        NativeMsg::KeyUp { key, .. } => window.key_up(key),
        NativeMsg::Char { ch, .. } => out.push(decode_char(ch)),
        NativeMsg::MouseMove { x, y, .. } => {
            if !window.hover {
                window.hover = true;
                out.push(EventKind::Hover);
            }
            window.mouse_moved(x, y);
        }
        NativeMsg::MouseButton { button, down, .. } => window.mouse.button(button, down),
        NativeMsg::MouseLeave { .. } => {
            if window.hover {
                window.hover = false;
                out.push(EventKind::NoHover);
            }
        }
        NativeMsg::Joystick { joy, sample, .. } => window.joystick(joy, sample),
        NativeMsg::Paint { rect, .. } => out.extend(window.on_paint(display, rect)?),
        NativeMsg::Resized { width, height, .. } => out.push(window.on_resize(width, height)),
        NativeMsg::Focus { focused, .. } => {
            window.focused = focused;
            if !focused {
                window.decoder.reset();
                window.mouse.release_all();
            }
            window.update_caret(display)?;
            out.push(if focused {
                EventKind::Focus
            } else {
                EventKind::NoFocus
            });
        }
        NativeMsg::Show { state, .. } => out.push(match state {
            ShowState::Minimized => EventKind::Minimize,
            ShowState::Maximized => EventKind::Maximize,
            ShowState::Normal => EventKind::Normalize,
        }),
        NativeMsg::Close { .. } => out.push(EventKind::Terminate),
        NativeMsg::Command { id, .. } => out.push(EventKind::Menu(id)),
        NativeMsg::Control {
            control, notify, ..
        } => out.extend(control_event(window, display, control, notify)?),
        NativeMsg::TimerExpired { .. } | NativeMsg::Quit => {}
    }
    Ok(out)
}

fn control_event(
    window: &mut Window,
    display: &dyn NativeDisplay,
    control: NativeHandle,
    notify: ControlNotify,
) -> Result<Option<EventKind>> {
    let Some(entry) = window.widgets.by_control_mut(control) else {
        tracing::trace!(?control, ?notify, "notification from unknown control");
        return Ok(None);
    };
    let notify = match (entry.kind, notify) {
        // The spin's edit buddy committed typed text; read the number back.
        (WidgetKind::NumSelect, ControlNotify::TextCommitted) => {
            let text = display.control_text(entry.text_handle())?;
            match text.trim().parse::<i32>() {
                Ok(v) => ControlNotify::Value(v),
                Err(_) => {
                    tracing::debug!(id = entry.id, %text, "non-numeric spin entry ignored");
                    return Ok(None);
                }
            }
        }
        (WidgetKind::Checkbox, ControlNotify::Clicked) => {
            entry.checked = !entry.checked;
            notify
        }
        (WidgetKind::RadioButton, ControlNotify::Clicked) => {
            entry.checked = true;
            notify
        }
        _ => notify,
    };
    Ok(entry.notify(notify))
}
