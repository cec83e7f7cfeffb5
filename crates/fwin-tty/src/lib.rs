#![forbid(unsafe_code)]

//! Character-terminal backend for fwin.
//!
//! The terminal is one native window whose pixels are character cells
//! ([`FontMetrics::UNIT`]). Input comes from crossterm and is expanded into
//! native key transitions; output is a shadow canvas diffed on every flush.
//!
//! | Concern | Support |
//! |---------|---------|
//! | Windows | one, no children |
//! | Keys, mouse, focus, resize | yes |
//! | Timers | yes, on their own threads |
//! | Controls, menus | no (`Unsupported`) |
//! | Dialogs | alerts are logged; the rest are `Unsupported` |
//!
//! ```no_run
//! use fwin_tty::{SessionOptions, TtyBackend};
//!
//! let backend = TtyBackend::open(SessionOptions::default())?;
//! let (cols, rows) = backend.terminal_size();
//! # Ok::<(), fwin_core::error::Error>(())
//! ```
//!
//! [`FontMetrics::UNIT`]: fwin_render::style::FontMetrics::UNIT

mod dialogs;
mod display;
mod input;
mod session;

use std::io::{self, Write};
use std::sync::{Arc, mpsc};

use fwin_backend::Backend;
use fwin_core::error::Result;
use fwin_core::handle::NativeHandle;

pub use dialogs::TtyDialogs;
pub use display::TtyDisplay;
pub use input::{TtyEventLoop, translate};
pub use session::{SessionOptions, TerminalSession};

/// Handle of the one window a terminal has.
pub const TERMINAL_WINDOW: NativeHandle = NativeHandle(1);

/// A terminal, before it is split across the runtime's threads.
pub struct TtyBackend {
    session: Option<Arc<TerminalSession>>,
    out: Box<dyn Write + Send>,
    size: (i32, i32),
}

impl std::fmt::Debug for TtyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtyBackend")
            .field("live", &self.is_live())
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl TtyBackend {
    /// Take over the controlling terminal.
    ///
    /// # Errors
    ///
    /// Fails when stdout is not a terminal or raw mode cannot be entered.
    pub fn open(options: SessionOptions) -> Result<Self> {
        let session = TerminalSession::new(options)?;
        let (cols, rows) = crossterm::terminal::size()?;
        tracing::info!(cols, rows, "terminal backend open");
        Ok(Self {
            session: Some(Arc::new(session)),
            out: Box::new(io::stdout()),
            size: (i32::from(cols), i32::from(rows)),
        })
    }

    /// A terminal of `cols` x `rows` that writes to `out` and reads no input.
    /// Timers still fire.
    pub fn detached(cols: i32, rows: i32, out: impl Write + Send + 'static) -> Self {
        Self {
            session: None,
            out: Box::new(out),
            size: (cols, rows),
        }
    }

    /// Size in character cells at start-up.
    pub fn terminal_size(&self) -> (i32, i32) {
        self.size
    }

    pub fn is_live(&self) -> bool {
        self.session.is_some()
    }
}

impl Backend for TtyBackend {
    type Display = TtyDisplay;
    type EventLoop = TtyEventLoop;
    type Dialogs = TtyDialogs;

    fn name(&self) -> &'static str {
        "tty"
    }

    fn split(self) -> Result<(TtyDisplay, TtyEventLoop, TtyDialogs)> {
        let (timers, messages) = mpsc::channel();
        Ok((
            TtyDisplay::new(self.out, timers, self.session.clone()),
            TtyEventLoop::new(self.session, messages),
            TtyDialogs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use fwin_backend::{NativeDialogs, NativeDisplay, NativeEventLoop, NativeMsg, WindowSpec};
    use fwin_core::geometry::Size;

    #[test]
    fn detached_backend_splits_and_runs_timers() {
        let backend = TtyBackend::detached(20, 5, io::sink());
        assert!(!backend.is_live());
        assert_eq!(backend.terminal_size(), (20, 5));
        assert_eq!(backend.name(), "tty");
        let (mut d, mut e, mut g) = backend.split().unwrap();
        let w = d.create_window(&WindowSpec::new("t", Size::new(20, 5))).unwrap();
        d.set_timer(w, 4, Duration::from_millis(1), false).unwrap();
        assert_eq!(
            e.wait_message(Duration::from_secs(2)).unwrap(),
            Some(NativeMsg::TimerExpired { param: 4 })
        );
        g.alert("t", "m").unwrap();
        assert!(g.open_file("x").is_err());
    }
}
