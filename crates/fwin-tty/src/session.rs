#![forbid(unsafe_code)]

//! Terminal lifecycle: raw mode and terminal features, restored on drop.
//!
//! Cleanup runs on normal drop and, through a panic hook installed on first
//! use, when the application panics.

use std::io::{self, Write};
use std::sync::OnceLock;

/// Terminal features enabled for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Draw on the alternate screen buffer.
    pub alternate_screen: bool,
    /// Report mouse motion and buttons.
    pub mouse_capture: bool,
    /// Report focus gained and lost.
    pub focus_events: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: true,
            focus_events: true,
        }
    }
}

/// RAII guard over the controlling terminal.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested features.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or a feature sequence
    /// cannot be written.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        // From here on, drop restores whatever was switched on.
        let session = Self { options };
        let mut stdout = io::stdout();
        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        }
        if options.mouse_capture {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
        }
        if options.focus_events {
            crossterm::execute!(stdout, crossterm::event::EnableFocusChange)?;
        }
        crossterm::execute!(stdout, crossterm::cursor::Hide)?;
        tracing::debug!(?options, "terminal session open");
        Ok(session)
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    fn cleanup(&self) {
        let mut stdout = io::stdout();
        if self.options.focus_events {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableFocusChange);
        }
        if self.options.mouse_capture {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
        }
        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
        if self.options.alternate_screen {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
        }
        // Raw mode goes last.
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = stdout.flush();
        tracing::info!("terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::event::DisableFocusChange);
    let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}
