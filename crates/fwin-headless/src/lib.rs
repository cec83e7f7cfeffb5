#![forbid(unsafe_code)]

//! `fwin-headless` is a deterministic in-memory backend for fwin.
//!
//! Design goals:
//! - **Host-driven input**: a [`HeadlessDriver`] injects native messages
//!   and scripts dialog answers.
//! - **Inspectable output**: every native window is a [`Canvas`]; controls,
//!   menus, carets, and timers are plain records.
//! - **Real threads**: the event loop blocks on a channel with a timeout and
//!   timers run on their own threads, so the runtime's pumps behave as they
//!   do on a real system.
//!
//! ```ignore
//! let backend = HeadlessBackend::new();
//! let driver = backend.driver();
//! let ctx = Context::new(backend, RuntimeConfig::default())?;
//! ```
//!
//! [`Canvas`]: fwin_render::canvas::Canvas

mod dialogs;
mod display;
mod driver;
mod event_loop;
mod world;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use fwin_backend::{Backend, NativeMsg};
use fwin_core::error::Result;
use fwin_render::style::FontMetrics;

pub use dialogs::HeadlessDialogs;
pub use display::{HEADLESS_FONTS, HeadlessDisplay};
pub use driver::HeadlessDriver;
pub use event_loop::HeadlessEventLoop;
pub use world::{DialogReply, NativeControl, NativeWindow};

use world::{SharedWorld, World};

/// The headless system, before it is split across the runtime's threads.
#[derive(Debug)]
pub struct HeadlessBackend {
    world: SharedWorld,
    events: Sender<NativeMsg>,
    messages: Receiver<NativeMsg>,
}

impl HeadlessBackend {
    /// A system with 8x16 pixel character cells.
    #[must_use]
    pub fn new() -> Self {
        Self::with_metrics(FontMetrics::default())
    }

    /// A system whose default font has `metrics`.
    #[must_use]
    pub fn with_metrics(metrics: FontMetrics) -> Self {
        let (events, messages) = mpsc::channel();
        Self {
            world: Arc::new(Mutex::new(World::new(metrics))),
            events,
            messages,
        }
    }

    /// A driver for this system; it stays valid after [`Backend::split`].
    #[must_use]
    pub fn driver(&self) -> HeadlessDriver {
        HeadlessDriver::new(Arc::clone(&self.world), self.events.clone())
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for HeadlessBackend {
    type Display = HeadlessDisplay;
    type EventLoop = HeadlessEventLoop;
    type Dialogs = HeadlessDialogs;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn split(self) -> Result<(HeadlessDisplay, HeadlessEventLoop, HeadlessDialogs)> {
        Ok((
            HeadlessDisplay::new(Arc::clone(&self.world), self.events),
            HeadlessEventLoop::new(Arc::clone(&self.world), self.messages),
            HeadlessDialogs::new(self.world),
        ))
    }
}
