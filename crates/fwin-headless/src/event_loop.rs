#![forbid(unsafe_code)]

//! Message source and control factory for the headless backend.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use fwin_backend::{ControlHandles, ControlSpec, ControlStyle, NativeEventLoop, NativeMsg};
use fwin_core::error::{Error, Result};

use crate::world::{self, SharedWorld};

/// Delivers whatever the driver, timers, and display have sent.
#[derive(Debug)]
pub struct HeadlessEventLoop {
    world: SharedWorld,
    messages: Receiver<NativeMsg>,
}

impl HeadlessEventLoop {
    pub(crate) fn new(world: SharedWorld, messages: Receiver<NativeMsg>) -> Self {
        Self { world, messages }
    }
}

impl NativeEventLoop for HeadlessEventLoop {
    fn wait_message(&mut self, timeout: Duration) -> Result<Option<NativeMsg>> {
        match self.messages.recv_timeout(timeout) {
            Ok(msg) => Ok(Some(msg)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::Disconnected("headless messages")),
        }
    }

    /// Spin controls get an edit buddy showing the low end of their range.
    fn create_control(&mut self, spec: &ControlSpec) -> Result<ControlHandles> {
        let mut w = world::lock(&self.world);
        let main = w.add_control(spec)?;
        let buddy = if spec.style.contains(ControlStyle::BUDDY) {
            Some(w.add_buddy(spec)?)
        } else {
            None
        };
        tracing::trace!(?main, ?buddy, class = ?spec.class, "headless control created");
        Ok(ControlHandles { main, buddy })
    }

    fn destroy_control(&mut self, handles: ControlHandles) -> Result<()> {
        let mut w = world::lock(&self.world);
        w.control(handles.main)?;
        w.controls.remove(&handles.main);
        if let Some(buddy) = handles.buddy {
            w.controls.remove(&buddy);
        }
        Ok(())
    }
}
