#![forbid(unsafe_code)]

//! Display and dialog pump threads.
//!
//! The display pump owns the native event loop. Each turn it first answers
//! queued control requests (widget create/destroy), then waits up to the
//! poll interval for one native message, pushes it onto the shared native
//! queue under the lock, and wakes every waiting reader. Control traffic has
//! its own channel so a flood of input never delays a round-trip.
//!
//! The dialog pump owns modal dialogs so that a dialog left open never
//! stalls the display pump.
//!
//! Both threads exit once the stop flag is raised.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use fwin_backend::{ControlHandles, ControlSpec, NativeDialogs, NativeEventLoop};
use fwin_core::error::Result;

use crate::context::Shared;
use crate::dialog::{self, DialogRequest};
use crate::intertask::Intertask;
use crate::native_queue::PushOutcome;

/// Work only the display pump may do.
#[derive(Debug)]
pub enum ControlOp {
    Create(ControlSpec),
    Destroy(ControlHandles),
}

/// A control request; the reply echoes the handles involved.
pub type ControlRequest = Intertask<ControlOp, Result<ControlHandles>>;

/// Start the display pump.
pub fn spawn_display<L>(
    events: L,
    shared: Arc<Shared>,
    controls: Receiver<ControlRequest>,
    poll: Duration,
    stop: Arc<AtomicBool>,
) -> Result<JoinHandle<()>>
where
    L: NativeEventLoop + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("fwin-display-pump".into())
        .spawn(move || run_display(events, &shared, &controls, poll, &stop))?;
    Ok(handle)
}

fn run_display(
    mut events: impl NativeEventLoop,
    shared: &Shared,
    controls: &Receiver<ControlRequest>,
    poll: Duration,
    stop: &AtomicBool,
) {
    tracing::debug!("display pump started");
    while !stop.load(Ordering::Acquire) {
        service_controls(&mut events, controls);
        match events.wait_message(poll) {
            Ok(Some(msg)) => {
                let outcome = shared.lock().native.push(msg);
                if outcome == PushOutcome::DroppedOldest {
                    tracing::warn!("native queue full; dropped oldest message");
                }
                shared.wake.notify_all();
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(%err, "native event loop failed");
                shared.lock().fail_loop();
                shared.wake.notify_all();
                break;
            }
        }
    }
    tracing::debug!("display pump stopped");
}

fn service_controls(events: &mut impl NativeEventLoop, controls: &Receiver<ControlRequest>) {
    while let Ok(req) = controls.try_recv() {
        let reply = match &req.payload {
            ControlOp::Create(spec) => events.create_control(spec),
            ControlOp::Destroy(handles) => events.destroy_control(*handles).map(|()| *handles),
        };
        tracing::trace!(tag = %req.tag, ok = reply.is_ok(), "control request served");
        req.respond(reply);
    }
}

/// Start the dialog pump.
pub fn spawn_dialogs<D>(
    dialogs: D,
    requests: Receiver<DialogRequest>,
    poll: Duration,
    stop: Arc<AtomicBool>,
) -> Result<JoinHandle<()>>
where
    D: NativeDialogs + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("fwin-dialog-pump".into())
        .spawn(move || run_dialogs(dialogs, &requests, poll, &stop))?;
    Ok(handle)
}

fn run_dialogs(
    mut dialogs: impl NativeDialogs,
    requests: &Receiver<DialogRequest>,
    poll: Duration,
    stop: &AtomicBool,
) {
    tracing::debug!("dialog pump started");
    while !stop.load(Ordering::Acquire) {
        match requests.recv_timeout(poll) {
            Ok(req) => {
                let answer = dialog::serve(&mut dialogs, &req.payload);
                tracing::trace!(tag = %req.tag, ok = answer.is_ok(), "dialog served");
                req.respond(answer);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    tracing::debug!("dialog pump stopped");
}
