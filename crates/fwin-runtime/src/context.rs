#![forbid(unsafe_code)]

//! The runtime context.
//!
//! All shared state lives in one [`State`] behind one mutex. The application
//! thread takes the lock for every operation; the display pump takes it only
//! to push native messages. The lock is never held while waiting for a pump
//! to answer a request.
//!
//! # Event flow
//!
//! ```text
//! native loop ──▶ display pump ──▶ NativeQueue ──▶ next_event ──▶ dispatch
//!                      │              (lock)            │            │
//!                      └── notify_all ──▶ Condvar ◀─────┘            ▼
//!                                                      per-input EventQueue
//! ```
//!
//! [`Context::next_event`] drains the caller's input queue first, then any
//! pending mouse or joystick state of windows on that input, then translates
//! native messages (routing events for other inputs to their own queues),
//! and finally waits on the condition variable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use fwin_backend::{Backend, NativeDisplay, WindowSpec};
use fwin_core::error::{Error, Result};
use fwin_core::event::{Event, EventKind};
use fwin_core::geometry::Size;
use fwin_core::handle::{FileHandle, WindowId};
use fwin_render::style::FontId;

use crate::config::RuntimeConfig;
use crate::dialog::DialogRequest;
use crate::intertask::{self, TagSource};
use crate::native_queue::NativeQueue;
use crate::pump::{self, ControlOp, ControlRequest};
use crate::registry::Registry;
use crate::timer::{self, FRAME_TIMER_SLOT, TimerSlot, TimerTable};
use crate::translate;
use crate::widget::WidgetEntry;
use crate::window::{Binding, Window};

pub(crate) const DISPLAY_PUMP: &str = "display pump";

/// Everything guarded by the runtime lock.
pub struct State {
    pub(crate) config: RuntimeConfig,
    pub(crate) registry: Registry,
    pub(crate) native: NativeQueue,
    pub(crate) display: Box<dyn NativeDisplay + Send>,
    loop_failed: bool,
}

impl State {
    /// The native loop died: every window gets a final `Terminate`.
    pub(crate) fn fail_loop(&mut self) {
        self.loop_failed = true;
        self.registry.broadcast(&EventKind::Terminate);
    }
}

/// Lock plus wake signal, shared with the display pump.
pub struct Shared {
    state: Mutex<State>,
    pub(crate) wake: Condvar,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a running fwin runtime.
///
/// Dropping the context closes every window and stops the pumps.
pub struct Context {
    shared: Arc<Shared>,
    pub(crate) controls: SyncSender<ControlRequest>,
    pub(crate) dialogs: SyncSender<DialogRequest>,
    pub(crate) tags: TagSource,
    stop: Arc<AtomicBool>,
    pumps: Vec<JoinHandle<()>>,
    backend: &'static str,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("backend", &self.backend)
            .field("pumps", &self.pumps.len())
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Start the runtime on `backend`.
    ///
    /// With `config.main_window` set, window 1 is opened on stdin/stdout.
    pub fn new<B: Backend>(backend: B, config: RuntimeConfig) -> Result<Self> {
        let config = config.normalized();
        let name = backend.name();
        let (display, events, dialogs) = backend.split()?;
        let poll = config.pump_poll;
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                registry: Registry::new(config.event_queue_capacity),
                native: NativeQueue::new(config.native_queue_capacity),
                display: Box::new(display),
                loop_failed: false,
                config: config.clone(),
            }),
            wake: Condvar::new(),
        });
        let (controls, control_rx) = mpsc::sync_channel(config.control_queue_capacity);
        let (dialog_tx, dialog_rx) = mpsc::sync_channel(config.control_queue_capacity);
        let stop = Arc::new(AtomicBool::new(false));

        let mut ctx = Self {
            shared: Arc::clone(&shared),
            controls,
            dialogs: dialog_tx,
            tags: TagSource::default(),
            stop: Arc::clone(&stop),
            pumps: Vec::with_capacity(2),
            backend: name,
        };
        ctx.pumps.push(pump::spawn_display(
            events,
            shared,
            control_rx,
            poll,
            Arc::clone(&stop),
        )?);
        ctx.pumps
            .push(pump::spawn_dialogs(dialogs, dialog_rx, poll, stop)?);

        if config.main_window {
            ctx.open_window(FileHandle::STDIN, FileHandle::STDOUT, WindowId::MAIN, None)?;
        }
        tracing::info!(backend = name, "fwin runtime started");
        Ok(ctx)
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.shared.lock()
    }

    /// Wake readers blocked in `next_event`. Call after queueing events.
    pub(crate) fn wake(&self) {
        self.shared.wake.notify_all();
    }

    /// Run `f` on the window bound to `output`, then flush the display.
    pub(crate) fn with_window<T>(
        &self,
        output: FileHandle,
        f: impl FnOnce(&mut Window, &mut dyn NativeDisplay) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.lock();
        let st = &mut *guard;
        let window = st.registry.by_output_mut(output)?;
        let out = f(window, st.display.as_mut())?;
        st.display.flush()?;
        Ok(out)
    }

    /// Read-only access to the window bound to `output`.
    pub(crate) fn read_window<T>(
        &self,
        output: FileHandle,
        f: impl FnOnce(&Window) -> T,
    ) -> Result<T> {
        let guard = self.lock();
        guard.registry.by_output(output).map(f)
    }

    // ── Streams and windows ────────────────────────────────────────────

    /// Lowest free file handle.
    pub fn allocate_file(&self) -> Result<FileHandle> {
        self.lock().registry.allocate_file()
    }

    /// Lowest unbound window id.
    pub fn allocate_window_id(&self) -> Result<WindowId> {
        self.lock().registry.allocate_window_id()
    }

    /// Bind `output` to a new window `id` fed by `input`.
    ///
    /// The input stream is opened if it is not open yet. Binding the same
    /// triple again is a no-op.
    pub fn open_window(
        &self,
        input: FileHandle,
        output: FileHandle,
        id: WindowId,
        parent: Option<WindowId>,
    ) -> Result<()> {
        let binding = Binding {
            id,
            input,
            output,
            parent,
        };
        let mut guard = self.lock();
        open_locked(&mut guard, binding)
    }

    /// Open a new input stream with no windows yet.
    pub fn open_input(&self) -> Result<FileHandle> {
        self.lock().registry.open_input()
    }

    /// Open a new window on the already open `input`, allocating the output
    /// handle and the window id. Returns the output handle.
    pub fn open(&self, input: FileHandle, parent: Option<WindowId>) -> Result<FileHandle> {
        let mut guard = self.lock();
        guard.registry.queue_mut(input)?;
        let output = guard.registry.allocate_file()?;
        let id = guard.registry.allocate_window_id()?;
        open_locked(
            &mut guard,
            Binding {
                id,
                input,
                output,
                parent,
            },
        )?;
        Ok(output)
    }

    /// Window id bound to `output`.
    pub fn window_id(&self, output: FileHandle) -> Result<WindowId> {
        self.lock().registry.window_id(output)
    }

    /// Number of windows fed by `input`.
    pub fn link_count(&self, input: FileHandle) -> usize {
        self.lock().registry.link_count(input)
    }

    /// True when `input` is an open input stream.
    pub fn is_input_open(&self, input: FileHandle) -> bool {
        self.lock().registry.is_input(input)
    }

    /// Close the window bound to `output`, its children first.
    ///
    /// The input stream closes with its last linked window (standard input
    /// never closes).
    pub fn close(&self, output: FileHandle) -> Result<()> {
        let children = {
            let st = self.lock();
            let id = st.registry.window_id(output)?;
            st.registry.children(id)
        };
        for child in children {
            self.close(child)?;
        }

        let (native, widgets) = {
            let mut guard = self.lock();
            let st = &mut *guard;
            let mut unbound = st.registry.unbind(output)?;
            let (timers, widgets) = unbound.window.teardown();
            for t in timers {
                if let Err(err) = st.display.kill_timer(t) {
                    tracing::warn!(%err, "timer kill failed during close");
                }
            }
            (unbound.window.native, widgets)
        };
        for entry in widgets {
            if let Err(err) = self.destroy_control(&entry) {
                tracing::warn!(id = entry.id, %err, "control destroy failed during close");
            }
        }
        let mut guard = self.lock();
        guard.display.destroy_window(native)?;
        guard.display.flush()
    }

    pub(crate) fn destroy_control(&self, entry: &WidgetEntry) -> Result<()> {
        let tag = self.tags.next();
        intertask::request(
            &self.controls,
            tag,
            ControlOp::Destroy(entry.handles),
            DISPLAY_PUMP,
        )?
        .map(|_| ())
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Block until an event for `input` is available.
    ///
    /// Events for windows on other input streams encountered on the way are
    /// queued for their own readers.
    pub fn next_event(&self, input: FileHandle) -> Result<Event> {
        let mut guard = self.lock();
        loop {
            let st = &mut *guard;
            if let Some(event) = st.registry.queue_mut(input)?.pop() {
                return Ok(event);
            }
            if let Some(event) = st
                .registry
                .windows_on_mut(input)
                .find_map(|w| w.poll_input().map(|kind| Event::new(w.id(), kind)))
            {
                return Ok(event);
            }
            if let Some(msg) = st.native.pop() {
                tracing::trace!(?msg, "dispatching");
                translate::dispatch(&mut st.registry, st.display.as_mut(), msg)?;
                st.display.flush()?;
                self.shared.wake.notify_all();
                continue;
            }
            if st.loop_failed {
                return Err(Error::Disconnected(DISPLAY_PUMP));
            }
            guard = self
                .shared
                .wake
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Queue an event on `window`'s input as if it came from the system.
    pub fn post_event(&self, window: WindowId, kind: EventKind) -> Result<()> {
        self.lock().registry.post(window, kind)?;
        self.wake();
        Ok(())
    }

    // ── Timers ─────────────────────────────────────────────────────────

    /// Start timer `slot` on the window bound to `output`.
    ///
    /// A running timer in the same slot is replaced. One-shot timers free
    /// their slot after firing; repeating timers run until killed.
    pub fn set_timer(
        &self,
        output: FileHandle,
        slot: u8,
        period: Duration,
        repeat: bool,
    ) -> Result<()> {
        TimerTable::check_slot(slot)?;
        let mut guard = self.lock();
        let st = &mut *guard;
        let window = st.registry.by_output_mut(output)?;
        let param = timer::encode(window.id(), slot)?;
        let native =
            st.display
                .set_timer(window.native, param, timer::clamp_period(period), repeat)?;
        if let Some(old) = window.timers.install(slot, TimerSlot { native, repeat })? {
            st.display.kill_timer(old.native)?;
        }
        tracing::debug!(window = %window.id(), slot, ?period, repeat, "timer set");
        Ok(())
    }

    /// Stop timer `slot`. Killing an idle slot does nothing.
    pub fn kill_timer(&self, output: FileHandle, slot: u8) -> Result<()> {
        TimerTable::check_slot(slot)?;
        let mut guard = self.lock();
        let st = &mut *guard;
        let window = st.registry.by_output_mut(output)?;
        match window.timers.take(slot) {
            Some(t) => st.display.kill_timer(t.native),
            None => Ok(()),
        }
    }

    /// Start or stop the frame tick.
    pub fn set_frame_timer(&self, output: FileHandle, on: bool) -> Result<()> {
        let mut guard = self.lock();
        let st = &mut *guard;
        let period = st.config.frame_period();
        let window = st.registry.by_output_mut(output)?;
        match (on, window.timers.frame()) {
            (true, None) => {
                let param = timer::encode(window.id(), FRAME_TIMER_SLOT)?;
                let native = st.display.set_timer(window.native, param, period, true)?;
                window.timers.set_frame(Some(native));
            }
            (false, Some(native)) => {
                window.timers.set_frame(None);
                st.display.kill_timer(native)?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn open_locked(st: &mut State, binding: Binding) -> Result<()> {
    if st.registry.check_bind(&binding)? {
        return Ok(());
    }
    let parent = match binding.parent {
        Some(p) => Some(st.registry.window(p)?.native),
        None => None,
    };
    let metrics = st
        .display
        .font_metrics(FontId::TERMINAL, st.config.font_metrics.cell_height)?;
    let buffer = Size::new(
        st.config.buffer_cols * metrics.cell_width.max(1),
        st.config.buffer_rows * metrics.cell_height.max(1),
    );
    let title = format!("fwin {}", binding.id.0);
    let spec = WindowSpec::new(title.clone(), buffer).with_parent(parent);
    let native = st.display.create_window(&spec)?;
    let mut window = Window::new(binding, native, buffer, metrics);
    window.title = title;
    window.restore(st.display.as_mut(), None)?;
    if let Err(err) = st.registry.bind(window) {
        st.display.destroy_window(native)?;
        return Err(err);
    }
    st.display.flush()?;
    tracing::debug!(window = %binding.id, ?native, "window opened");
    Ok(())
}

impl Drop for Context {
    fn drop(&mut self) {
        loop {
            let next = self.lock().registry.windows().next().map(|w| w.binding.output);
            let Some(output) = next else { break };
            if let Err(err) = self.close(output) {
                tracing::warn!(%output, %err, "close failed during shutdown");
                break;
            }
        }
        self.stop.store(true, Ordering::Release);
        for handle in self.pumps.drain(..) {
            if handle.join().is_err() {
                tracing::error!("pump thread panicked");
            }
        }
        tracing::info!(backend = self.backend, "fwin runtime stopped");
    }
}
