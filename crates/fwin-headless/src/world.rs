#![forbid(unsafe_code)]

//! The simulated native system shared by every part of the headless backend.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fwin_backend::{ControlClass, ControlSpec, ControlStyle, MenuItem, WindowSpec};
use fwin_core::error::{Error, Result};
use fwin_core::geometry::Rect;
use fwin_core::handle::{NativeHandle, NativeTimer};
use fwin_render::canvas::Canvas;
use fwin_render::color::PackedRgba;
use fwin_render::style::FontMetrics;

/// How the next modal dialog is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogReply {
    /// Accept whatever the dialog was opened with.
    Accept,
    /// Dismiss without a choice.
    Cancel,
    /// Accept with this path (file dialogs) or text (find).
    Text(String),
    /// Accept with this color.
    Color(PackedRgba),
}

/// A simulated top-level or child window.
#[derive(Debug, Clone)]
pub struct NativeWindow {
    pub title: String,
    pub parent: Option<NativeHandle>,
    pub visible: bool,
    pub surface: Canvas,
    pub caret: Option<Rect>,
    /// `Some(true)` after a raise, `Some(false)` after a lower.
    pub raised: Option<bool>,
    pub menu: Option<Vec<MenuItem>>,
    /// `(enabled, checked)` per menu id, as last set.
    pub menu_state: HashMap<i32, (bool, bool)>,
}

/// A simulated control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeControl {
    pub parent: NativeHandle,
    pub class: ControlClass,
    pub style: ControlStyle,
    pub rect: Rect,
    pub text: String,
    pub items: Vec<String>,
    pub range: (i32, i32),
    pub enabled: bool,
    pub checked: bool,
    pub value: i32,
    pub raised: Option<bool>,
}

impl NativeControl {
    fn from_spec(spec: &ControlSpec) -> Self {
        Self {
            parent: spec.parent,
            class: spec.class,
            style: spec.style,
            rect: spec.rect,
            text: spec.label.clone(),
            items: spec.items.clone(),
            range: spec.range,
            enabled: true,
            checked: false,
            value: spec.range.0,
            raised: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct World {
    next_handle: u64,
    pub(crate) metrics: FontMetrics,
    pub(crate) windows: BTreeMap<NativeHandle, NativeWindow>,
    pub(crate) controls: BTreeMap<NativeHandle, NativeControl>,
    pub(crate) timers: HashMap<NativeTimer, Arc<AtomicBool>>,
    pub(crate) replies: VecDeque<DialogReply>,
    pub(crate) alerts: Vec<(String, String)>,
}

impl World {
    pub(crate) fn new(metrics: FontMetrics) -> Self {
        Self {
            next_handle: 1,
            metrics,
            windows: BTreeMap::new(),
            controls: BTreeMap::new(),
            timers: HashMap::new(),
            replies: VecDeque::new(),
            alerts: Vec::new(),
        }
    }

    /// Handles for windows, controls, and timers share one counter.
    pub(crate) fn mint(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    pub(crate) fn add_window(&mut self, spec: &WindowSpec) -> Result<NativeHandle> {
        if let Some(parent) = spec.parent {
            self.window(parent)?;
        }
        let handle = NativeHandle(self.mint());
        self.windows.insert(
            handle,
            NativeWindow {
                title: spec.title.clone(),
                parent: spec.parent,
                visible: spec.visible,
                surface: Canvas::new(spec.client, PackedRgba::WHITE),
                caret: None,
                raised: None,
                menu: None,
                menu_state: HashMap::new(),
            },
        );
        Ok(handle)
    }

    pub(crate) fn remove_window(&mut self, handle: NativeHandle) -> Result<()> {
        self.windows
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| unknown("window", handle))?;
        self.controls.retain(|_, c| c.parent != handle);
        Ok(())
    }

    pub(crate) fn window(&self, handle: NativeHandle) -> Result<&NativeWindow> {
        self.windows
            .get(&handle)
            .ok_or_else(|| unknown("window", handle))
    }

    pub(crate) fn window_mut(&mut self, handle: NativeHandle) -> Result<&mut NativeWindow> {
        self.windows
            .get_mut(&handle)
            .ok_or_else(|| unknown("window", handle))
    }

    pub(crate) fn add_control(&mut self, spec: &ControlSpec) -> Result<NativeHandle> {
        self.window(spec.parent)?;
        let handle = NativeHandle(self.mint());
        self.controls.insert(handle, NativeControl::from_spec(spec));
        Ok(handle)
    }

    /// The edit buddy of a spin control.
    pub(crate) fn add_buddy(&mut self, spec: &ControlSpec) -> Result<NativeHandle> {
        let mut edit = ControlSpec::new(spec.parent, ControlClass::Edit, spec.rect);
        edit.style = ControlStyle::NUMERIC;
        edit.label = spec.range.0.to_string();
        self.add_control(&edit)
    }

    pub(crate) fn control(&self, handle: NativeHandle) -> Result<&NativeControl> {
        self.controls
            .get(&handle)
            .ok_or_else(|| unknown("control", handle))
    }

    pub(crate) fn control_mut(&mut self, handle: NativeHandle) -> Result<&mut NativeControl> {
        self.controls
            .get_mut(&handle)
            .ok_or_else(|| unknown("control", handle))
    }
}

fn unknown(what: &str, handle: NativeHandle) -> Error {
    Error::native(-1, format!("no such {what} {}", handle.0))
}

/// The world behind its lock.
pub(crate) type SharedWorld = Arc<Mutex<World>>;

pub(crate) fn lock(world: &Mutex<World>) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}
