#![forbid(unsafe_code)]

//! fwin Runtime
//!
//! Turns a multi-threaded native windowing backend into one ordered,
//! blocking event stream per input, with buffered multi-screen windows,
//! timers, widgets, menus, pictures, and modal dialogs.
//!
//! # Key Components
//!
//! - [`Context`] - handle to a running runtime; every operation goes through it
//! - [`RuntimeConfig`] - queue sizes, poll interval, frame rate, default buffer
//! - [`Window`] - per-window screens, cursor state, and input trackers
//! - [`WidgetSpec`] - description of a widget to create
//!
//! # Threads
//!
//! The application thread calls into [`Context`]. A display pump owns the
//! backend's native loop and creates and destroys controls. A dialog pump
//! runs modal dialogs. All shared state sits behind one mutex; see
//! [`context`] for the event flow.

pub mod config;
pub mod context;
mod controls;
pub mod dialog;
pub mod event_queue;
pub mod intertask;
pub mod menu;
pub mod native_queue;
mod output;
pub mod picture;
pub mod pump;
pub mod registry;
pub mod timer;
pub mod translate;
pub mod widget;
pub mod window;

pub use config::RuntimeConfig;
pub use context::Context;
pub use dialog::{DialogAnswer, DialogOp};
pub use menu::{MenuItem, MenuTracker};
pub use picture::MAX_PICTURES;
pub use timer::{FRAME_TIMER_SLOT, MAX_TIMERS};
pub use widget::{WidgetEntry, WidgetKind, WidgetSpec};
pub use window::{MAX_SCREENS, Window};
