#![forbid(unsafe_code)]

//! fwin public facade crate.
//!
//! This crate provides the stable surface for applications. It re-exports
//! the common types from the internal crates, offers a prelude, and holds
//! the policy for errors an application chooses not to handle.

use std::fmt::Display;

// --- Core re-exports -------------------------------------------------------

pub use fwin_core::error::{Error, ErrorKind, Result};
pub use fwin_core::event::{Event, EventKind};
pub use fwin_core::geometry::{Point, Rect, Size};
pub use fwin_core::handle::{FileHandle, WindowId};
pub use fwin_core::joystick::JoySample;

// --- Render re-exports -----------------------------------------------------

pub use fwin_render::{FontId, FontMetrics, MixMode, PackedRgba, TextAttrs};

// --- Runtime re-exports ----------------------------------------------------

pub use fwin_backend::{Backend, FindOptions, FindQuery, FontChoice, MenuItem};
pub use fwin_runtime::{Context, RuntimeConfig, WidgetKind, WidgetSpec};

// --- Backends --------------------------------------------------------------

#[cfg(feature = "headless")]
pub use fwin_headless::{DialogReply, HeadlessBackend, HeadlessDriver};
#[cfg(feature = "tty")]
pub use fwin_tty::{SessionOptions, TtyBackend};

// --- Fatal errors ----------------------------------------------------------

/// Unwrap `result`, or report the error and end the process.
///
/// The error is logged at `error` level, printed to stderr, and the process
/// exits with status 1. Destructors of live values do not run, so call this
/// only where giving up is the intended response.
pub fn or_abort<T, E: Display>(result: std::result::Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(%err, "fatal error");
            eprintln!("fwin: {err}");
            std::process::exit(1);
        }
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Context, Error, Event, EventKind, FileHandle, MenuItem, PackedRgba, Point, Rect, Result,
        RuntimeConfig, WidgetKind, WidgetSpec, WindowId, or_abort,
    };

    pub use crate::{backend, core, render, runtime};
}

pub use fwin_backend as backend;
pub use fwin_core as core;
pub use fwin_render as render;
pub use fwin_runtime as runtime;
