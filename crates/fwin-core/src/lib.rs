#![forbid(unsafe_code)]

//! Core: handles, geometry, semantic events, errors, and input decoding.
//!
//! Everything here is free of threads and native calls. The runtime crate
//! composes these pieces behind its global lock.

pub mod error;
pub mod event;
pub mod geometry;
pub mod handle;
pub mod input_decoder;
pub mod joystick;
pub mod key;
pub mod logging;
pub mod mouse;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace};
