#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! With the `tracing` feature the `tracing` macros used by core modules are
//! re-exported at the crate root; without it, no-op macros with the same
//! names stand in so core modules can log unconditionally.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_accept_structured_fields() {
        crate::debug!(latch = 3u8, "structured");
        crate::trace!(buttons = ?[true, false], "debug formatted");
        crate::trace!("plain");
    }
}
