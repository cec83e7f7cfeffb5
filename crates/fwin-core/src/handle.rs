#![forbid(unsafe_code)]

//! Handle spaces.
//!
//! Three independent identifier spaces meet in the registry:
//!
//! - [`FileHandle`]: application-visible logical file handles. `0..=2` are
//!   reserved for standard input, output, and error.
//! - [`WindowId`]: logical window ids chosen by the application, bound
//!   one-to-one to an output file handle.
//! - [`NativeHandle`]: opaque handles minted by the native windowing layer.

use std::fmt;

/// Maximum number of logical file handles.
pub const MAX_FILES: usize = 100;

/// Maximum logical window id.
pub const MAX_WINDOWS: u32 = 100;

/// A logical file handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle(pub u32);

impl FileHandle {
    pub const STDIN: Self = Self(0);
    pub const STDOUT: Self = Self(1);
    pub const STDERR: Self = Self(2);

    /// First handle available for allocation.
    pub const FIRST_FREE: u32 = 3;

    /// True for the three standard handles.
    #[inline]
    pub const fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_FREE
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {}", self.0)
    }
}

/// A logical window id, `1..=MAX_WINDOWS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl WindowId {
    /// Id of the window opened on stdin/stdout at start-up.
    pub const MAIN: Self = Self(1);

    /// True when the id is inside the valid range.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 1 && self.0 <= MAX_WINDOWS
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window {}", self.0)
    }
}

/// An opaque handle minted by the native layer for a window or control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

/// An opaque handle for a running native timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeTimer(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_handles_are_reserved() {
        assert!(FileHandle::STDIN.is_reserved());
        assert!(FileHandle::STDOUT.is_reserved());
        assert!(FileHandle::STDERR.is_reserved());
        assert!(!FileHandle(FileHandle::FIRST_FREE).is_reserved());
    }

    #[test]
    fn window_id_range() {
        assert!(!WindowId(0).is_valid());
        assert!(WindowId(1).is_valid());
        assert!(WindowId(MAX_WINDOWS).is_valid());
        assert!(!WindowId(MAX_WINDOWS + 1).is_valid());
    }
}
