#![forbid(unsafe_code)]

//! Error type shared by every fwin crate.
//!
//! Errors are classified by [`ErrorKind`] rather than by origin: a failed
//! native call and a bad caller argument travel the same path. Whether an
//! error is fatal is decided by the caller (the `fwin` facade offers an
//! abort-on-error helper).

use std::fmt;
use std::io;

use crate::handle::{FileHandle, WindowId};

/// Broad error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidHandle,
    WrongStreamKind,
    WindowIdInUse,
    TableExhausted,
    QueueExhausted,
    WidgetNotFound,
    DuplicateWidget,
    NativeFailure,
    InvalidParameter,
    InvalidPosition,
    Unsupported,
    Disconnected,
}

/// Which direction a logical stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Input,
    Output,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Input => f.write_str("input"),
            StreamKind::Output => f.write_str("output"),
        }
    }
}

/// Errors raised by fwin operations.
#[derive(Debug)]
pub enum Error {
    /// Handle is out of range or not open.
    InvalidHandle(FileHandle),
    /// An input stream was used as output, or the reverse.
    WrongStreamKind {
        handle: FileHandle,
        expected: StreamKind,
    },
    /// Window id already bound to a different stream.
    WindowIdInUse(WindowId),
    /// Window id outside the valid range or not bound.
    InvalidWindowId(WindowId),
    /// A fixed-size table has no free slot.
    TableExhausted(&'static str),
    /// A bounded queue refused an entry.
    QueueExhausted(&'static str),
    /// No widget with this id in the window.
    WidgetNotFound(i32),
    /// A widget with this id already exists in the window.
    DuplicateWidget(i32),
    /// A native call failed.
    Native { code: i32, message: String },
    /// A parameter was outside its valid range.
    InvalidParameter(String),
    /// The cursor is off-grid or out of bounds for the requested mode.
    InvalidPosition,
    /// The operation is not allowed in the current mode.
    Unsupported(&'static str),
    /// A pump thread went away.
    Disconnected(&'static str),
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidHandle(_) | Error::InvalidWindowId(_) => ErrorKind::InvalidHandle,
            Error::WrongStreamKind { .. } => ErrorKind::WrongStreamKind,
            Error::WindowIdInUse(_) => ErrorKind::WindowIdInUse,
            Error::TableExhausted(_) => ErrorKind::TableExhausted,
            Error::QueueExhausted(_) => ErrorKind::QueueExhausted,
            Error::WidgetNotFound(_) => ErrorKind::WidgetNotFound,
            Error::DuplicateWidget(_) => ErrorKind::DuplicateWidget,
            Error::Native { .. } => ErrorKind::NativeFailure,
            Error::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Error::InvalidPosition => ErrorKind::InvalidPosition,
            Error::Unsupported(_) => ErrorKind::Unsupported,
            Error::Disconnected(_) => ErrorKind::Disconnected,
        }
    }

    /// Build a native failure from a code and its description.
    pub fn native(code: i32, message: impl Into<String>) -> Self {
        Error::Native {
            code,
            message: message.into(),
        }
    }

    /// Build a parameter error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidParameter(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidHandle(h) => write!(f, "invalid file handle: {h}"),
            Error::WrongStreamKind { handle, expected } => {
                write!(f, "{handle} is not an {expected} stream")
            }
            Error::WindowIdInUse(id) => write!(f, "{id} is already in use"),
            Error::InvalidWindowId(id) => write!(f, "invalid window id: {}", id.0),
            Error::TableExhausted(table) => write!(f, "{table} table is full"),
            Error::QueueExhausted(queue) => write!(f, "{queue} queue is full"),
            Error::WidgetNotFound(id) => write!(f, "no widget with id {id}"),
            Error::DuplicateWidget(id) => write!(f, "widget id {id} already in use"),
            Error::Native { code, message } => write!(f, "native error {code}: {message}"),
            Error::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Error::InvalidPosition => f.write_str("cursor is off grid or out of bounds"),
            Error::Unsupported(what) => write!(f, "unsupported in current mode: {what}"),
            Error::Disconnected(who) => write!(f, "{who} is no longer running"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Native {
            code: err.raw_os_error().unwrap_or(-1),
            message: err.to_string(),
        }
    }
}

/// Standard result type for fwin APIs.
pub type Result<T> = std::result::Result<T, Error>;
