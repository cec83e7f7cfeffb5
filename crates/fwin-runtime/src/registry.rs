#![forbid(unsafe_code)]

//! Handle registry: file handles, window ids, and native handles.
//!
//! The file table maps small integers to streams. An input stream owns the
//! event queue its reader drains; an output stream names the window it draws
//! on. Several output streams may link to one input stream (fan-in); the
//! input stays open until the last link is gone. Handle 0 is the permanent
//! standard input.

use fwin_core::error::{Error, Result, StreamKind};
use fwin_core::event::{Event, EventKind};
use fwin_core::handle::{FileHandle, MAX_FILES, MAX_WINDOWS, NativeHandle, WindowId};

use crate::event_queue::EventQueue;
use crate::window::{Binding, Window};

#[derive(Debug)]
enum Stream {
    Free,
    Input(EventQueue),
    Output(WindowId),
}

/// What [`Registry::unbind`] released.
#[derive(Debug)]
pub struct Unbound {
    pub window: Window,
    /// True when the input stream closed with it.
    pub input_closed: bool,
}

#[derive(Debug)]
pub struct Registry {
    files: Vec<Stream>,
    windows: Vec<Window>,
    queue_capacity: usize,
}

impl Registry {
    /// Empty registry with standard input open.
    pub fn new(queue_capacity: usize) -> Self {
        let mut files: Vec<Stream> = (0..MAX_FILES).map(|_| Stream::Free).collect();
        files[FileHandle::STDIN.index()] = Stream::Input(EventQueue::new(queue_capacity));
        Self {
            files,
            windows: Vec::new(),
            queue_capacity,
        }
    }

    fn slot(&self, fh: FileHandle) -> Result<&Stream> {
        self.files.get(fh.index()).ok_or(Error::InvalidHandle(fh))
    }

    /// Lowest free handle above the reserved ones.
    pub fn allocate_file(&self) -> Result<FileHandle> {
        (FileHandle::FIRST_FREE as usize..MAX_FILES)
            .find(|&i| matches!(self.files[i], Stream::Free))
            .map(|i| FileHandle(i as u32))
            .ok_or(Error::TableExhausted("file handles"))
    }

    /// Open a fresh input stream on the lowest free handle.
    pub fn open_input(&mut self) -> Result<FileHandle> {
        let fh = self.allocate_file()?;
        self.files[fh.index()] = Stream::Input(EventQueue::new(self.queue_capacity));
        tracing::debug!(input = %fh, "input stream opened");
        Ok(fh)
    }

    /// Lowest window id not bound to any output.
    pub fn allocate_window_id(&self) -> Result<WindowId> {
        (1..=MAX_WINDOWS)
            .map(WindowId)
            .find(|&id| self.window(id).is_err())
            .ok_or(Error::TableExhausted("window ids"))
    }

    /// Validate a binding before any native window is created.
    ///
    /// Returns `Ok(true)` when exactly this binding already exists.
    pub fn check_bind(&self, b: &Binding) -> Result<bool> {
        if !b.id.is_valid() {
            return Err(Error::InvalidWindowId(b.id));
        }
        match self.slot(b.input)? {
            Stream::Output(_) => {
                return Err(Error::WrongStreamKind {
                    handle: b.input,
                    expected: StreamKind::Input,
                });
            }
            Stream::Free | Stream::Input(_) => {}
        }
        if b.output == FileHandle::STDIN || b.output == b.input {
            return Err(Error::WrongStreamKind {
                handle: b.output,
                expected: StreamKind::Output,
            });
        }
        match self.slot(b.output)? {
            Stream::Input(_) => {
                return Err(Error::WrongStreamKind {
                    handle: b.output,
                    expected: StreamKind::Output,
                });
            }
            Stream::Output(id) if *id == b.id => return Ok(true),
            Stream::Output(_) => return Err(Error::InvalidHandle(b.output)),
            Stream::Free => {}
        }
        if self.window(b.id).is_ok() {
            return Err(Error::WindowIdInUse(b.id));
        }
        if let Some(parent) = b.parent {
            self.window(parent)?;
        }
        Ok(false)
    }

    /// Record a window and its streams, opening the input on first use.
    pub fn bind(&mut self, window: Window) -> Result<()> {
        let b = window.binding;
        if self.check_bind(&b)? {
            return Ok(());
        }
        if matches!(self.files[b.input.index()], Stream::Free) {
            self.files[b.input.index()] = Stream::Input(EventQueue::new(self.queue_capacity));
            tracing::debug!(input = %b.input, "input stream opened");
        }
        self.files[b.output.index()] = Stream::Output(b.id);
        tracing::debug!(window = %b.id, input = %b.input, output = %b.output, "window bound");
        self.windows.push(window);
        Ok(())
    }

    /// Output streams linked to `input`.
    pub fn link_count(&self, input: FileHandle) -> usize {
        self.windows
            .iter()
            .filter(|w| w.binding.input == input)
            .count()
    }

    /// Remove the window bound to `output`. Its pending events are dropped
    /// and the input closes when no other window links to it.
    pub fn unbind(&mut self, output: FileHandle) -> Result<Unbound> {
        let id = self.window_id(output)?;
        let pos = self
            .windows
            .iter()
            .position(|w| w.id() == id)
            .ok_or(Error::InvalidWindowId(id))?;
        let window = self.windows.remove(pos);
        self.files[output.index()] = Stream::Free;
        let input = window.binding.input;
        let mut input_closed = false;
        if self.link_count(input) == 0 && input != FileHandle::STDIN {
            self.files[input.index()] = Stream::Free;
            input_closed = true;
        } else if let Stream::Input(queue) = &mut self.files[input.index()] {
            queue.retain(|e| e.window != id);
        }
        tracing::debug!(window = %id, %output, input_closed, "window unbound");
        Ok(Unbound {
            window,
            input_closed,
        })
    }

    /// True when `fh` is an open input stream.
    pub fn is_input(&self, fh: FileHandle) -> bool {
        matches!(self.slot(fh), Ok(Stream::Input(_)))
    }

    pub fn queue_mut(&mut self, input: FileHandle) -> Result<&mut EventQueue> {
        match self.files.get_mut(input.index()) {
            Some(Stream::Input(q)) => Ok(q),
            Some(Stream::Output(_)) => Err(Error::WrongStreamKind {
                handle: input,
                expected: StreamKind::Input,
            }),
            _ => Err(Error::InvalidHandle(input)),
        }
    }

    /// Window id bound to an output stream.
    pub fn window_id(&self, output: FileHandle) -> Result<WindowId> {
        match self.slot(output)? {
            Stream::Output(id) => Ok(*id),
            Stream::Input(_) => Err(Error::WrongStreamKind {
                handle: output,
                expected: StreamKind::Output,
            }),
            Stream::Free => Err(Error::InvalidHandle(output)),
        }
    }

    pub fn window(&self, id: WindowId) -> Result<&Window> {
        self.windows
            .iter()
            .find(|w| w.id() == id)
            .ok_or(Error::InvalidWindowId(id))
    }

    pub fn window_mut(&mut self, id: WindowId) -> Result<&mut Window> {
        self.windows
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or(Error::InvalidWindowId(id))
    }

    pub fn by_output(&self, output: FileHandle) -> Result<&Window> {
        self.window(self.window_id(output)?)
    }

    pub fn by_output_mut(&mut self, output: FileHandle) -> Result<&mut Window> {
        let id = self.window_id(output)?;
        self.window_mut(id)
    }

    pub fn by_native_mut(&mut self, native: NativeHandle) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.native == native)
    }

    /// Output streams of the windows whose parent is `id`.
    pub fn children(&self, id: WindowId) -> Vec<FileHandle> {
        self.windows
            .iter()
            .filter(|w| w.binding.parent == Some(id))
            .map(|w| w.binding.output)
            .collect()
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window> + '_ {
        self.windows.iter()
    }

    /// Windows whose events go to `input`.
    pub fn windows_on_mut(&mut self, input: FileHandle) -> impl Iterator<Item = &mut Window> + '_ {
        self.windows
            .iter_mut()
            .filter(move |w| w.binding.input == input)
    }

    /// Queue an event on the input stream of window `id`.
    pub fn post(&mut self, id: WindowId, kind: EventKind) -> Result<()> {
        let input = self.window(id)?.binding.input;
        let queue = self.queue_mut(input)?;
        if let Some(dropped) = queue.push(Event::new(id, kind)) {
            tracing::warn!(%input, ?dropped, "event queue full; dropped oldest");
        }
        Ok(())
    }

    /// Queue `kind` for every window.
    pub fn broadcast(&mut self, kind: &EventKind) {
        let ids: Vec<WindowId> = self.windows.iter().map(Window::id).collect();
        for id in ids {
            if let Err(err) = self.post(id, kind.clone()) {
                tracing::warn!(window = %id, %err, "broadcast failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwin_core::error::ErrorKind;
    use fwin_core::geometry::Size;
    use fwin_render::style::FontMetrics;

    fn window(id: u32, input: u32, output: u32, parent: Option<u32>) -> Window {
        let binding = Binding {
            id: WindowId(id),
            input: FileHandle(input),
            output: FileHandle(output),
            parent: parent.map(WindowId),
        };
        Window::new(
            binding,
            NativeHandle(u64::from(id)),
            Size::new(8, 8),
            FontMetrics::UNIT,
        )
    }

    #[test]
    fn stdin_is_open_from_the_start() {
        let r = Registry::new(4);
        assert!(r.is_input(FileHandle::STDIN));
        assert_eq!(r.allocate_file().unwrap(), FileHandle(FileHandle::FIRST_FREE));
        assert_eq!(r.allocate_window_id().unwrap(), WindowId(1));
    }

    #[test]
    fn open_input_takes_lowest_free() {
        let mut r = Registry::new(4);
        let a = r.open_input().unwrap();
        assert_eq!(a, FileHandle(3));
        assert!(r.is_input(a));
        assert_eq!(r.allocate_file().unwrap(), FileHandle(4));
    }

    #[test]
    fn fan_in_keeps_input_until_last_link() {
        let mut r = Registry::new(4);
        r.bind(window(1, 3, 4, None)).unwrap();
        r.bind(window(2, 3, 5, None)).unwrap();
        assert_eq!(r.link_count(FileHandle(3)), 2);

        let gone = r.unbind(FileHandle(4)).unwrap();
        assert!(!gone.input_closed);
        assert!(r.is_input(FileHandle(3)));
        assert!(r.window(WindowId(2)).is_ok());
        assert_eq!(r.link_count(FileHandle(3)), 1);

        assert!(r.unbind(FileHandle(5)).unwrap().input_closed);
        assert!(!r.is_input(FileHandle(3)));
    }

    #[test]
    fn stdin_survives_its_last_window() {
        let mut r = Registry::new(4);
        r.bind(window(1, 0, 1, None)).unwrap();
        assert!(!r.unbind(FileHandle::STDOUT).unwrap().input_closed);
        assert!(r.is_input(FileHandle::STDIN));
    }

    #[test]
    fn rebinding_same_triple_is_a_no_op() {
        let mut r = Registry::new(4);
        r.bind(window(1, 0, 1, None)).unwrap();
        r.bind(window(1, 0, 1, None)).unwrap();
        assert_eq!(r.windows().count(), 1);
    }

    #[test]
    fn id_in_use_and_wrong_kinds() {
        let mut r = Registry::new(4);
        r.bind(window(1, 0, 1, None)).unwrap();
        let err = r.bind(window(1, 0, 5, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WindowIdInUse);
        let err = r.bind(window(2, 1, 5, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongStreamKind);
        let err = r.bind(window(2, 3, 0, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongStreamKind);
        let err = r.bind(window(0, 3, 4, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
        assert_eq!(
            r.window_id(FileHandle::STDIN).unwrap_err().kind(),
            ErrorKind::WrongStreamKind
        );
        assert_eq!(
            r.queue_mut(FileHandle::STDOUT).unwrap_err().kind(),
            ErrorKind::WrongStreamKind
        );
        assert!(r.window_id(FileHandle(MAX_FILES as u32)).is_err());
    }

    #[test]
    fn parent_must_exist() {
        let mut r = Registry::new(4);
        assert!(r.bind(window(2, 0, 4, Some(1))).is_err());
        r.bind(window(1, 0, 1, None)).unwrap();
        r.bind(window(2, 0, 4, Some(1))).unwrap();
        assert_eq!(r.children(WindowId(1)), vec![FileHandle(4)]);
    }

    #[test]
    fn post_routes_by_window_and_unbind_purges() {
        let mut r = Registry::new(4);
        r.bind(window(1, 3, 4, None)).unwrap();
        r.bind(window(2, 3, 5, None)).unwrap();
        r.post(WindowId(1), EventKind::Frame).unwrap();
        r.post(WindowId(2), EventKind::Timer(1)).unwrap();
        r.unbind(FileHandle(4)).unwrap();
        let q = r.queue_mut(FileHandle(3)).unwrap();
        assert_eq!(q.pop(), Some(Event::new(WindowId(2), EventKind::Timer(1))));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn lookups() {
        let mut r = Registry::new(4);
        r.bind(window(7, 0, 1, None)).unwrap();
        assert_eq!(r.by_native_mut(NativeHandle(7)).unwrap().id(), WindowId(7));
        assert!(r.by_native_mut(NativeHandle(8)).is_none());
        assert_eq!(r.by_output(FileHandle::STDOUT).unwrap().id(), WindowId(7));
        assert_eq!(r.allocate_window_id().unwrap(), WindowId(1));
        assert_eq!(r.windows_on_mut(FileHandle::STDIN).count(), 1);
    }
}
