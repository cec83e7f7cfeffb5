//! The runtime driving a detached terminal.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fwin_core::error::ErrorKind;
use fwin_core::event::EventKind;
use fwin_core::geometry::{Point, Rect};
use fwin_core::handle::FileHandle;
use fwin_runtime::{Context, RuntimeConfig, WidgetKind, WidgetSpec};
use fwin_tty::TtyBackend;

const OUT: FileHandle = FileHandle::STDOUT;
const IN: FileHandle = FileHandle::STDIN;

#[derive(Clone, Default)]
struct Screen(Arc<Mutex<Vec<u8>>>);

impl Write for Screen {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Screen {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn start() -> (Context, Screen) {
    let screen = Screen::default();
    let backend = TtyBackend::detached(20, 5, screen.clone());
    let ctx = Context::new(backend, RuntimeConfig::default().with_buffer_size(20, 5)).unwrap();
    (ctx, screen)
}

#[test]
fn one_pixel_per_character() {
    let (ctx, _screen) = start();
    assert_eq!((ctx.maxx(OUT).unwrap(), ctx.maxy(OUT).unwrap()), (20, 5));
    assert_eq!((ctx.maxxg(OUT).unwrap(), ctx.maxyg(OUT).unwrap()), (20, 5));
}

#[test]
fn text_reaches_the_terminal_at_its_cell() {
    let (ctx, screen) = start();
    ctx.set_cursor(OUT, 3, 2).unwrap();
    ctx.write_str(OUT, "Q").unwrap();
    assert_eq!(ctx.cursor(OUT).unwrap(), Point::new(4, 2));
    let out = screen.text();
    let at = out.rfind("\x1b[2;3H").expect("move to row 2 col 3");
    assert!(out[at..].contains('Q'));
}

#[test]
fn widgets_are_refused() {
    let (ctx, _screen) = start();
    let spec = WidgetSpec::new(WidgetKind::Button, Rect::new(0, 0, 6, 1));
    let err = ctx.create_widget(OUT, 1, &spec).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn timers_work_without_input() {
    let (ctx, _screen) = start();
    ctx.set_timer(OUT, 2, Duration::from_millis(2), false).unwrap();
    assert_eq!(ctx.next_event(IN).unwrap().kind, EventKind::Timer(2));
}

#[test]
fn second_window_is_refused() {
    let (ctx, _screen) = start();
    assert!(ctx.open(IN, None).is_err());
}
