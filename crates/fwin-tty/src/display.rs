#![forbid(unsafe_code)]

//! The terminal as a single native window.
//!
//! One pixel is one character cell. Drawing goes to a shadow [`Canvas`];
//! [`NativeDisplay::flush`] diffs it against what was last presented and
//! writes only the changed cells.
//!
//! # Invariants
//!
//! 1. At most one window exists, always [`TERMINAL_WINDOW`].
//! 2. `presented`, when set, has the size of `frame`.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType, SetTitle};
use fwin_backend::{MenuItem, NativeDisplay, NativeMsg, WindowSpec};
use fwin_core::error::{Error, Result};
use fwin_core::geometry::{Point, Rect, Size};
use fwin_core::handle::{NativeHandle, NativeTimer};
use fwin_render::canvas::{Canvas, Pixel};
use fwin_render::color::PackedRgba;
use fwin_render::style::{FontId, FontMetrics, TextAttrs, TextStyle};
use fwin_render::surface::DrawingSurface;

use crate::TERMINAL_WINDOW;
use crate::session::TerminalSession;

const NO_CONTROLS: Error = Error::Unsupported("controls on a text terminal");

/// Shadow frame and presenter for the terminal window.
pub struct TtyDisplay {
    out: Box<dyn Write + Send>,
    frame: Option<Canvas>,
    presented: Option<Canvas>,
    caret: Option<Rect>,
    timers: HashMap<NativeTimer, Arc<AtomicBool>>,
    next_timer: u64,
    events: Sender<NativeMsg>,
    _session: Option<Arc<TerminalSession>>,
}

impl std::fmt::Debug for TtyDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtyDisplay")
            .field("frame", &self.frame.as_ref().map(Canvas::size))
            .field("caret", &self.caret)
            .field("timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl TtyDisplay {
    pub(crate) fn new(
        out: Box<dyn Write + Send>,
        events: Sender<NativeMsg>,
        session: Option<Arc<TerminalSession>>,
    ) -> Self {
        Self {
            out,
            frame: None,
            presented: None,
            caret: None,
            timers: HashMap::new(),
            next_timer: 1,
            events,
            _session: session,
        }
    }

    fn frame(&self, window: NativeHandle) -> Result<&Canvas> {
        match &self.frame {
            Some(frame) if window == TERMINAL_WINDOW => Ok(frame),
            _ => Err(Error::native(-1, format!("unknown terminal window {window:?}"))),
        }
    }

    fn frame_mut(&mut self, window: NativeHandle) -> Result<&mut Canvas> {
        match &mut self.frame {
            Some(frame) if window == TERMINAL_WINDOW => Ok(frame),
            _ => Err(Error::native(-1, format!("unknown terminal window {window:?}"))),
        }
    }

    fn draw(&mut self, window: NativeHandle, f: impl FnOnce(&mut Canvas)) -> Result<()> {
        f(self.frame_mut(window)?);
        Ok(())
    }

    /// Write every cell that differs from the last presented frame.
    fn present(&mut self) -> std::io::Result<()> {
        let Some(frame) = &self.frame else {
            return Ok(());
        };
        let mut written = 0usize;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let Some(cell) = frame.get(x, y) else {
                    continue;
                };
                if self
                    .presented
                    .as_ref()
                    .and_then(|p| p.get(x, y))
                    .is_some_and(|old| old == cell)
                {
                    continue;
                }
                write_cell(&mut self.out, x, y, cell)?;
                written += 1;
            }
        }
        match self.caret {
            Some(cell) => crossterm::queue!(self.out, MoveTo(col(cell.x), col(cell.y)), Show)?,
            None => crossterm::queue!(self.out, Hide)?,
        }
        self.out.flush()?;
        if written > 0 {
            tracing::trace!(cells = written, "terminal frame presented");
        }
        self.presented = Some(frame.clone());
        Ok(())
    }
}

fn col(v: i32) -> u16 {
    u16::try_from(v.max(0)).unwrap_or(u16::MAX)
}

fn term_color(c: PackedRgba) -> Color {
    Color::Rgb {
        r: c.r(),
        g: c.g(),
        b: c.b(),
    }
}

fn write_cell(out: &mut impl Write, x: i32, y: i32, cell: &Pixel) -> std::io::Result<()> {
    let (ch, fg, attrs) = match cell.glyph {
        Some(g) => (g.ch, g.foreground, g.attrs),
        None => (' ', cell.color, TextAttrs::empty()),
    };
    crossterm::queue!(out, MoveTo(col(x), col(y)), SetAttribute(Attribute::Reset))?;
    for (flag, attr) in [
        (TextAttrs::BOLD, Attribute::Bold),
        (TextAttrs::ITALIC, Attribute::Italic),
        (TextAttrs::UNDERLINE, Attribute::Underlined),
        (TextAttrs::BLINK, Attribute::SlowBlink),
        (TextAttrs::STRIKEOUT, Attribute::CrossedOut),
    ] {
        if attrs.contains(flag) {
            crossterm::queue!(out, SetAttribute(attr))?;
        }
    }
    crossterm::queue!(
        out,
        SetForegroundColor(term_color(fg)),
        SetBackgroundColor(term_color(cell.color)),
        Print(ch)
    )
}

impl DrawingSurface for TtyDisplay {
    fn surface_size(&self, window: NativeHandle) -> Result<Size> {
        Ok(self.frame(window)?.size())
    }

    fn fill_rect(&mut self, window: NativeHandle, rect: Rect, color: PackedRgba) -> Result<()> {
        self.draw(window, |c| c.fill_rect(rect, color))
    }

    fn set_pixel(&mut self, window: NativeHandle, at: Point, color: PackedRgba) -> Result<()> {
        self.draw(window, |c| c.set_pixel(at, color))
    }

    fn draw_line(
        &mut self,
        window: NativeHandle,
        from: Point,
        to: Point,
        color: PackedRgba,
        width: i32,
    ) -> Result<()> {
        self.draw(window, |c| c.draw_line(from, to, color, width))
    }

    fn draw_ellipse(
        &mut self,
        window: NativeHandle,
        rect: Rect,
        color: PackedRgba,
        filled: bool,
    ) -> Result<()> {
        self.draw(window, |c| c.draw_ellipse(rect, color, filled))
    }

    fn draw_text(
        &mut self,
        window: NativeHandle,
        origin: Point,
        text: &str,
        style: &TextStyle,
    ) -> Result<()> {
        self.draw(window, |c| c.draw_text(origin, text, style))
    }

    fn blit(
        &mut self,
        window: NativeHandle,
        src: &Canvas,
        src_rect: Rect,
        dst: Point,
    ) -> Result<()> {
        self.draw(window, |c| c.copy_from(src, src_rect, dst))
    }

    fn stretch_blit(
        &mut self,
        window: NativeHandle,
        src: &Canvas,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Result<()> {
        self.draw(window, |c| c.stretch_from(src, src_rect, dst_rect))
    }

    fn scroll(
        &mut self,
        window: NativeHandle,
        rect: Rect,
        dx: i32,
        dy: i32,
        fill: PackedRgba,
    ) -> Result<()> {
        self.draw(window, |c| c.scroll(rect, dx, dy, fill))
    }

    /// The terminal has one font and it does not scale.
    fn font_metrics(&self, font: FontId, _height: i32) -> Result<FontMetrics> {
        if font == FontId::TERMINAL {
            Ok(FontMetrics::UNIT)
        } else {
            Err(Error::invalid(format!("font {}", font.0)))
        }
    }
}

impl NativeDisplay for TtyDisplay {
    fn create_window(&mut self, spec: &WindowSpec) -> Result<NativeHandle> {
        if self.frame.is_some() || spec.parent.is_some() {
            return Err(Error::Unsupported("more than one window on a text terminal"));
        }
        crossterm::queue!(self.out, SetTitle(&spec.title), Clear(ClearType::All))?;
        self.frame = Some(Canvas::new(spec.client, PackedRgba::WHITE));
        self.presented = None;
        tracing::debug!(size = ?spec.client, "terminal window created");
        Ok(TERMINAL_WINDOW)
    }

    fn destroy_window(&mut self, window: NativeHandle) -> Result<()> {
        self.frame(window)?;
        self.frame = None;
        self.presented = None;
        self.caret = None;
        crossterm::queue!(self.out, SetAttribute(Attribute::Reset), Clear(ClearType::All))?;
        Ok(())
    }

    fn set_title(&mut self, window: NativeHandle, title: &str) -> Result<()> {
        self.frame(window)?;
        crossterm::queue!(self.out, SetTitle(title))?;
        Ok(())
    }

    fn set_visible(&mut self, window: NativeHandle, _visible: bool) -> Result<()> {
        self.frame(window).map(|_| ())
    }

    fn set_client_size(&mut self, window: NativeHandle, size: Size) -> Result<()> {
        let frame = self.frame_mut(window)?;
        let mut resized = Canvas::new(size, PackedRgba::WHITE);
        resized.copy_from(frame, frame.bounds(), Point::new(0, 0));
        *frame = resized;
        self.presented = None;
        crossterm::queue!(self.out, SetAttribute(Attribute::Reset), Clear(ClearType::All))?;
        Ok(())
    }

    fn raise(&mut self, window: NativeHandle, _front: bool) -> Result<()> {
        self.frame(window).map(|_| ())
    }

    fn set_caret(&mut self, window: NativeHandle, cell: Option<Rect>) -> Result<()> {
        self.frame(window)?;
        self.caret = cell;
        Ok(())
    }

    fn set_timer(
        &mut self,
        window: NativeHandle,
        param: u32,
        period: Duration,
        repeat: bool,
    ) -> Result<NativeTimer> {
        self.frame(window)?;
        self.timers.retain(|_, done| !done.load(Ordering::Acquire));
        let timer = NativeTimer(self.next_timer);
        self.next_timer += 1;
        let done = Arc::new(AtomicBool::new(false));
        self.timers.insert(timer, Arc::clone(&done));
        let events = self.events.clone();
        thread::Builder::new()
            .name("fwin-tty-timer".into())
            .spawn(move || {
                loop {
                    thread::sleep(period);
                    if done.load(Ordering::Acquire) {
                        break;
                    }
                    if events.send(NativeMsg::TimerExpired { param }).is_err() || !repeat {
                        done.store(true, Ordering::Release);
                        break;
                    }
                }
            })?;
        Ok(timer)
    }

    fn kill_timer(&mut self, timer: NativeTimer) -> Result<()> {
        if let Some(done) = self.timers.remove(&timer) {
            done.store(true, Ordering::Release);
        }
        Ok(())
    }

    fn set_menu(&mut self, window: NativeHandle, menu: Option<&[MenuItem]>) -> Result<()> {
        self.frame(window)?;
        match menu {
            None => Ok(()),
            Some(_) => Err(Error::Unsupported("menus on a text terminal")),
        }
    }

    fn set_menu_state(
        &mut self,
        _window: NativeHandle,
        _id: i32,
        _enabled: bool,
        _checked: bool,
    ) -> Result<()> {
        Err(Error::Unsupported("menus on a text terminal"))
    }

    fn control_set_enabled(&mut self, _control: NativeHandle, _enabled: bool) -> Result<()> {
        Err(NO_CONTROLS)
    }

    fn control_set_checked(&mut self, _control: NativeHandle, _checked: bool) -> Result<()> {
        Err(NO_CONTROLS)
    }

    fn control_text(&self, _control: NativeHandle) -> Result<String> {
        Err(NO_CONTROLS)
    }

    fn control_set_text(&mut self, _control: NativeHandle, _text: &str) -> Result<()> {
        Err(NO_CONTROLS)
    }

    fn control_set_rect(&mut self, _control: NativeHandle, _rect: Rect) -> Result<()> {
        Err(NO_CONTROLS)
    }

    fn control_set_value(&mut self, _control: NativeHandle, _value: i32) -> Result<()> {
        Err(NO_CONTROLS)
    }

    fn control_raise(&mut self, _control: NativeHandle, _front: bool) -> Result<()> {
        Err(NO_CONTROLS)
    }

    fn flush(&mut self) -> Result<()> {
        self.present()?;
        Ok(())
    }
}

impl Drop for TtyDisplay {
    fn drop(&mut self) {
        for done in self.timers.values() {
            done.store(true, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::mpsc;

    use fwin_render::style::MixMode;

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn take(&self) -> String {
            String::from_utf8(std::mem::take(&mut *self.0.lock().unwrap())).unwrap()
        }
    }

    fn display() -> (TtyDisplay, Sink, mpsc::Receiver<NativeMsg>) {
        let sink = Sink::default();
        let (tx, rx) = mpsc::channel();
        (TtyDisplay::new(Box::new(sink.clone()), tx, None), sink, rx)
    }

    fn style() -> TextStyle {
        TextStyle {
            foreground: PackedRgba::BLACK,
            background: PackedRgba::WHITE,
            attrs: TextAttrs::BOLD,
            font: FontId::TERMINAL,
            metrics: FontMetrics::UNIT,
            foreground_mode: MixMode::Overwrite,
            background_mode: MixMode::Overwrite,
        }
    }

    #[test]
    fn only_one_window() {
        let (mut d, _sink, _rx) = display();
        let w = d.create_window(&WindowSpec::new("t", Size::new(10, 3))).unwrap();
        assert_eq!(w, TERMINAL_WINDOW);
        let again = d.create_window(&WindowSpec::new("u", Size::new(10, 3)));
        assert_eq!(
            again.unwrap_err().kind(),
            fwin_core::error::ErrorKind::Unsupported
        );
        d.destroy_window(w).unwrap();
        assert!(d.surface_size(w).is_err());
    }

    #[test]
    fn flush_writes_only_changed_cells() {
        let (mut d, sink, _rx) = display();
        let w = d.create_window(&WindowSpec::new("t", Size::new(10, 3))).unwrap();
        d.flush().unwrap();
        sink.take();
        d.draw_text(w, Point::new(2, 1), "hey", &style()).unwrap();
        d.flush().unwrap();
        let out = sink.take();
        assert!(out.contains('h') && out.contains('e') && out.contains('y'));
        assert!(out.contains("\x1b[2;3H"), "cursor move to row 2 col 3: {out:?}");
        d.flush().unwrap();
        assert!(!sink.take().contains('h'));
    }

    #[test]
    fn caret_is_shown_where_asked() {
        let (mut d, sink, _rx) = display();
        let w = d.create_window(&WindowSpec::new("t", Size::new(4, 4))).unwrap();
        d.set_caret(w, Some(Rect::new(1, 2, 1, 1))).unwrap();
        d.flush().unwrap();
        assert!(sink.take().ends_with("\x1b[3;2H\x1b[?25h"));
    }

    #[test]
    fn one_character_per_pixel() {
        let (d, _sink, _rx) = display();
        assert_eq!(d.font_metrics(FontId::TERMINAL, 40).unwrap(), FontMetrics::UNIT);
        assert!(d.font_metrics(FontId(2), 0).is_err());
        assert_eq!(d.font_count(), 1);
    }

    #[test]
    fn controls_and_menus_are_unsupported() {
        let (mut d, _sink, _rx) = display();
        let w = d.create_window(&WindowSpec::new("t", Size::new(4, 4))).unwrap();
        assert!(d.control_text(NativeHandle(9)).is_err());
        assert!(d.set_menu(w, Some(&[MenuItem::new(1, "File")])).is_err());
        d.set_menu(w, None).unwrap();
    }

    #[test]
    fn timers_report_through_the_loop_channel() {
        let (mut d, _sink, rx) = display();
        let w = d.create_window(&WindowSpec::new("t", Size::new(4, 4))).unwrap();
        d.set_timer(w, 5, Duration::from_millis(1), false).unwrap();
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            NativeMsg::TimerExpired { param: 5 }
        );
        let t = d.set_timer(w, 6, Duration::from_millis(20), true).unwrap();
        d.kill_timer(t).unwrap();
        assert!(rx.recv_timeout(Duration::from_millis(60)).is_err());
    }
}
