#![forbid(unsafe_code)]

//! The demo's event loop.

use std::time::Duration;

use fwin::prelude::*;
use fwin::TextAttrs;

const OUT: FileHandle = FileHandle::STDOUT;
const IN: FileHandle = FileHandle::STDIN;

/// Timer slot driving the status line.
const TICK: u8 = 1;

/// What happened during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub typed: usize,
    pub marks: usize,
    pub ticks: u32,
}

/// Draw the banner, then echo input until the user quits.
pub fn run(ctx: &Context, tick: Duration) -> Result<Summary> {
    ctx.clear(OUT)?;
    ctx.set_attr(OUT, TextAttrs::BOLD, true)?;
    ctx.write_str(OUT, "fwin demo: type, click to mark, Esc quits\n")?;
    ctx.set_attr(OUT, TextAttrs::BOLD, false)?;
    ctx.set_timer(OUT, TICK, tick, true)?;

    let mut summary = Summary::default();
    let mut pointer = Point::new(1, 1);
    loop {
        let event = ctx.next_event(IN)?;
        match event.kind {
            EventKind::Terminate | EventKind::Cancel => break,
            EventKind::Char(c) => {
                ctx.write_str(OUT, c.encode_utf8(&mut [0; 4]))?;
                summary.typed += 1;
            }
            EventKind::Enter => ctx.write_str(OUT, "\n")?,
            EventKind::Tab => ctx.write_str(OUT, "\t")?,
            EventKind::DeleteCharBackward => {
                ctx.left(OUT)?;
                ctx.write_str(OUT, " ")?;
                ctx.left(OUT)?;
            }
            EventKind::Up => ctx.up(OUT)?,
            EventKind::Down => ctx.down(OUT)?,
            EventKind::Left => ctx.left(OUT)?,
            EventKind::Right => ctx.right(OUT)?,
            EventKind::MouseMove { x, y, .. } => pointer = Point::new(x, y),
            EventKind::MouseAssert { button: 1, .. } => {
                put_at(ctx, pointer, "*")?;
                summary.marks += 1;
            }
            EventKind::Timer(TICK) => {
                summary.ticks += 1;
                let row = ctx.maxy(OUT)?;
                put_at(ctx, Point::new(1, row), &format!("ticks {:<8}", summary.ticks))?;
            }
            EventKind::Resize { cols, rows, .. } => {
                tracing::debug!(cols, rows, "terminal resized");
            }
            other => tracing::trace!(?other, "ignored"),
        }
    }
    ctx.kill_timer(OUT, TICK)?;
    tracing::info!(?summary, "demo finished");
    Ok(summary)
}

/// Write `text` at `at` without disturbing the text cursor.
fn put_at(ctx: &Context, at: Point, text: &str) -> Result<()> {
    let saved = ctx.cursor(OUT)?;
    let auto = ctx.auto(OUT)?;
    ctx.set_auto(OUT, false)?;
    ctx.set_cursor(OUT, at.x, at.y)?;
    ctx.write_str(OUT, text)?;
    ctx.set_cursor(OUT, saved.x, saved.y)?;
    ctx.set_auto(OUT, auto)
}
