#![forbid(unsafe_code)]

//! fwin demo binary entry point.

mod app;
mod cli;

use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;

use fwin::{Context, RuntimeConfig, SessionOptions, TtyBackend, or_abort};
use tracing_subscriber::EnvFilter;

/// Route tracing to `path`. The terminal itself is the application's
/// screen, so without a log file nothing is recorded.
fn init_logging(path: Option<&str>) -> std::io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() {
    let opts = cli::Opts::parse();
    or_abort(init_logging(opts.log.as_deref()));

    let backend = or_abort(TtyBackend::open(SessionOptions {
        mouse_capture: opts.mouse,
        ..SessionOptions::default()
    }));
    let (cols, rows) = backend.terminal_size();
    let config = RuntimeConfig::from_env().with_buffer_size(cols, rows);
    let ctx = or_abort(Context::new(backend, config));

    let result = app::run(&ctx, Duration::from_millis(opts.tick_ms.max(1)));
    // The terminal must be restored before anything is printed.
    drop(ctx);
    let summary = or_abort(result);
    println!(
        "typed {} characters, dropped {} marks, {} ticks",
        summary.typed, summary.marks, summary.ticks
    );
}
