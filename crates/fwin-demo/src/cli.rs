#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean. Environment variables with
//! the `FWIN_DEMO_*` prefix set defaults that flags override.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
fwin demo: a terminal window driven through the fwin runtime

USAGE:
    fwin-demo [OPTIONS]

OPTIONS:
    --tick-ms=N          Status line refresh period in milliseconds (default: 1000)
    --log=PATH           Write tracing output to PATH (filter with RUST_LOG)
    --no-mouse           Disable mouse capture
    --help, -h           Show this help message
    --version, -V        Show version

KEYS:
    typing          Echo at the cursor
    arrows          Move the cursor
    left click      Drop a mark
    Esc / Ctrl+C    Quit

ENVIRONMENT VARIABLES:
    FWIN_DEMO_TICK_MS    Override --tick-ms
    FWIN_DEMO_LOG        Override --log";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub tick_ms: u64,
    pub log: Option<String>,
    pub mouse: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            log: None,
            mouse: true,
        }
    }
}

impl Opts {
    /// Parse the process environment and arguments.
    pub fn parse() -> Self {
        let mut opts = Self::default();
        if let Ok(val) = env::var("FWIN_DEMO_TICK_MS")
            && let Ok(n) = val.parse()
        {
            opts.tick_ms = n;
        }
        if let Ok(val) = env::var("FWIN_DEMO_LOG") {
            opts.log = Some(val);
        }
        match opts.apply_args(env::args().skip(1)) {
            Ok(Some(message)) => {
                println!("{message}");
                process::exit(0);
            }
            Ok(None) => opts,
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Apply flags. `Ok(Some(text))` means print `text` and stop.
    fn apply_args(
        &mut self,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Option<String>, String> {
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Some(HELP_TEXT.to_owned())),
                "--version" | "-V" => return Ok(Some(format!("fwin-demo {VERSION}"))),
                "--no-mouse" => self.mouse = false,
                other => {
                    if let Some(val) = other.strip_prefix("--tick-ms=") {
                        self.tick_ms = val
                            .parse()
                            .map_err(|_| format!("Invalid --tick-ms value: {val}"))?;
                    } else if let Some(val) = other.strip_prefix("--log=") {
                        self.log = Some(val.to_owned());
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }
        Ok(None)
    }
}
