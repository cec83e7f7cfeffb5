#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! Defaults can be overridden with the builder methods or from the
//! environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FWIN_EVENT_QUEUE` | `event_queue_capacity` |
//! | `FWIN_NATIVE_QUEUE` | `native_queue_capacity` |
//! | `FWIN_FRAME_HZ` | `frame_hz` |
//! | `FWIN_PUMP_POLL_MS` | `pump_poll` |
//! | `FWIN_BUFFER_COLS` | `buffer_cols` |
//! | `FWIN_BUFFER_ROWS` | `buffer_rows` |
//! | `FWIN_MAIN_WINDOW` | `main_window` (`0`/`false`/`off` disable) |
//!
//! Unparseable values are ignored with a warning.

use std::env;
use std::time::Duration;

use fwin_render::style::FontMetrics;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Pending semantic events per input stream.
    pub event_queue_capacity: usize,
    /// Pending native notifications between the pump and the application.
    pub native_queue_capacity: usize,
    /// Pending control requests to the display pump.
    pub control_queue_capacity: usize,
    /// Longest single native wait on the display pump.
    pub pump_poll: Duration,
    /// Frame tick rate.
    pub frame_hz: u32,
    /// Default buffer width in characters.
    pub buffer_cols: i32,
    /// Default buffer height in characters.
    pub buffer_rows: i32,
    /// Open window 1 on stdin/stdout at start-up.
    pub main_window: bool,
    /// Cell metrics assumed before the backend reports real ones.
    pub font_metrics: FontMetrics,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: 1000,
            native_queue_capacity: 1000,
            control_queue_capacity: 16,
            pump_poll: Duration::from_millis(10),
            frame_hz: 60,
            buffer_cols: 80,
            buffer_rows: 25,
            main_window: true,
            font_metrics: FontMetrics::default(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overlaid with `FWIN_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay(|key| env::var(key).ok())
    }

    /// Overlay values produced by `lookup` for each known variable name.
    #[must_use]
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
            let raw = raw?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "ignoring unparseable config value");
                    None
                }
            }
        }

        if let Some(v) = parse::<usize>("FWIN_EVENT_QUEUE", lookup("FWIN_EVENT_QUEUE")) {
            self.event_queue_capacity = v;
        }
        if let Some(v) = parse::<usize>("FWIN_NATIVE_QUEUE", lookup("FWIN_NATIVE_QUEUE")) {
            self.native_queue_capacity = v;
        }
        if let Some(v) = parse::<u32>("FWIN_FRAME_HZ", lookup("FWIN_FRAME_HZ")) {
            self.frame_hz = v;
        }
        if let Some(v) = parse::<u64>("FWIN_PUMP_POLL_MS", lookup("FWIN_PUMP_POLL_MS")) {
            self.pump_poll = Duration::from_millis(v);
        }
        if let Some(v) = parse::<i32>("FWIN_BUFFER_COLS", lookup("FWIN_BUFFER_COLS")) {
            self.buffer_cols = v;
        }
        if let Some(v) = parse::<i32>("FWIN_BUFFER_ROWS", lookup("FWIN_BUFFER_ROWS")) {
            self.buffer_rows = v;
        }
        if let Some(raw) = lookup("FWIN_MAIN_WINDOW") {
            self.main_window = !matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "off" | "no"
            );
        }
        self.normalized()
    }

    /// Clamp every knob into a usable range.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.event_queue_capacity = self.event_queue_capacity.max(1);
        self.native_queue_capacity = self.native_queue_capacity.max(1);
        self.control_queue_capacity = self.control_queue_capacity.max(1);
        self.frame_hz = self.frame_hz.clamp(1, 1000);
        self.pump_poll = self.pump_poll.max(Duration::from_millis(1));
        self.buffer_cols = self.buffer_cols.max(1);
        self.buffer_rows = self.buffer_rows.max(1);
        self
    }

    /// Period of the frame timer.
    #[must_use]
    pub fn frame_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frame_hz.max(1)))
    }

    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    pub fn with_native_queue_capacity(mut self, capacity: usize) -> Self {
        self.native_queue_capacity = capacity;
        self
    }

    pub fn with_control_queue_capacity(mut self, capacity: usize) -> Self {
        self.control_queue_capacity = capacity;
        self
    }

    pub fn with_pump_poll(mut self, poll: Duration) -> Self {
        self.pump_poll = poll;
        self
    }

    pub fn with_frame_hz(mut self, hz: u32) -> Self {
        self.frame_hz = hz;
        self
    }

    /// Default buffer size in characters.
    pub fn with_buffer_size(mut self, cols: i32, rows: i32) -> Self {
        self.buffer_cols = cols;
        self.buffer_rows = rows;
        self
    }

    pub fn with_main_window(mut self, enabled: bool) -> Self {
        self.main_window = enabled;
        self
    }

    pub fn with_font_metrics(mut self, metrics: FontMetrics) -> Self {
        self.font_metrics = metrics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let c = RuntimeConfig::default();
        assert_eq!(c.frame_hz, 60);
        assert!(c.main_window);
        assert_eq!((c.buffer_cols, c.buffer_rows), (80, 25));
    }

    #[test]
    fn overlay_reads_known_keys() {
        let c = RuntimeConfig::default().overlay(lookup(&[
            ("FWIN_EVENT_QUEUE", "8"),
            ("FWIN_FRAME_HZ", " 30 "),
            ("FWIN_PUMP_POLL_MS", "5"),
            ("FWIN_BUFFER_COLS", "40"),
            ("FWIN_MAIN_WINDOW", "off"),
        ]));
        assert_eq!(c.event_queue_capacity, 8);
        assert_eq!(c.frame_hz, 30);
        assert_eq!(c.pump_poll, Duration::from_millis(5));
        assert_eq!(c.buffer_cols, 40);
        assert_eq!(c.buffer_rows, 25);
        assert!(!c.main_window);
    }

    #[test]
    fn overlay_ignores_garbage() {
        let c = RuntimeConfig::default().overlay(lookup(&[("FWIN_NATIVE_QUEUE", "lots")]));
        assert_eq!(c.native_queue_capacity, 1000);
    }

    #[test]
    fn normalization_clamps() {
        let c = RuntimeConfig::default()
            .with_event_queue_capacity(0)
            .with_frame_hz(0)
            .with_buffer_size(-3, 0)
            .normalized();
        assert_eq!(c.event_queue_capacity, 1);
        assert_eq!(c.frame_hz, 1);
        assert_eq!((c.buffer_cols, c.buffer_rows), (1, 1));
    }

    #[test]
    fn frame_period_at_sixty() {
        let c = RuntimeConfig::default();
        assert_eq!(c.frame_period(), Duration::from_micros(16_666));
    }
}
