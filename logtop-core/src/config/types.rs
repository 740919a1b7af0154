use crate::aggregation::DEFAULT_CHANNEL_CAPACITY;
use crate::report::OutputFormat;
use crate::tail::{DEFAULT_POLL_INTERVAL, TailOptions};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PERIOD_SECS: u64 = 10;
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogtopConfig {
    /// Access log to follow.
    pub file: Option<PathBuf>,
    pub period_secs: u64,
    pub top_k: usize,
    pub channel_capacity: usize,
    pub poll_interval_ms: u64,
    pub from_end: bool,
    pub output: OutputFormat,
}

impl Default for LogtopConfig {
    fn default() -> Self {
        Self {
            file: None,
            period_secs: DEFAULT_PERIOD_SECS,
            top_k: DEFAULT_TOP_K,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            from_end: false,
            output: OutputFormat::Text,
        }
    }
}

impl LogtopConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    pub fn tail_options(&self) -> TailOptions {
        TailOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            from_end: self.from_end,
        }
    }
}
