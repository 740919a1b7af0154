use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

const CRATE_TARGET: &str = "logtop_core";

/// A `logtop_core` log line reduced to what tests assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub module: String,
    pub level: Level,
    pub message: String,
}

/// Shared sink of captured log lines.
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl LogCapture {
    /// Install the capture as the global subscriber. Only the first call in
    /// a test binary installs; later calls get the already installed sink.
    pub fn install() -> Self {
        static CAPTURE: std::sync::OnceLock<LogCapture> = std::sync::OnceLock::new();

        CAPTURE
            .get_or_init(|| {
                let capture = LogCapture::default();
                let subscriber = tracing_subscriber::registry().with(capture.clone());
                tracing::subscriber::set_global_default(subscriber)
                    .expect("failed to set global tracing subscriber");
                capture
            })
            .clone()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.lines().iter().any(|l| l.message == message)
    }
}

impl<S> Layer<S> for LogCapture
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if !meta.target().starts_with(CRATE_TARGET) {
            return;
        }

        let mut message = MessageVisitor(String::new());
        event.record(&mut message);

        if let Ok(mut lines) = self.lines.lock() {
            lines.push(LogLine {
                module: meta.target().to_string(),
                level: *meta.level(),
                message: message.0,
            });
        }
    }
}

/// Keeps only the `message` field.
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
