//! Logging infrastructure for structured console output.

mod logger;
mod subscriber;
mod types;

pub use logger::Logger;
pub use subscriber::{DRY_RUN_TARGET, STAGE_TARGET, init_subscriber};
pub use types::{ActionEntry, ActionStatus, Log};

/// Captured log lines shared with a test.
#[cfg(test)]
pub(crate) type CapturedLines = std::sync::Arc<std::sync::Mutex<Vec<String>>>;

/// Create a Logger backed by an isolated per-thread tracing subscriber that
/// captures every event as a tagged line.
///
/// Returns a [`tracing::dispatcher::DefaultGuard`] that must be kept alive
/// for the duration of the test; dropping it restores the previous
/// thread-local dispatcher.
#[cfg(test)]
pub(crate) fn isolated_logger() -> (Logger, CapturedLines, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let capture = subscriber::CaptureLayer::default();
    let lines = std::sync::Arc::clone(&capture.lines);
    let subscriber = tracing_subscriber::registry().with(capture.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (Logger::new(), lines, guard)
}
