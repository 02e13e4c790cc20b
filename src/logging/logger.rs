//! Structured logger with dry-run awareness and summary collection.
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{ActionEntry, ActionStatus, Log};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that emits [`tracing`] events and collects per-action
/// results for the end-of-run summary.
#[derive(Debug, Default)]
pub struct Logger {
    actions: Mutex<Vec<ActionEntry>>,
}

impl Logger {
    /// Create a new logger with an empty summary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Return a clone of all recorded action entries.
    #[must_use]
    pub fn action_entries(&self) -> Vec<ActionEntry> {
        self.actions.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record an action result for the summary.
    pub fn record_action(&self, id: &str, status: ActionStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.actions.lock() {
            guard.push(ActionEntry {
                id: id.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed actions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.actions.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|a| a.status == ActionStatus::Failed)
                .count()
        })
    }

    /// Log the summary of all recorded actions.
    pub fn print_summary(&self) {
        let actions = match self.actions.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if actions.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut changed = 0u32;
        let mut unchanged = 0u32;
        let mut dry_run = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for action in &actions {
            let (icon, color) = match action.status {
                ActionStatus::Changed => {
                    changed += 1;
                    ("✓", "\x1b[32m")
                }
                ActionStatus::Unchanged | ActionStatus::Noop => {
                    unchanged += 1;
                    ("·", "\x1b[2m")
                }
                ActionStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                ActionStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                ActionStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = action
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", action.id));
        }

        let total = changed + unchanged + dry_run + skipped + failed;
        self.info(&format!(
            "{total} actions: \x1b[32m{changed} changed\x1b[0m, \x1b[2m{unchanged} unchanged\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_action(&self, id: &str, status: ActionStatus, message: Option<&str>) {
        self.record_action(id, status, message);
    }
}
