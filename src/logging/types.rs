//! Core logging types: action entries, status, and the [`Log`] trait.
use std::fmt;

/// Action result for summary reporting.
#[derive(Debug, Clone)]
pub struct ActionEntry {
    /// Action identifier, e.g. `File[/tmp/data.gpg]`.
    pub id: String,
    /// Final status of the action.
    pub status: ActionStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of an applied action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// The host was changed to match the action.
    Changed,
    /// The host already matched the action.
    Unchanged,
    /// The action is compiled as a no-op and was not run.
    Noop,
    /// Dry run: the action would have changed the host.
    DryRun,
    /// A dependency failed, so the action was not attempted.
    Skipped,
    /// The action was attempted and failed.
    Failed,
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
            Self::Noop => "noop",
            Self::DryRun => "dry-run",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Abstraction over logging backends.
///
/// The apply driver and executors log through this trait so tests can
/// substitute a recording implementation.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record an action result for the summary.
    fn record_action(&self, id: &str, status: ActionStatus, message: Option<&str>);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn action_status_equality() {
        assert_eq!(ActionStatus::Changed, ActionStatus::Changed);
        assert_ne!(ActionStatus::Changed, ActionStatus::Unchanged);
        assert_ne!(ActionStatus::Skipped, ActionStatus::Failed);
    }

    #[test]
    fn action_status_display() {
        assert_eq!(ActionStatus::DryRun.to_string(), "dry-run");
        assert_eq!(ActionStatus::Noop.to_string(), "noop");
    }
}
