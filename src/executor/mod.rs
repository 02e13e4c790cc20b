//! Executors: apply compiled actions to a host.
pub mod fs;
pub mod local;

pub use local::LocalExecutor;

use anyhow::Result;

use crate::compiler::{ExecAction, FileAction};

/// Result of applying one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The host was changed.
    Changed,
    /// The host already matched.
    Unchanged,
    /// Dry run: the host would have been changed.
    DryRun,
}

/// Applies compiled actions.
///
/// Implementations decide how a file or command is realised; ordering,
/// refresh and failure propagation are handled by
/// [`apply_set`](crate::apply::apply_set).
#[cfg_attr(test, mockall::automock)]
pub trait Executor {
    /// Bring one file in line with `action`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be inspected or changed.
    fn apply_file(&self, action: &FileAction) -> Result<ActionOutcome>;

    /// Run `action` if it is refreshed or its `unless` guard fails.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`](crate::error::ExecError) (inside
    /// [`anyhow::Error`]) when the command exits non-zero.
    fn apply_exec(&self, action: &ExecAction, refresh: bool) -> Result<ActionOutcome>;
}
