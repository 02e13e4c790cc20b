//! Ordered application of compiled action sets.
//!
//! Actions run in the order they were compiled. An action whose dependency
//! failed (or was itself skipped) is not attempted and is reported as
//! [`ActionStatus::Skipped`] naming that dependency. A command runs as
//! refreshed when any action it subscribes to changed the host.
use std::collections::HashMap;

use crate::compiler::{Action, ActionId, CompiledActionSet};
use crate::executor::{ActionOutcome, Executor};
use crate::logging::{ActionStatus, Log};

/// Result of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    /// The action.
    pub id: ActionId,
    /// What happened.
    pub status: ActionStatus,
    /// Error text or skip reason.
    pub message: Option<String>,
}

/// Apply one compiled set and return a report per action, in order.
///
/// Every result is also recorded on `log` for the run summary.
pub fn apply_set(
    set: &CompiledActionSet,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Vec<ActionReport> {
    let mut statuses = HashMap::<&ActionId, ActionStatus>::new();
    let mut reports = Vec::with_capacity(set.actions.len());

    for action in &set.actions {
        let id = action.id();
        let blocked = action.requires().iter().find(|dep| {
            matches!(
                statuses.get(dep),
                Some(ActionStatus::Failed | ActionStatus::Skipped)
            )
        });

        let (status, message) = blocked.map_or_else(
            || run_action(action, executor, &statuses),
            |dep| (ActionStatus::Skipped, Some(format!("dependency {dep} failed"))),
        );

        match status {
            ActionStatus::Failed => log.error(&format!(
                "{id}: {}",
                message.as_deref().unwrap_or_default()
            )),
            ActionStatus::Skipped => log.warn(&format!(
                "{id} skipped: {}",
                message.as_deref().unwrap_or_default()
            )),
            ActionStatus::Changed => log.info(&format!("{id} changed")),
            _ => log.debug(&format!("{id} {status}")),
        }
        log.record_action(&id.to_string(), status, message.as_deref());

        statuses.insert(id, status);
        reports.push(ActionReport {
            id: id.clone(),
            status,
            message,
        });
    }
    reports
}

/// Apply every set in order.
pub fn apply_all(
    sets: &[CompiledActionSet],
    executor: &dyn Executor,
    log: &dyn Log,
) -> Vec<ActionReport> {
    let mut reports = Vec::new();
    for set in sets {
        log.stage(&format!("gpgfile {}", set.path.display()));
        reports.extend(apply_set(set, executor, log));
    }
    reports
}

fn run_action(
    action: &Action,
    executor: &dyn Executor,
    statuses: &HashMap<&ActionId, ActionStatus>,
) -> (ActionStatus, Option<String>) {
    let result = match action {
        Action::File(file) => executor.apply_file(file),
        Action::Exec(exec) if exec.noop => return (ActionStatus::Noop, None),
        Action::Exec(exec) => {
            let refresh = exec.subscribe.iter().any(|id| {
                matches!(
                    statuses.get(id),
                    Some(ActionStatus::Changed | ActionStatus::DryRun)
                )
            });
            executor.apply_exec(exec, refresh)
        }
    };
    match result {
        Ok(ActionOutcome::Changed) => (ActionStatus::Changed, None),
        Ok(ActionOutcome::Unchanged) => (ActionStatus::Unchanged, None),
        Ok(ActionOutcome::DryRun) => (ActionStatus::DryRun, None),
        Err(e) => (ActionStatus::Failed, Some(format!("{e:#}"))),
    }
}
