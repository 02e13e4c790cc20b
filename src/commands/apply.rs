//! Command: apply a manifest to this host.
use anyhow::Result;

use super::CommandSetup;
use crate::apply::apply_all;
use crate::cli::{ApplyOpts, GlobalOpts};
use crate::compiler::CompiledActionSet;
use crate::compiler::command::GPG_PROGRAM;
use crate::exec::{CommandRunner, SystemRunner};
use crate::executor::LocalExecutor;
use crate::logging::{Log, Logger};

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the manifest does not compile or any action failed.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Logger) -> Result<()> {
    let version = super::version::version_string();
    log.info(&version);

    let setup = CommandSetup::init(global, &opts.manifest, log)?;
    if opts.dry_run {
        log.info("dry run: no changes will be made");
    }
    apply_sets(&setup.sets, &SystemRunner, opts, log)
}

/// Apply compiled sets with the local executor, then print the summary.
///
/// # Errors
///
/// Returns an error if one or more actions failed.
pub fn apply_sets(
    sets: &[CompiledActionSet],
    runner: &dyn CommandRunner,
    opts: &ApplyOpts,
    log: &Logger,
) -> Result<()> {
    preflight(sets, runner, log);

    let executor = LocalExecutor::new(runner, log)
        .dry_run(opts.dry_run)
        .manage_ownership(opts.chown);
    apply_all(sets, &executor, log);

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} action(s) failed");
    }
    Ok(())
}

/// Warn when a decrypt command will run but `gpg` is not on `PATH`.
fn preflight(sets: &[CompiledActionSet], runner: &dyn CommandRunner, log: &dyn Log) {
    let decrypts = sets
        .iter()
        .filter_map(CompiledActionSet::decrypt)
        .any(|exec| !exec.noop);
    if decrypts && !runner.which(GPG_PROGRAM) {
        log.warn(&format!(
            "{GPG_PROGRAM} not found on PATH; decrypt commands will fail"
        ));
    }
}
