//! Reference executor that applies actions to the local filesystem.
use anyhow::{Context as _, Result, bail};
use std::fmt;
use std::path::Path;

use super::fs as gfs;
use super::{ActionOutcome, Executor};
use crate::compiler::command::DECRYPT_FAILURE_EXIT_CODE;
use crate::compiler::{ExecAction, FileAction};
use crate::config::ContentSource;
use crate::ensure::FileEnsure;
use crate::error::ExecError;
use crate::exec::CommandRunner;
use crate::logging::Log;
use crate::paths;
use crate::quote::quote_path;

/// URL scheme accepted for `source` references.
const FILE_SCHEME: &str = "file://";

/// Applies actions to the local host.
///
/// Files are written through a staging file renamed into place, created
/// with the declared mode. Commands run through the [`CommandRunner`], under
/// their declared identity via `runuser` while ownership is managed.
pub struct LocalExecutor<'a> {
    runner: &'a dyn CommandRunner,
    log: &'a dyn Log,
    dry_run: bool,
    manage_ownership: bool,
}

impl fmt::Debug for LocalExecutor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalExecutor")
            .field("runner", &self.runner)
            .field("dry_run", &self.dry_run)
            .field("manage_ownership", &self.manage_ownership)
            .finish_non_exhaustive()
    }
}

impl<'a> LocalExecutor<'a> {
    /// Create an executor that mutates the host and manages ownership.
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner, log: &'a dyn Log) -> Self {
        Self {
            runner,
            log,
            dry_run: false,
            manage_ownership: true,
        }
    }

    /// Report what would change without mutating anything.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable or disable `owner:group` enforcement and the switch to the
    /// command's `user:group`. Both need root; disabled, everything runs as
    /// the applying process.
    #[must_use]
    pub const fn manage_ownership(mut self, manage: bool) -> Self {
        self.manage_ownership = manage;
        self
    }

    const fn outcome(&self, changed: bool) -> ActionOutcome {
        match (changed, self.dry_run) {
            (false, _) => ActionOutcome::Unchanged,
            (true, false) => ActionOutcome::Changed,
            (true, true) => ActionOutcome::DryRun,
        }
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    fn remove_file(&self, action: &FileAction) -> Result<ActionOutcome> {
        let path = &action.path;
        let Ok(meta) = path.symlink_metadata() else {
            return Ok(ActionOutcome::Unchanged);
        };
        if meta.is_dir() {
            bail!("refusing to remove directory {}", path.display());
        }
        if self.dry_run {
            self.log.dry_run(&format!("would remove {}", path.display()));
        } else {
            std::fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
            self.log.debug(&format!("removed {}", path.display()));
        }
        Ok(self.outcome(true))
    }

    fn ensure_file(&self, action: &FileAction) -> Result<ActionOutcome> {
        let path = &action.path;
        if path.is_dir() {
            bail!("{} is a directory", path.display());
        }
        let mode = gfs::parse_mode(&action.mode)?;
        let desired = action
            .content
            .as_ref()
            .map(read_content)
            .transpose()?;

        if !path.exists() {
            let bytes = desired.as_deref().unwrap_or_default();
            if self.dry_run {
                self.log.dry_run(&format!(
                    "would create {} ({} bytes, mode {})",
                    path.display(),
                    bytes.len(),
                    action.mode
                ));
                return Ok(ActionOutcome::DryRun);
            }
            gfs::ensure_parent_dir(path)?;
            self.write(action, bytes, mode)?;
            self.log.debug(&format!("created {}", path.display()));
            self.enforce_ownership(action)?;
            return Ok(ActionOutcome::Changed);
        }

        let mut changed = false;
        if let Some(bytes) = &desired
            && action.replace
            && gfs::file_sha256(path)? != gfs::sha256_hex(bytes)
        {
            if self.dry_run {
                self.log
                    .dry_run(&format!("would replace content of {}", path.display()));
            } else {
                self.backup(action)?;
                self.write(action, bytes, mode)?;
                self.log.debug(&format!("replaced {}", path.display()));
            }
            changed = true;
        }

        if let Some(current) = gfs::current_mode(path)?
            && current != mode
        {
            if self.dry_run {
                self.log.dry_run(&format!(
                    "would change mode of {} from {current:04o} to {}",
                    path.display(),
                    action.mode
                ));
            } else {
                gfs::set_mode(path, mode)?;
            }
            changed = true;
        }

        changed |= self.enforce_ownership(action)?;
        Ok(self.outcome(changed))
    }

    /// Stage `bytes`, validate the staged copy, then move it into place.
    fn write(&self, action: &FileAction, bytes: &[u8], mode: u32) -> Result<()> {
        let staged = gfs::write_staged(&action.path, bytes, mode)?;
        if let Some(cmd) = &action.validate_cmd
            && let Err(e) = self.validate_staged(cmd, &staged)
        {
            std::fs::remove_file(&staged).ok();
            return Err(e);
        }
        gfs::commit_staged(&staged, &action.path)?;
        // Creation mode is subject to the umask.
        gfs::set_mode(&action.path, mode)
    }

    fn validate_staged(&self, cmd: &str, staged: &Path) -> Result<()> {
        let command = cmd.replace('%', &quote_path(staged));
        let result = self.runner.run_unchecked("sh", &["-c", &command])?;
        if result.success {
            return Ok(());
        }
        Err(ExecError::CommandFailed {
            command,
            code: result.code.unwrap_or(-1),
            stderr: result.stderr.trim().to_string(),
        }
        .into())
    }

    fn backup(&self, action: &FileAction) -> Result<()> {
        let Some(suffix) = action.backup.as_deref().filter(|b| b.starts_with('.')) else {
            return Ok(());
        };
        let mut target = action.path.clone().into_os_string();
        target.push(suffix);
        std::fs::copy(&action.path, &target).with_context(|| {
            format!("back up {} to {}", action.path.display(), Path::new(&target).display())
        })?;
        self.log.debug(&format!("backed up {}", action.path.display()));
        Ok(())
    }

    /// Returns `true` when ownership was (or would be) changed.
    fn enforce_ownership(&self, action: &FileAction) -> Result<bool> {
        if !self.manage_ownership {
            return Ok(false);
        }
        let path = action.path.to_string_lossy();
        let wanted = format!("{}:{}", action.owner, action.group);
        let format = format!(
            "{}:{}",
            stat_directive(&action.owner, "%U", "%u"),
            stat_directive(&action.group, "%G", "%g")
        );
        let current = self
            .runner
            .run("stat", &["-c", &format, &path])?
            .stdout
            .trim()
            .to_string();
        if current == wanted {
            return Ok(false);
        }
        if self.dry_run {
            self.log
                .dry_run(&format!("would chown {path} from {current} to {wanted}"));
        } else {
            self.runner.run("chown", &[&wanted, &path])?;
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn guard_holds(&self, action: &ExecAction) -> Result<bool> {
        Ok(self
            .runner
            .run_unchecked("sh", &["-c", &action.unless])?
            .success)
    }
}

impl Executor for LocalExecutor<'_> {
    fn apply_file(&self, action: &FileAction) -> Result<ActionOutcome> {
        let outcome = match action.ensure {
            FileEnsure::Absent => self.remove_file(action),
            FileEnsure::File => self.ensure_file(action),
        };
        outcome.with_context(|| action.id.to_string())
    }

    fn apply_exec(&self, action: &ExecAction, refresh: bool) -> Result<ActionOutcome> {
        if !refresh && self.guard_holds(action)? {
            return Ok(ActionOutcome::Unchanged);
        }
        if self.dry_run {
            self.log.dry_run(&format!("would run {}", action.command));
            return Ok(ActionOutcome::DryRun);
        }

        let (program, args) = invocation(action, self.manage_ownership);
        self.log.debug(&format!("running {program} {}", args.join(" ")));
        let result = self.runner.run_unchecked(program, &args)?;
        if result.success {
            return Ok(ActionOutcome::Changed);
        }
        let code = result.code.unwrap_or(-1);
        let stderr = result.stderr.trim().to_string();
        if code == DECRYPT_FAILURE_EXIT_CODE {
            return Err(ExecError::DecryptFailed {
                encrypted: action.encrypted.clone(),
                code,
                stderr,
            }
            .into());
        }
        Err(ExecError::CommandFailed {
            command: action.command.clone(),
            code,
            stderr,
        }
        .into())
    }
}

/// Program and arguments that run `action.command`, switched to its
/// `user:group` when `switch_identity` is set.
fn invocation(action: &ExecAction, switch_identity: bool) -> (&'static str, Vec<&str>) {
    let shell = ["-c", action.command.as_str()];
    if !switch_identity {
        return ("sh", shell.to_vec());
    }
    let mut args = vec![
        "-u",
        action.user.as_str(),
        "-g",
        action.group.as_str(),
        "--",
        "sh",
    ];
    args.extend(shell);
    ("runuser", args)
}

/// `stat` directive for a declared owner or group. All-digit values are ids
/// and compare against the numeric id, anything else against the name.
fn stat_directive(declared: &str, by_name: &'static str, by_id: &'static str) -> &'static str {
    if !declared.is_empty() && declared.bytes().all(|b| b.is_ascii_digit()) {
        by_id
    } else {
        by_name
    }
}

/// Load the encrypted bytes an action should write.
fn read_content(content: &ContentSource) -> Result<Vec<u8>> {
    match content {
        ContentSource::Inline(text) => Ok(text.clone().into_bytes()),
        ContentSource::Source(reference) => {
            let local = reference.strip_prefix(FILE_SCHEME).unwrap_or(reference);
            if !paths::is_fully_qualified(local) {
                return Err(ExecError::UnsupportedSource {
                    source_ref: reference.clone(),
                }
                .into());
            }
            std::fs::read(local).with_context(|| format!("read source {local}"))
        }
    }
}
