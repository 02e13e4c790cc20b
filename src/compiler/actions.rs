//! Compiled action types.
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

use crate::config::ContentSource;
use crate::ensure::FileEnsure;

/// Stable identifier of a compiled action.
///
/// Renders as `File[<path>]` or `Exec[gpgfile-<plaintext path>]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionId {
    /// A managed file.
    File(PathBuf),
    /// The decrypt command of the declaration whose plaintext is at the path.
    Exec(PathBuf),
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "File[{}]", path.display()),
            Self::Exec(path) => write!(f, "Exec[gpgfile-{}]", path.display()),
        }
    }
}

impl Serialize for ActionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// SELinux context components forwarded to the plaintext file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelinuxContext {
    /// Ignore the policy's default context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_defaults: Option<bool>,
    /// Range component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selrange: Option<String>,
    /// Role component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selrole: Option<String>,
    /// Type component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seltype: Option<String>,
    /// User component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seluser: Option<String>,
}

impl SelinuxContext {
    /// Return `true` when no component is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Desired state of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAction {
    /// `File[<path>]`.
    pub id: ActionId,
    /// The managed path.
    pub path: PathBuf,
    /// Whether the file must exist.
    pub ensure: FileEnsure,
    /// Bytes to write; `None` for the plaintext file, which only the
    /// decrypt command fills.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentSource>,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Octal permission string.
    pub mode: String,
    /// Backup behaviour; `None` leaves it to the executor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    /// Whether existing content may be replaced.
    pub replace: bool,
    /// Command run against staged content before it is written (`%` is the path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_cmd: Option<String>,
    /// SELinux context.
    #[serde(skip_serializing_if = "SelinuxContext::is_empty")]
    pub selinux: SelinuxContext,
    /// Whether content diffs may be shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_diff: Option<bool>,
}

/// The decrypt command and the conditions under which it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecAction {
    /// `Exec[gpgfile-<plaintext path>]`.
    pub id: ActionId,
    /// Shell command, recovery clause included.
    pub command: String,
    /// Guard: the command is skipped while this succeeds, unless refreshed.
    pub unless: String,
    /// `true` when the command must never run (ensure is not `decrypted`).
    pub noop: bool,
    /// Identity the command runs as: `user` when declared, else the owner.
    pub user: String,
    /// Group the command runs as.
    pub group: String,
    /// Actions that must have succeeded first.
    pub requires: Vec<ActionId>,
    /// Actions whose change triggers this command.
    pub subscribe: Vec<ActionId>,
    /// The encrypted blob the recovery clause deletes.
    pub encrypted: PathBuf,
}

/// One compiled step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Manage a file.
    File(FileAction),
    /// Run a command.
    Exec(ExecAction),
}

impl Action {
    /// Identifier of the wrapped action.
    #[must_use]
    pub const fn id(&self) -> &ActionId {
        match self {
            Self::File(file) => &file.id,
            Self::Exec(exec) => &exec.id,
        }
    }

    /// Actions this one depends on.
    #[must_use]
    pub fn requires(&self) -> &[ActionId] {
        match self {
            Self::File(_) => &[],
            Self::Exec(exec) => &exec.requires,
        }
    }
}

/// Ordered output of compiling one declaration: encrypted file, plaintext
/// file (when managed), then the decrypt command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledActionSet {
    /// The declared plaintext path.
    pub path: PathBuf,
    /// Actions in execution order.
    pub actions: Vec<Action>,
}

impl CompiledActionSet {
    /// The encrypted-blob file action.
    #[must_use]
    pub fn encrypted_file(&self) -> Option<&FileAction> {
        self.files().next()
    }

    /// The plaintext file action, absent when ensure is `encrypted`.
    #[must_use]
    pub fn plaintext_file(&self) -> Option<&FileAction> {
        self.files().nth(1)
    }

    /// The decrypt action.
    #[must_use]
    pub fn decrypt(&self) -> Option<&ExecAction> {
        self.actions.iter().find_map(|a| match a {
            Action::Exec(exec) => Some(exec),
            Action::File(_) => None,
        })
    }

    /// Identifiers in execution order.
    #[must_use]
    pub fn ordering(&self) -> Vec<&ActionId> {
        self.actions.iter().map(Action::id).collect()
    }

    fn files(&self) -> impl Iterator<Item = &FileAction> {
        self.actions.iter().filter_map(|a| match a {
            Action::File(file) => Some(file),
            Action::Exec(_) => None,
        })
    }
}

impl fmt::Display for CompiledActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            match action {
                Action::File(file) => write_file(f, file)?,
                Action::Exec(exec) => write_exec(f, exec)?,
            }
        }
        Ok(())
    }
}

fn write_file(f: &mut fmt::Formatter<'_>, file: &FileAction) -> fmt::Result {
    writeln!(f, "{}", file.id)?;
    writeln!(f, "  ensure: {}", file.ensure)?;
    match &file.content {
        Some(ContentSource::Inline(content)) => {
            writeln!(f, "  content: <{} bytes>", content.len())?;
        }
        Some(ContentSource::Source(source)) => writeln!(f, "  source: {source}")?,
        None => {}
    }
    writeln!(f, "  owner: {}", file.owner)?;
    writeln!(f, "  group: {}", file.group)?;
    writeln!(f, "  mode: {}", file.mode)?;
    writeln!(f, "  replace: {}", file.replace)?;
    if let Some(backup) = &file.backup {
        writeln!(f, "  backup: {backup}")?;
    }
    if let Some(cmd) = &file.validate_cmd {
        writeln!(f, "  validate_cmd: {cmd}")?;
    }
    let sel = &file.selinux;
    if let Some(v) = sel.ignore_defaults {
        writeln!(f, "  selinux_ignore_defaults: {v}")?;
    }
    for (key, value) in [
        ("selrange", &sel.selrange),
        ("selrole", &sel.selrole),
        ("seltype", &sel.seltype),
        ("seluser", &sel.seluser),
    ] {
        if let Some(value) = value {
            writeln!(f, "  {key}: {value}")?;
        }
    }
    if let Some(v) = file.show_diff {
        writeln!(f, "  show_diff: {v}")?;
    }
    Ok(())
}

fn write_exec(f: &mut fmt::Formatter<'_>, exec: &ExecAction) -> fmt::Result {
    writeln!(f, "{}", exec.id)?;
    writeln!(f, "  command: {}", exec.command)?;
    writeln!(f, "  unless: {}", exec.unless)?;
    writeln!(f, "  noop: {}", exec.noop)?;
    writeln!(f, "  user: {}", exec.user)?;
    writeln!(f, "  group: {}", exec.group)?;
    writeln!(f, "  requires: {}", join_ids(&exec.requires))?;
    writeln!(f, "  subscribe: {}", join_ids(&exec.subscribe))
}

fn join_ids(ids: &[ActionId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_render_with_kind_prefix() {
        assert_eq!(
            ActionId::File(PathBuf::from("/tmp/data.gpg")).to_string(),
            "File[/tmp/data.gpg]"
        );
        assert_eq!(
            ActionId::Exec(PathBuf::from("/tmp/data")).to_string(),
            "Exec[gpgfile-/tmp/data]"
        );
    }

    #[test]
    fn ids_serialize_as_strings() {
        let json = serde_json::to_string(&ActionId::Exec(PathBuf::from("/tmp/foo's"))).unwrap();
        assert_eq!(json, r#""Exec[gpgfile-/tmp/foo's]""#);
    }

    #[test]
    fn empty_selinux_context_is_detected() {
        assert!(SelinuxContext::default().is_empty());
        let ctx = SelinuxContext {
            seltype: Some("etc_t".to_string()),
            ..SelinuxContext::default()
        };
        assert!(!ctx.is_empty());
    }
}
