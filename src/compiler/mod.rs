//! Declarative-to-imperative compilation.
//!
//! [`compile`] turns one [`EncryptedFileSpec`] into a [`CompiledActionSet`]:
//! the encrypted-blob file, the plaintext file (unless ensure is
//! `encrypted`) and the decrypt command, in that order, with dependency and
//! refresh edges between them. Compilation is pure: the same declaration and
//! options always yield an identical set.
pub mod actions;
pub mod command;

pub use actions::{Action, ActionId, CompiledActionSet, ExecAction, FileAction, SelinuxContext};

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;

use crate::config::validation::{validate, validate_defaults};
use crate::config::{Capabilities, Defaults, EncryptedFileSpec, Manifest};
use crate::ensure::FileEnsure;
use crate::error::{CompileError, ConfigError};
use crate::paths::ResolvedPaths;

/// Inputs shared by every declaration compiled together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOpts {
    /// Values used for omitted fields.
    pub defaults: Defaults,
    /// Host capabilities.
    pub capabilities: Capabilities,
}

impl CompileOpts {
    /// Options taken from a manifest's `[defaults]` and `[capabilities]`.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            defaults: manifest.defaults.clone(),
            capabilities: manifest.capabilities,
        }
    }
}

/// Compile one declaration.
///
/// # Errors
///
/// Returns [`CompileError::Invalid`] when validation fails and
/// [`CompileError::PathCollision`] when the derived encrypted path equals the
/// plaintext path.
pub fn compile(
    spec: &EncryptedFileSpec,
    opts: &CompileOpts,
) -> Result<CompiledActionSet, CompileError> {
    let validated = validate(spec, &opts.defaults, opts.capabilities)?;
    let paths = ResolvedPaths::resolve(spec, &opts.defaults);
    if paths.collide() {
        return Err(CompileError::PathCollision {
            path: paths.plaintext,
        });
    }

    let defaults = &opts.defaults;
    let plan = validated.ensure.plan();
    let owner = spec.owner.as_ref().unwrap_or(&defaults.owner);
    let group = spec.group.as_ref().unwrap_or(&defaults.group);
    let backup = spec.backup.as_ref().or(defaults.backup.as_ref());
    let keyring = spec.keyring.as_ref().unwrap_or(&defaults.keyring);

    let encrypted_id = ActionId::File(paths.encrypted.clone());
    let mut actions = vec![Action::File(FileAction {
        id: encrypted_id.clone(),
        path: paths.encrypted.clone(),
        ensure: plan.encrypted_file,
        content: (plan.encrypted_file == FileEnsure::File).then_some(validated.content),
        owner: owner.clone(),
        group: group.clone(),
        mode: spec
            .encrypted_mode
            .clone()
            .unwrap_or_else(|| defaults.encrypted_mode.clone()),
        backup: backup.cloned(),
        replace: spec.replace.unwrap_or(defaults.replace),
        validate_cmd: None,
        selinux: SelinuxContext::default(),
        show_diff: None,
    })];

    let mut requires = vec![encrypted_id.clone()];
    if let Some(ensure) = plan.plaintext_file {
        let plaintext_id = ActionId::File(paths.plaintext.clone());
        requires.push(plaintext_id.clone());
        actions.push(Action::File(FileAction {
            id: plaintext_id,
            path: paths.plaintext.clone(),
            ensure,
            content: None,
            owner: owner.clone(),
            group: group.clone(),
            mode: spec.mode.clone().unwrap_or_else(|| defaults.mode.clone()),
            backup: backup.cloned(),
            // Plaintext is only ever (re)written by the decrypt command.
            replace: spec.replace.unwrap_or(false),
            validate_cmd: spec.validate_cmd.clone(),
            selinux: SelinuxContext {
                ignore_defaults: spec.selinux_ignore_defaults,
                selrange: spec.selrange.clone(),
                selrole: spec.selrole.clone(),
                seltype: spec.seltype.clone(),
                seluser: spec.seluser.clone(),
            },
            show_diff: spec.show_diff,
        }));
    }

    actions.push(Action::Exec(ExecAction {
        id: ActionId::Exec(paths.plaintext.clone()),
        command: command::decrypt_command(keyring, &paths.plaintext, &paths.encrypted),
        unless: command::plaintext_guard(&paths.plaintext),
        noop: !plan.run_decrypt,
        user: spec.user.clone().unwrap_or_else(|| owner.clone()),
        group: group.clone(),
        requires,
        subscribe: vec![encrypted_id],
        encrypted: paths.encrypted,
    }));

    Ok(CompiledActionSet {
        path: paths.plaintext,
        actions,
    })
}

/// Compile every declaration of a manifest, in manifest order.
///
/// Declarations are compiled in parallel; the first failing declaration in
/// manifest order is reported.
///
/// # Errors
///
/// Returns [`ConfigError::Defaults`] when the `[defaults]` table breaks the
/// mode or ensure policy, [`ConfigError::Declaration`] for the first
/// declaration that fails to compile, and [`ConfigError::DuplicatePath`] when
/// two declarations manage the same file.
pub fn compile_manifest(manifest: &Manifest) -> Result<Vec<CompiledActionSet>, ConfigError> {
    validate_defaults(&manifest.defaults).map_err(|source| ConfigError::Defaults { source })?;

    let opts = CompileOpts::from_manifest(manifest);
    let results: Vec<_> = manifest
        .files
        .par_iter()
        .map(|spec| compile(spec, &opts))
        .collect();

    let mut sets = Vec::with_capacity(results.len());
    for (index, (result, spec)) in results.into_iter().zip(&manifest.files).enumerate() {
        sets.push(result.map_err(|source| ConfigError::Declaration {
            index,
            path: spec.path.clone(),
            source,
        })?);
    }

    check_unique_paths(&sets)?;
    Ok(sets)
}

/// Reject two file actions, in any sets, that manage the same path.
fn check_unique_paths(sets: &[CompiledActionSet]) -> Result<(), ConfigError> {
    let mut seen: HashSet<&Path> = HashSet::new();
    for set in sets {
        for action in &set.actions {
            if let Action::File(file) = action
                && !seen.insert(&file.path)
            {
                return Err(ConfigError::DuplicatePath {
                    path: file.path.clone(),
                });
            }
        }
    }
    Ok(())
}
