pub mod apply;
pub mod compile;
pub mod validate;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, ManifestArg};
use crate::compiler::{self, CompiledActionSet};
use crate::config::Manifest;
use crate::logging::Logger;

/// Environment variable naming the manifest when none is given.
pub const MANIFEST_ENV: &str = "GPGFILE_MANIFEST";

/// Manifest used when neither the argument nor the environment names one.
pub const DEFAULT_MANIFEST: &str = "gpgfile.toml";

/// Shared state produced by the common command setup sequence.
///
/// Loads the manifest, applies CLI capability overrides and compiles every
/// declaration so each command does not repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// The manifest that was loaded.
    pub path: PathBuf,
    /// The manifest, with CLI capability overrides applied.
    pub manifest: Manifest,
    /// One compiled set per declaration, in manifest order.
    pub sets: Vec<CompiledActionSet>,
}

impl CommandSetup {
    /// Resolve, load and compile the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or parsed, or if any
    /// declaration fails to compile.
    pub fn init(global: &GlobalOpts, arg: &ManifestArg, log: &Logger) -> Result<Self> {
        let path = resolve_manifest(arg.manifest.as_deref(), std::env::var(MANIFEST_ENV).ok());
        Self::load(global, path, log)
    }

    /// Load and compile the manifest at `path`.
    ///
    /// # Errors
    ///
    /// See [`CommandSetup::init`].
    pub fn load(global: &GlobalOpts, path: PathBuf, log: &Logger) -> Result<Self> {
        log.debug(&format!("manifest: {}", path.display()));
        let mut manifest = Manifest::load(&path)?;
        if global.allow_decrypt_as_user {
            manifest.capabilities.decrypt_as_user = true;
        }
        log.debug(&format!("{} declaration(s)", manifest.files.len()));

        let sets = compiler::compile_manifest(&manifest)
            .with_context(|| format!("compiling {}", path.display()))?;
        log.debug(&format!(
            "{} action(s) compiled",
            sets.iter().map(|s| s.actions.len()).sum::<usize>()
        ));

        Ok(Self {
            path,
            manifest,
            sets,
        })
    }
}

/// Pick the manifest path: explicit argument, then `$GPGFILE_MANIFEST`, then
/// [`DEFAULT_MANIFEST`] in the working directory.
#[must_use]
pub fn resolve_manifest(explicit: Option<&Path>, env: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    env.filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_MANIFEST), PathBuf::from)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::test_helpers::write_temp_toml;
    use crate::error::{CompileError, ConfigError, ValidationError};

    const USER_MANIFEST: &str = r#"
[[gpgfile]]
path = "/tmp/data"
content = "cipher"
user = "app"
"#;

    // -----------------------------------------------------------------------
    // resolve_manifest
    // -----------------------------------------------------------------------

    #[test]
    fn explicit_manifest_wins() {
        let path = resolve_manifest(Some(Path::new("/etc/a.toml")), Some("/etc/b.toml".into()));
        assert_eq!(path, PathBuf::from("/etc/a.toml"));
    }

    #[test]
    fn env_manifest_is_used_without_argument() {
        let path = resolve_manifest(None, Some("/etc/b.toml".into()));
        assert_eq!(path, PathBuf::from("/etc/b.toml"));
    }

    #[test]
    fn default_manifest_is_last_resort() {
        assert_eq!(resolve_manifest(None, None), PathBuf::from(DEFAULT_MANIFEST));
        assert_eq!(
            resolve_manifest(None, Some(String::new())),
            PathBuf::from(DEFAULT_MANIFEST)
        );
    }

    // -----------------------------------------------------------------------
    // CommandSetup
    // -----------------------------------------------------------------------

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandSetup::load(
            &GlobalOpts::default(),
            dir.path().join("missing.toml"),
            &Logger::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn user_requires_capability() {
        let (_dir, path) = write_temp_toml(USER_MANIFEST);
        let err = CommandSetup::load(&GlobalOpts::default(), path, &Logger::new()).unwrap_err();
        let config = err.downcast_ref::<ConfigError>().expect("config error");
        assert!(
            matches!(
                config,
                ConfigError::Declaration { index: 0, source, .. }
                    if *source == CompileError::Invalid(ValidationError::UserRequiresCapability {
                        user: "app".to_string(),
                    })
            ),
            "got {config}"
        );
    }

    #[test]
    fn cli_flag_grants_capability() {
        let (_dir, path) = write_temp_toml(USER_MANIFEST);
        let global = GlobalOpts {
            allow_decrypt_as_user: true,
        };
        let setup = CommandSetup::load(&global, path, &Logger::new()).unwrap();
        assert!(setup.manifest.capabilities.decrypt_as_user);
        assert_eq!(setup.sets.len(), 1);
        assert_eq!(setup.sets[0].decrypt().unwrap().user, "app");
    }

    #[test]
    fn empty_manifest_compiles_to_nothing() {
        let (_dir, path) = write_temp_toml("");
        let setup = CommandSetup::load(&GlobalOpts::default(), path, &Logger::new()).unwrap();
        assert!(setup.sets.is_empty());
    }
}
