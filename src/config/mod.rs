//! Declarative intake: file declarations, the defaults record, and manifests.
pub mod toml_loader;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// One declarative `gpgfile` unit, exactly as written in a manifest.
///
/// Every field except `path` is optional; omitted values fall back to the
/// [`Defaults`] record at compile time. Unknown fields are rejected when
/// deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptedFileSpec {
    /// Absolute path of the decrypted (plaintext) file.
    pub path: String,
    /// Inline GPG-encrypted content.
    pub content: Option<String>,
    /// Reference to externally fetched GPG-encrypted content.
    pub source: Option<String>,
    /// `absent`, `encrypted`, `decrypted` or `present`.
    pub ensure: Option<String>,
    /// Directory holding the encrypted blob (defaults to the directory of `path`).
    pub encrypted_dir: Option<String>,
    /// File name of the encrypted blob, replacing the derived one.
    pub encrypted_name: Option<String>,
    /// Suffix appended to the plaintext file name to name the blob.
    pub encrypted_suffix: Option<String>,
    /// Mode of the plaintext file.
    pub mode: Option<String>,
    /// Mode of the encrypted blob.
    pub encrypted_mode: Option<String>,
    /// Owner of both files.
    pub owner: Option<String>,
    /// Group of both files.
    pub group: Option<String>,
    /// Keyring passed to `gpg --keyring`.
    pub keyring: Option<String>,
    /// Identity the decrypt command runs as.
    #[serde(alias = "gpguser")]
    pub user: Option<String>,
    /// Backup behaviour forwarded to both file actions.
    pub backup: Option<String>,
    /// Validation command forwarded to the plaintext file action.
    pub validate_cmd: Option<String>,
    /// Whether existing files may be replaced.
    pub replace: Option<bool>,
    /// SELinux: ignore default contexts.
    pub selinux_ignore_defaults: Option<bool>,
    /// SELinux range component.
    pub selrange: Option<String>,
    /// SELinux role component.
    pub selrole: Option<String>,
    /// SELinux type component.
    pub seltype: Option<String>,
    /// SELinux user component.
    pub seluser: Option<String>,
    /// Whether content diffs may be shown.
    pub show_diff: Option<bool>,
}

impl EncryptedFileSpec {
    /// Create a declaration for `path` with every optional field unset.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Where the encrypted bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Encrypted bytes carried inline in the declaration.
    Inline(String),
    /// Reference resolved by the executor (local path or `file://` URL).
    Source(String),
}

/// Every implicit default, in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Ensure value used when a declaration omits `ensure`.
    pub ensure: String,
    /// Suffix used to derive the encrypted file name.
    pub encrypted_suffix: String,
    /// Keyring passed to `gpg --keyring`.
    pub keyring: String,
    /// Owner of both files.
    pub owner: String,
    /// Group of both files.
    pub group: String,
    /// Mode of the plaintext file.
    pub mode: String,
    /// Mode of the encrypted blob.
    pub encrypted_mode: String,
    /// Backup behaviour; `None` leaves it to the executor.
    pub backup: Option<String>,
    /// Whether the encrypted blob may be replaced when it differs.
    pub replace: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            ensure: "decrypted".to_string(),
            encrypted_suffix: ".gpg".to_string(),
            keyring: "secring.gpg".to_string(),
            owner: "root".to_string(),
            group: "root".to_string(),
            mode: "0600".to_string(),
            encrypted_mode: "0600".to_string(),
            backup: None,
            replace: true,
        }
    }
}

/// Optional features the host has enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Capabilities {
    /// Allow the decrypt command to run as a declared `user`.
    pub decrypt_as_user: bool,
}

/// A manifest file: defaults, capabilities and the declarations to manage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Overrides for the built-in defaults.
    #[serde(default)]
    pub defaults: Defaults,
    /// Host capabilities.
    #[serde(default)]
    pub capabilities: Capabilities,
    /// `[[gpgfile]]` declarations, in manifest order.
    #[serde(default, rename = "gpgfile")]
    pub files: Vec<EncryptedFileSpec>,
}

impl Manifest {
    /// Load a manifest from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid TOML or names unknown fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }
}
