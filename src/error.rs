//! Domain-specific error types for the gpgfile compiler and executor.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ValidationError`],
//! [`ExecError`]) while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error layers
//!
//! ```text
//! ConfigError        manifest I/O, parsing, duplicate declarations
//! └── Declaration(CompileError)
//!     └── Invalid(ValidationError)
//! ExecError          decrypt or command failures while applying
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Rejections raised while validating one declaration.
///
/// Validation stops at the first violation; the message names the offending
/// field and the accepted shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Neither or both of `content` and `source` were supplied.
    #[error("Either `content` or `source` must be provided, but not both")]
    MissingContent,

    /// `ensure` is not one of the accepted tokens.
    #[error(
        "`ensure` must be one of `decrypted`, `encrypted`, `present`, or `absent`, not '{value}'"
    )]
    InvalidEnsure {
        /// The rejected value.
        value: String,
    },

    /// A mode is malformed or grants permissions to "other".
    #[error("`{field}` must be numeric, and must end with `0` (got '{value}')")]
    InvalidMode {
        /// Name of the offending field (`mode`, `encrypted_mode`, ...).
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// `encrypted_name` is empty, `.`, `..`, or names a path rather than a
    /// single file name.
    #[error("`encrypted_name` must be a single file name without `/` or `\\` (got '{value}')")]
    InvalidEncryptedName {
        /// The rejected value.
        value: String,
    },

    /// `path` or `encrypted_dir` is not fully qualified.
    #[error("`{field}` must be fully qualified, not '{path}'")]
    RelativePath {
        /// Name of the offending field (`path` or `encrypted_dir`).
        field: &'static str,
        /// The rejected path.
        path: String,
    },

    /// `path` ends with a separator, so it names a directory, not a file.
    #[error("`path` must name a file, not '{path}'")]
    MissingFileName {
        /// The rejected path.
        path: String,
    },

    /// `user` was set but decrypting as another user is not enabled.
    #[error("`user` ('{user}') requires the decrypt_as_user capability")]
    UserRequiresCapability {
        /// The requested decrypt identity.
        user: String,
    },
}

/// Errors that prevent a declaration from compiling into actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The declaration failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The encrypted blob would be written over the plaintext file.
    #[error("encrypted path and plaintext path are both '{}'", .path.display())]
    PathCollision {
        /// The shared path.
        path: PathBuf,
    },
}

/// Errors that arise from manifest loading and cross-declaration checks.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The manifest file could not be read.
    #[error("IO error reading manifest {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or contains unknown fields.
    #[error("Invalid manifest {path}: {message}")]
    Parse {
        /// Path to the manifest.
        path: String,
        /// Parser message.
        message: String,
    },

    /// The `[defaults]` table breaks the ensure or mode policy.
    #[error("Invalid [defaults]: {source}")]
    Defaults {
        /// The rejected default.
        source: ValidationError,
    },

    /// Two declarations manage the same file.
    #[error("'{}' is managed by more than one declaration", .path.display())]
    DuplicatePath {
        /// The path declared twice.
        path: PathBuf,
    },

    /// A declaration in the manifest failed to compile.
    #[error("gpgfile #{index} ({path}): {source}")]
    Declaration {
        /// Zero-based position of the declaration in the manifest.
        index: usize,
        /// Declared plaintext path.
        path: String,
        /// The compile failure.
        source: CompileError,
    },
}

/// Errors raised while applying compiled actions.
#[derive(Error, Debug)]
pub enum ExecError {
    /// `gpg --decrypt` failed; the recovery clause removed the encrypted blob.
    #[error("decryption of {} failed (exit {code}); encrypted file removed: {stderr}", .encrypted.display())]
    DecryptFailed {
        /// The encrypted file that was removed.
        encrypted: PathBuf,
        /// Exit status reported by the command.
        code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// A command exited non-zero for a reason other than a decrypt failure.
    #[error("command '{command}' failed (exit {code}): {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Exit status, or `-1` when killed by a signal.
        code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// A `source` reference cannot be fetched by this executor.
    #[error("unsupported source '{source_ref}': only local paths and file:// URLs are supported")]
    UnsupportedSource {
        /// The declared source reference.
        source_ref: String,
    },
}
