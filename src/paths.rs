//! Derivation of the encrypted-blob and plaintext paths of a declaration.
//!
//! Declared paths may be POSIX (`/etc/app/secret`) or Windows-qualified
//! (`C:\ProgramData\app\secret`). Splitting and joining are done on the
//! declared text with the separator style of that text, so the derived paths
//! are identical regardless of the host compiling them.
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{Defaults, EncryptedFileSpec};

/// The two file locations managed for one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    /// Location of the encrypted blob.
    pub encrypted: PathBuf,
    /// Location of the decrypted file (the declared `path`).
    pub plaintext: PathBuf,
}

impl ResolvedPaths {
    /// Derive both paths from a declaration and the defaults record.
    ///
    /// The encrypted directory is `encrypted_dir` or the directory of `path`.
    /// The encrypted name is `encrypted_name` verbatim, or the file name of
    /// `path` followed by `encrypted_suffix` (default `.gpg`).
    #[must_use]
    pub fn resolve(spec: &EncryptedFileSpec, defaults: &Defaults) -> Self {
        let (dir, base) = split_file_name(&spec.path);
        let dir = spec.encrypted_dir.as_deref().unwrap_or(dir);
        let name = spec.encrypted_name.clone().unwrap_or_else(|| {
            let suffix = spec
                .encrypted_suffix
                .as_deref()
                .unwrap_or(&defaults.encrypted_suffix);
            format!("{base}{suffix}")
        });

        Self {
            encrypted: PathBuf::from(join(dir, &name, separator_of(&spec.path))),
            plaintext: PathBuf::from(&spec.path),
        }
    }

    /// Return `true` when the blob would be written over the plaintext file.
    #[must_use]
    pub fn collide(&self) -> bool {
        self.encrypted == self.plaintext
    }
}

/// Return `true` if `path` is fully qualified on POSIX or Windows.
///
/// Accepted forms: `/abs`, `C:\abs`, `C:/abs` and UNC `\\server\share`.
#[must_use]
pub fn is_fully_qualified(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with(r"\\") {
        return true;
    }
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(drive), Some(':'), Some('\\' | '/')) if drive.is_ascii_alphabetic()
    )
}

/// Return `true` if `name` can stand alone as a file name: non-empty, not
/// `.` or `..`, and free of separators.
#[must_use]
pub fn is_file_name(name: &str) -> bool {
    !matches!(name, "" | "." | "..") && !name.contains(is_separator)
}

/// Return `true` if the last component of `path` names a file.
///
/// `/tmp/data/`, `/` and `C:\` end in a separator and name no file.
#[must_use]
pub fn has_file_name(path: &str) -> bool {
    is_file_name(split_file_name(path).1)
}

/// Return `true` if `c` separates path components on either platform.
#[must_use]
pub const fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Separator used when joining onto a directory taken from `path`.
fn separator_of(path: &str) -> char {
    if path.starts_with('/') { '/' } else { '\\' }
}

/// Split `path` into its directory (including a root separator) and file name.
fn split_file_name(path: &str) -> (&str, &str) {
    let windows = !path.starts_with('/');
    let cut = if windows {
        path.rfind(is_separator)
    } else {
        path.rfind('/')
    };
    let Some(idx) = cut else {
        return ("", path);
    };
    let (head, tail) = path.split_at(idx);
    let base = tail.get(1..).unwrap_or_default();
    // Keep the separator when it is the root, e.g. "/data" or "C:\data".
    if head.is_empty() || head.ends_with(':') {
        (path.split_at(idx + 1).0, base)
    } else {
        (head, base)
    }
}

/// Join `name` onto `dir` without doubling a trailing separator.
fn join(dir: &str, name: &str, sep: char) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with(is_separator) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{sep}{name}")
    }
}
