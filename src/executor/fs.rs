//! File-system helpers for the local executor.
use anyhow::{Context as _, Result};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Suffix of the staging file written next to a target before it is renamed
/// into place.
const STAGE_SUFFIX: &str = ".gpgfile-stage";

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Parse an octal mode string such as `0600`.
///
/// # Errors
///
/// Returns an error if `mode` is not octal.
pub fn parse_mode(mode: &str) -> Result<u32> {
    u32::from_str_radix(mode, 8).with_context(|| format!("invalid octal mode: {mode}"))
}

/// Lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        // write! to a String is infallible; unwrap_or(()) makes that explicit.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}

/// Lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(sha256_hex(&bytes))
}

/// Path of the staging file used when writing `path`.
#[must_use]
pub fn stage_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(STAGE_SUFFIX);
    let mut staged = path.to_path_buf();
    staged.set_file_name(format!(".{}", name.to_string_lossy()));
    staged
}

/// Write `bytes` to a fresh staging file next to `path` with permissions
/// `mode` from the moment it is created, and return the staging path.
///
/// # Errors
///
/// Returns an error if the staging file cannot be created or written.
pub fn write_staged(path: &Path, bytes: &[u8], mode: u32) -> Result<PathBuf> {
    let staged = stage_path(path);
    // A leftover from an interrupted run would keep its old permissions.
    if staged.symlink_metadata().is_ok() {
        fs::remove_file(&staged)
            .with_context(|| format!("remove stale staging file: {}", staged.display()))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt as _;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options
        .open(&staged)
        .with_context(|| format!("create {}", staged.display()))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .with_context(|| format!("write {}", staged.display()))?;
    Ok(staged)
}

/// Move a staging file over its target.
///
/// # Errors
///
/// Returns an error if the rename fails.
pub fn commit_staged(staged: &Path, path: &Path) -> Result<()> {
    fs::rename(staged, path)
        .with_context(|| format!("rename {} to {}", staged.display(), path.display()))
}

/// Permission bits of `path`, or `None` on platforms without Unix modes.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read.
pub fn current_mode(path: &Path) -> Result<Option<u32>> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        Ok(Some(meta.permissions().mode() & 0o7777))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(None)
    }
}

/// Set the permission bits of `path` (no-op without Unix modes).
///
/// # Errors
///
/// Returns an error if the permissions cannot be changed.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .with_context(|| format!("set permissions: {}", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}
