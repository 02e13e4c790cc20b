//! Synthesis of the decrypt command line and its guard.
//!
//! Every interpolated value goes through [`quote`](crate::quote::quote), so
//! paths and keyring names containing spaces, quotes or shell
//! metacharacters are passed to `gpg` as single literal arguments.
use std::path::Path;

use crate::quote::{quote, quote_path};

/// Program invoked to decrypt the blob.
pub const GPG_PROGRAM: &str = "gpg";

/// Exit status reserved for "decryption failed, encrypted blob removed".
pub const DECRYPT_FAILURE_EXIT_CODE: i32 = 3;

/// The bare `gpg` invocation that writes `plaintext` from `encrypted`.
///
/// ```
/// use gpgfile::compiler::command::decrypt_invocation;
/// use std::path::Path;
///
/// assert_eq!(
///     decrypt_invocation("secring.gpg", Path::new("/tmp/data"), Path::new("/tmp/data.gpg")),
///     "gpg --decrypt --keyring 'secring.gpg' --yes -o '/tmp/data' '/tmp/data.gpg'"
/// );
/// ```
#[must_use]
pub fn decrypt_invocation(keyring: &str, plaintext: &Path, encrypted: &Path) -> String {
    format!(
        "{GPG_PROGRAM} --decrypt --keyring {} --yes -o {} {}",
        quote(keyring),
        quote_path(plaintext),
        quote_path(encrypted),
    )
}

/// The full decrypt command: the invocation plus its recovery clause.
///
/// When `gpg` fails the encrypted blob is deleted and the command exits with
/// [`DECRYPT_FAILURE_EXIT_CODE`], so the next run fetches a fresh blob and
/// tries again instead of leaving a half-written plaintext behind.
#[must_use]
pub fn decrypt_command(keyring: &str, plaintext: &Path, encrypted: &Path) -> String {
    format!(
        "{} || {{ rm -f -- {}; exit {DECRYPT_FAILURE_EXIT_CODE}; }}",
        decrypt_invocation(keyring, plaintext, encrypted),
        quote_path(encrypted),
    )
}

/// Guard that succeeds when `plaintext` exists and is non-empty.
#[must_use]
pub fn plaintext_guard(plaintext: &Path) -> String {
    format!("test -s {}", quote_path(plaintext))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_command_is_bit_exact() {
        assert_eq!(
            decrypt_command(
                "secring.gpg",
                Path::new("/tmp/data"),
                Path::new("/tmp/data.gpg")
            ),
            "gpg --decrypt --keyring 'secring.gpg' --yes -o '/tmp/data' '/tmp/data.gpg' \
             || { rm -f -- '/tmp/data.gpg'; exit 3; }"
        );
    }

    #[test]
    fn apostrophes_are_escaped_everywhere() {
        let cmd = decrypt_command(
            "foo's",
            Path::new("/tmp/foo's"),
            Path::new("/tmp/foo's.gpg"),
        );
        assert!(cmd.contains(r"--keyring 'foo'\''s'"));
        assert!(cmd.contains(r"-o '/tmp/foo'\''s' '/tmp/foo'\''s.gpg'"));
        assert!(cmd.contains(r"rm -f -- '/tmp/foo'\''s.gpg'"));
    }

    #[test]
    fn guard_tests_for_non_empty_plaintext() {
        assert_eq!(
            plaintext_guard(Path::new("/tmp/a b")),
            "test -s '/tmp/a b'"
        );
    }

    #[cfg(unix)]
    #[test]
    fn recovery_clause_removes_blob_and_exits_three() {
        let dir = tempfile::tempdir().unwrap();
        let encrypted = dir.path().join("it's.gpg");
        std::fs::write(&encrypted, "not a pgp message").unwrap();
        // Replace the gpg invocation with one that always fails.
        let cmd = decrypt_command("k", &dir.path().join("it's"), &encrypted)
            .replacen(GPG_PROGRAM, "false", 1);

        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(&cmd)
            .status()
            .unwrap();
        assert_eq!(status.code(), Some(DECRYPT_FAILURE_EXIT_CODE));
        assert!(!encrypted.exists());
    }
}
