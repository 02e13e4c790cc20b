//! POSIX shell quoting for values interpolated into generated commands.
//!
//! Every externally controlled string that ends up in a command line (paths,
//! keyring names) goes through [`quote`]. The token is always single-quoted,
//! so no character inside it is ever interpreted by the shell: spaces, `$`,
//! backticks, `;`, newlines and `!` stay literal. An embedded single quote
//! is the only character that cannot appear inside single quotes; it is
//! emitted as `'\''` (close quote, escaped quote, reopen quote).
use std::path::Path;

/// Quote `s` as a single POSIX shell word.
///
/// # Examples
///
/// ```
/// use gpgfile::quote::quote;
///
/// assert_eq!(quote("secring.gpg"), "'secring.gpg'");
/// assert_eq!(quote("/tmp/foo's"), r"'/tmp/foo'\''s'");
/// ```
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str(r"'\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// Quote a path as a single POSIX shell word.
///
/// Paths compiled by this crate originate from UTF-8 declarations, so the
/// lossy conversion never alters them.
#[must_use]
pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}
