//! Declaration validation.
//!
//! [`validate`] checks one [`EncryptedFileSpec`] and, on success, returns a
//! [`ValidatedSpec`] carrying the parsed ensure state and content source so
//! that later stages never re-inspect raw strings. Checks run in a fixed
//! order and stop at the first violation:
//!
//! 1. exactly one of `content` / `source`
//! 2. `ensure`
//! 3. `mode`
//! 4. `encrypted_mode`
//! 5. `encrypted_name` is a single file name
//! 6. `path` is fully qualified
//! 7. `path` ends in a file name
//! 8. `encrypted_dir`, when set, is fully qualified
//! 9. `user` is only set when decrypting as another user is enabled
use super::{Capabilities, ContentSource, Defaults, EncryptedFileSpec};
use crate::ensure::Ensure;
use crate::error::ValidationError;
use crate::paths;

/// Minimum length for octal mode strings.
const OCTAL_MODE_MIN_LEN: usize = 3;

/// Maximum length for octal mode strings.
const OCTAL_MODE_MAX_LEN: usize = 4;

/// A declaration that passed validation, with its parsed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSpec<'a> {
    /// The declaration as written.
    pub spec: &'a EncryptedFileSpec,
    /// Parsed ensure state (`present` already folded into `decrypted`).
    pub ensure: Ensure,
    /// The single content origin.
    pub content: ContentSource,
}

/// Validate a declaration against the defaults record and host capabilities.
///
/// Defaults fill omitted `ensure` and mode values before they are checked,
/// so an overridden default is held to the same policy as a declared value.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, in the order listed in the
/// module documentation.
pub fn validate<'a>(
    spec: &'a EncryptedFileSpec,
    defaults: &Defaults,
    capabilities: Capabilities,
) -> Result<ValidatedSpec<'a>, ValidationError> {
    let content = match (&spec.content, &spec.source) {
        (Some(content), None) => ContentSource::Inline(content.clone()),
        (None, Some(source)) => ContentSource::Source(source.clone()),
        _ => return Err(ValidationError::MissingContent),
    };

    let ensure: Ensure = spec.ensure.as_deref().unwrap_or(&defaults.ensure).parse()?;

    validate_mode("mode", spec.mode.as_deref().unwrap_or(&defaults.mode))?;
    validate_mode(
        "encrypted_mode",
        spec.encrypted_mode
            .as_deref()
            .unwrap_or(&defaults.encrypted_mode),
    )?;

    if let Some(name) = &spec.encrypted_name
        && !paths::is_file_name(name)
    {
        return Err(ValidationError::InvalidEncryptedName {
            value: name.clone(),
        });
    }

    if !paths::is_fully_qualified(&spec.path) {
        return Err(ValidationError::RelativePath {
            field: "path",
            path: spec.path.clone(),
        });
    }

    if !paths::has_file_name(&spec.path) {
        return Err(ValidationError::MissingFileName {
            path: spec.path.clone(),
        });
    }

    if let Some(dir) = &spec.encrypted_dir
        && !paths::is_fully_qualified(dir)
    {
        return Err(ValidationError::RelativePath {
            field: "encrypted_dir",
            path: dir.clone(),
        });
    }

    if let Some(user) = &spec.user
        && !capabilities.decrypt_as_user
    {
        return Err(ValidationError::UserRequiresCapability { user: user.clone() });
    }

    Ok(ValidatedSpec {
        spec,
        ensure,
        content,
    })
}

/// Check a mode string: 3 or 4 octal digits, the last one `0`.
///
/// The trailing zero is a policy, not a syntax rule: neither file may grant
/// any permission to "other". Malformed and too-permissive modes are
/// rejected with the same error.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidMode`] naming `field`.
pub fn validate_mode(field: &'static str, mode: &str) -> Result<(), ValidationError> {
    let well_formed = (OCTAL_MODE_MIN_LEN..=OCTAL_MODE_MAX_LEN).contains(&mode.len())
        && mode.chars().all(|c| ('0'..='7').contains(&c));
    if well_formed && mode.ends_with('0') {
        Ok(())
    } else {
        Err(ValidationError::InvalidMode {
            field,
            value: mode.to_string(),
        })
    }
}

/// Check a [`Defaults`] record on its own, before any declaration uses it.
///
/// # Errors
///
/// Returns the first invalid default.
pub fn validate_defaults(defaults: &Defaults) -> Result<(), ValidationError> {
    defaults.ensure.parse::<Ensure>()?;
    validate_mode("mode", &defaults.mode)?;
    validate_mode("encrypted_mode", &defaults.encrypted_mode)
}
