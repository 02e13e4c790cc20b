//! Ensure-state mapping: what each declared state means for the two files
//! and the decrypt step.
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Declared lifecycle state of an encrypted/plaintext pair.
///
/// `present` is accepted as a synonym and parses to [`Ensure::Decrypted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ensure {
    /// Neither file should exist.
    Absent,
    /// Only the encrypted blob is managed.
    Encrypted,
    /// The blob exists and is decrypted next to it.
    Decrypted,
}

impl FromStr for Ensure {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "absent" => Ok(Self::Absent),
            "encrypted" => Ok(Self::Encrypted),
            "decrypted" | "present" => Ok(Self::Decrypted),
            other => Err(ValidationError::InvalidEnsure {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Encrypted => write!(f, "encrypted"),
            Self::Decrypted => write!(f, "decrypted"),
        }
    }
}

/// Desired existence of a managed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileEnsure {
    /// A regular file must exist.
    File,
    /// The file must not exist.
    Absent,
}

impl fmt::Display for FileEnsure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Concrete decisions derived from an [`Ensure`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsurePlan {
    /// What to do with the encrypted blob.
    pub encrypted_file: FileEnsure,
    /// What to do with the plaintext file; `None` leaves it unmanaged.
    pub plaintext_file: Option<FileEnsure>,
    /// Whether the decrypt action may execute (it is always declared).
    pub run_decrypt: bool,
}

impl Ensure {
    /// Map this state onto file and decrypt decisions.
    ///
    /// Moving from `decrypted` to `encrypted` leaves an existing plaintext
    /// file alone; only `absent` removes plaintext.
    #[must_use]
    pub const fn plan(self) -> EnsurePlan {
        match self {
            Self::Absent => EnsurePlan {
                encrypted_file: FileEnsure::Absent,
                plaintext_file: Some(FileEnsure::Absent),
                run_decrypt: false,
            },
            Self::Encrypted => EnsurePlan {
                encrypted_file: FileEnsure::File,
                plaintext_file: None,
                run_decrypt: false,
            },
            Self::Decrypted => EnsurePlan {
                encrypted_file: FileEnsure::File,
                plaintext_file: Some(FileEnsure::File),
                run_decrypt: true,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_accepted_token() {
        assert_eq!("absent".parse::<Ensure>().unwrap(), Ensure::Absent);
        assert_eq!("encrypted".parse::<Ensure>().unwrap(), Ensure::Encrypted);
        assert_eq!("decrypted".parse::<Ensure>().unwrap(), Ensure::Decrypted);
        assert_eq!("present".parse::<Ensure>().unwrap(), Ensure::Decrypted);
    }

    #[test]
    fn parsing_is_case_sensitive() {
        for value in ["Present", "ABSENT", "file", "", " present"] {
            assert_eq!(
                value.parse::<Ensure>(),
                Err(ValidationError::InvalidEnsure {
                    value: value.to_string()
                }),
                "'{value}' should be rejected"
            );
        }
    }

    #[test]
    fn absent_deletes_both_and_suppresses_decrypt() {
        let plan = Ensure::Absent.plan();
        assert_eq!(plan.encrypted_file, FileEnsure::Absent);
        assert_eq!(plan.plaintext_file, Some(FileEnsure::Absent));
        assert!(!plan.run_decrypt);
    }

    #[test]
    fn encrypted_leaves_plaintext_unmanaged() {
        let plan = Ensure::Encrypted.plan();
        assert_eq!(plan.encrypted_file, FileEnsure::File);
        assert_eq!(plan.plaintext_file, None);
        assert!(!plan.run_decrypt);
    }

    #[test]
    fn decrypted_creates_both_and_runs_decrypt() {
        let plan = Ensure::Decrypted.plan();
        assert_eq!(plan.encrypted_file, FileEnsure::File);
        assert_eq!(plan.plaintext_file, Some(FileEnsure::File));
        assert!(plan.run_decrypt);
    }

    #[test]
    fn display_uses_canonical_names() {
        assert_eq!(Ensure::Decrypted.to_string(), "decrypted");
        assert_eq!(FileEnsure::File.to_string(), "file");
        assert_eq!(FileEnsure::Absent.to_string(), "absent");
    }
}
