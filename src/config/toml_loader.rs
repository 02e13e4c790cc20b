//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Read and deserialize a TOML file.
///
/// Unlike optional configuration, a manifest that does not exist is an
/// error: silently compiling nothing would leave stale plaintext in place.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Parse`] if it cannot be deserialized into `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content, &path.display().to_string())
}

/// Deserialize TOML text; `origin` names the text in error messages.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the text cannot be deserialized into `T`.
pub fn parse_config<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        message: e.message().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        name: String,
    }

    #[test]
    fn parse_valid_toml() {
        let sample: Sample = parse_config("name = \"data\"\n", "inline").unwrap();
        assert_eq!(sample.name, "data");
    }

    #[test]
    fn parse_error_names_origin() {
        let err = parse_config::<Sample>("name = ", "inline.toml").unwrap_err();
        assert!(err.to_string().contains("inline.toml"), "got {err}");
    }

    #[test]
    fn parse_error_reports_unknown_field() {
        let err = parse_config::<Sample>("name = \"a\"\nextra = 1\n", "inline").unwrap_err();
        assert!(err.to_string().contains("extra"), "got {err}");
    }

    #[test]
    fn load_reads_file_from_disk() {
        let (_dir, path) = crate::config::test_helpers::write_temp_toml("name = \"x\"\n");
        let sample: Sample = load_config(&path).unwrap();
        assert_eq!(sample.name, "x");
    }
}
