//! Command: print version information.

/// `gpgfile <version>`, preferring the version stamped at build time.
#[must_use]
pub fn version_string() -> String {
    let version = option_env!("GPGFILE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    format!("gpgfile {version}")
}

/// Print the gpgfile version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("{}", version_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_prefixed_with_program_name() {
        let version = version_string();
        assert!(version.starts_with("gpgfile "));
        assert!(version.len() > "gpgfile ".len());
    }
}
