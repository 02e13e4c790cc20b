use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI entry point for the gpgfile compiler.
#[derive(Parser, Debug)]
#[command(
    name = "gpgfile",
    about = "Compile and apply declarations of GPG-encrypted files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Allow declarations to decrypt as another user (`user` / `gpguser`)
    #[arg(long, global = true)]
    pub allow_decrypt_as_user: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate every declaration in a manifest
    Validate(ManifestArg),
    /// Print the compiled actions of a manifest
    Compile(CompileOpts),
    /// Apply a manifest to this host
    Apply(ApplyOpts),
    /// Print version information
    Version,
}

/// Manifest location shared by the manifest subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct ManifestArg {
    /// Manifest file (defaults to $GPGFILE_MANIFEST, then ./gpgfile.toml)
    pub manifest: Option<PathBuf>,
}

/// Output format of `compile`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Indented plan listing
    #[default]
    Text,
    /// JSON array of compiled action sets
    Json,
}

/// Options for the `compile` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct CompileOpts {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ApplyOpts {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Do not enforce file owner and group or switch to the decrypt user
    #[arg(long = "no-chown", action = clap::ArgAction::SetFalse)]
    pub chown: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_validate_with_manifest() {
        let cli = Cli::parse_from(["gpgfile", "validate", "/etc/gpgfile.toml"]);
        assert!(
            matches!(&cli.command, Command::Validate(arg) if arg.manifest == Some(PathBuf::from("/etc/gpgfile.toml"))),
            "Expected Validate command with a manifest"
        );
    }

    #[test]
    fn parse_validate_without_manifest() {
        let cli = Cli::parse_from(["gpgfile", "validate"]);
        assert!(matches!(&cli.command, Command::Validate(arg) if arg.manifest.is_none()));
    }

    #[test]
    fn parse_compile_defaults_to_text() {
        let cli = Cli::parse_from(["gpgfile", "compile"]);
        assert!(matches!(&cli.command, Command::Compile(opts) if opts.format == Format::Text));
    }

    #[test]
    fn parse_compile_json() {
        let cli = Cli::parse_from(["gpgfile", "compile", "--format", "json", "m.toml"]);
        assert!(
            matches!(&cli.command, Command::Compile(_)),
            "Expected Compile command"
        );
        if let Command::Compile(opts) = cli.command {
            assert_eq!(opts.format, Format::Json);
            assert_eq!(opts.manifest.manifest, Some(PathBuf::from("m.toml")));
        }
    }

    #[test]
    fn parse_compile_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["gpgfile", "compile", "--format", "yaml"]).is_err());
    }

    #[test]
    fn parse_apply_defaults() {
        let cli = Cli::parse_from(["gpgfile", "apply"]);
        assert!(
            matches!(&cli.command, Command::Apply(_)),
            "Expected Apply command"
        );
        if let Command::Apply(opts) = cli.command {
            assert!(!opts.dry_run);
            assert!(opts.chown, "ownership is managed by default");
        }
    }

    #[test]
    fn parse_apply_dry_run_short() {
        let cli = Cli::parse_from(["gpgfile", "apply", "-d"]);
        assert!(matches!(&cli.command, Command::Apply(opts) if opts.dry_run));
    }

    #[test]
    fn parse_apply_no_chown() {
        let cli = Cli::parse_from(["gpgfile", "apply", "--no-chown"]);
        assert!(matches!(&cli.command, Command::Apply(opts) if !opts.chown));
    }

    #[test]
    fn parse_allow_decrypt_as_user_is_global() {
        let cli = Cli::parse_from(["gpgfile", "compile", "--allow-decrypt-as-user"]);
        assert!(cli.global.allow_decrypt_as_user);

        let cli = Cli::parse_from(["gpgfile", "--allow-decrypt-as-user", "apply"]);
        assert!(cli.global.allow_decrypt_as_user);
    }

    #[test]
    fn parse_verbose_flag() {
        let cli = Cli::parse_from(["gpgfile", "-v", "validate"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["gpgfile", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["gpgfile"]).is_err());
    }
}
