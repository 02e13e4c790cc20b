//! Command: print the compiled actions of a manifest.
use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::{CompileOpts, Format, GlobalOpts};
use crate::compiler::CompiledActionSet;
use crate::logging::Logger;

/// Run the compile command.
///
/// # Errors
///
/// Returns an error if the manifest does not compile.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &CompileOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, &opts.manifest, log)?;
    print!("{}", render(&setup.sets, opts.format)?);
    Ok(())
}

/// Render compiled sets in `format`.
///
/// Text output separates sets with a blank line; JSON output is a pretty
/// printed array with a trailing newline.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(sets: &[CompiledActionSet], format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(sets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
        Format::Json => {
            let mut json =
                serde_json::to_string_pretty(sets).context("serializing compiled actions")?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::compiler::{CompileOpts as Opts, compile};
    use crate::config::EncryptedFileSpec;

    fn set(path: &str, ensure: &str) -> CompiledActionSet {
        let spec = EncryptedFileSpec {
            content: Some("cipher".to_string()),
            ensure: Some(ensure.to_string()),
            ..EncryptedFileSpec::new(path)
        };
        compile(&spec, &Opts::default()).unwrap()
    }

    #[test]
    fn text_separates_sets_with_blank_line() {
        let sets = [set("/tmp/a", "present"), set("/tmp/b", "encrypted")];
        let out = render(&sets, Format::Text).unwrap();
        assert!(out.starts_with("File[/tmp/a.gpg]\n"));
        assert!(out.contains("\n\nFile[/tmp/b.gpg]\n"));
        assert!(out.ends_with("  subscribe: File[/tmp/b.gpg]\n"));
    }

    #[test]
    fn empty_text_output() {
        assert_eq!(render(&[], Format::Text).unwrap(), "");
    }

    #[test]
    fn json_is_an_array_of_sets() {
        let out = render(&[set("/tmp/a", "present")], Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let actions = value[0]["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(value[0]["path"], "/tmp/a");
        assert_eq!(actions[0]["type"], "file");
        assert_eq!(actions[0]["id"], "File[/tmp/a.gpg]");
        assert_eq!(actions[2]["id"], "Exec[gpgfile-/tmp/a]");
        assert_eq!(actions[2]["noop"], false);
    }
}
