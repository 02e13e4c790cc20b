//! Command: validate every declaration in a manifest.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ManifestArg};
use crate::logging::Logger;

/// Run the validate command.
///
/// Validation is compilation without output: a manifest is valid when
/// every declaration compiles and no file is managed twice.
///
/// # Errors
///
/// Returns the first load, validation or compile error.
pub fn run(global: &GlobalOpts, arg: &ManifestArg, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, arg, log)?;
    log.info(&format!(
        "{}: {} declaration(s) valid",
        setup.path.display(),
        setup.sets.len()
    ));
    Ok(())
}
