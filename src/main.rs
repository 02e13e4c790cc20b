use anyhow::Result;
use clap::Parser;

use gpgfile::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = logging::Logger::new();

    match args.command {
        cli::Command::Validate(arg) => commands::validate::run(&args.global, &arg, &log),
        cli::Command::Compile(opts) => commands::compile::run(&args.global, &opts, &log),
        cli::Command::Apply(opts) => commands::apply::run(&args.global, &opts, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
