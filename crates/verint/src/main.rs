use std::process::ExitCode;

use anstream::eprintln;
use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use verint_logging::{Level, setup_logging};

use crate::cli::{Cli, Commands};
use crate::commands::ExitStatus;
use crate::printer::Printer;

mod cli;
mod commands;
mod env_vars;
mod printer;

#[instrument(skip_all)]
fn run(cli: Cli) -> Result<ExitStatus> {
    // Configure the `Printer`, which controls user-facing output in the CLI.
    let printer = if cli.quiet {
        Printer::Quiet
    } else {
        Printer::Default
    };
    let format = cli.output_format;

    match cli.command {
        Commands::Encode(args) => commands::encode(&args.versions, args.signed, format, printer),
        Commands::Decode(args) => commands::decode(&args.integers, args.signed, format, printer),
        Commands::Compare(args) => commands::compare(&args.first, &args.second, format, printer),
        Commands::Range(args) => commands::range(&args.specifiers, args.signed, format, printer),
        Commands::Check(args) => commands::check(args.file.as_deref(), format, printer),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        anstream::ColorChoice::write_global(anstream::ColorChoice::Never);
    } else {
        anstream::ColorChoice::write_global(cli.color.into());
    }

    // Configure the `tracing` crate, which controls internal logging.
    let level = if cli.quiet {
        Level::Default
    } else {
        Level::from_verbosity(cli.verbose)
    };
    let result = setup_logging(level).and_then(|()| {
        debug!("verint {}", env!("CARGO_PKG_VERSION"));
        run(cli)
    });

    match result {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{}: {}", "error".red().bold(), err);
            for cause in err.chain().skip(1) {
                eprintln!("  {}: {}", "Caused by".red().bold(), cause);
            }
            ExitStatus::Error.into()
        }
    }
}
