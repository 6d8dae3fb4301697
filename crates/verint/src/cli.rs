use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::env_vars::EnvVars;

#[derive(Parser)]
#[command(name = "verint", author, version, about)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Do not print any output.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    /// Use verbose output.
    ///
    /// Pass twice to show trace messages in a span tree. `RUST_LOG` overrides the filter.
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub(crate) verbose: u8,

    /// Disable colors.
    #[arg(
        global = true,
        long,
        hide = true,
        env = EnvVars::VERINT_NO_COLOR,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub(crate) no_color: bool,

    /// Control colors in output.
    #[arg(global = true, long, value_enum, default_value = "auto")]
    pub(crate) color: ColorChoice,

    /// The format in which results are printed.
    #[arg(
        global = true,
        long,
        value_enum,
        default_value = "text",
        env = EnvVars::VERINT_OUTPUT_FORMAT
    )]
    pub(crate) output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub(crate) enum ColorChoice {
    /// Enables colored output only when the output is going to a terminal or TTY with support.
    Auto,

    /// Enables colored output regardless of the detected environment.
    Always,

    /// Disables colored output.
    Never,
}

impl From<ColorChoice> for anstream::ColorChoice {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => Self::Auto,
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display the results in a human-readable format.
    #[default]
    Text,
    /// Display the results as JSON, for other tools to consume.
    Json,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Pack version strings into integers.
    Encode(EncodeArgs),
    /// Turn packed integers back into canonical version strings.
    Decode(DecodeArgs),
    /// Compare two versions through their packed integers.
    Compare(CompareArgs),
    /// Show the packed integer intervals matching comma-separated version specifiers.
    Range(RangeArgs),
    /// Encode a list of versions, one per line, and report what couldn't be encoded or didn't
    /// survive the round trip.
    Check(CheckArgs),
}

#[derive(Args)]
pub(crate) struct EncodeArgs {
    /// The versions to encode, e.g. `1.19`, `2.0rc1` or `1!1.0.post2`.
    #[arg(required = true)]
    pub(crate) versions: Vec<String>,

    /// Print the value for a signed 64-bit column instead.
    ///
    /// The signed value is the packed integer with its top bit flipped, which preserves the order.
    #[arg(long)]
    pub(crate) signed: bool,
}

#[derive(Args)]
pub(crate) struct DecodeArgs {
    /// The integers to decode, in decimal or with a `0x` prefix in hexadecimal.
    #[arg(required = true, allow_negative_numbers = true)]
    pub(crate) integers: Vec<String>,

    /// Read the integers as values from a signed 64-bit column, see `encode --signed`.
    #[arg(long)]
    pub(crate) signed: bool,
}

#[derive(Args)]
pub(crate) struct CompareArgs {
    /// The left-hand version.
    pub(crate) first: String,

    /// The right-hand version.
    pub(crate) second: String,
}

#[derive(Args)]
pub(crate) struct RangeArgs {
    /// The specifiers, e.g. `>=1.16, <2.0, !=1.18`.
    pub(crate) specifiers: String,

    /// Print the bounds for a signed 64-bit column instead.
    #[arg(long)]
    pub(crate) signed: bool,
}

#[derive(Args)]
pub(crate) struct CheckArgs {
    /// A file with one version per line. Reads from stdin if omitted or `-`.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub(crate) file: Option<PathBuf>,
}
