use std::fmt::{Display, Formatter, Write};
use std::process::ExitCode;

use owo_colors::OwoColorize;
use serde::Serialize;
use verint_codec::PackedVersion;

pub(crate) use check::check;
pub(crate) use compare::compare;
pub(crate) use decode::decode;
pub(crate) use encode::encode;
pub(crate) use range::range;

use crate::printer::Printer;

mod check;
mod compare;
mod decode;
mod encode;
mod range;

#[derive(Copy, Clone)]
pub(crate) enum ExitStatus {
    /// The command succeeded.
    Success,

    /// The command failed due to an error in the user input.
    Failure,

    /// The command failed with an unexpected error.
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => Self::from(0),
            ExitStatus::Failure => Self::from(1),
            ExitStatus::Error => Self::from(2),
        }
    }
}

/// Report a rejected input on stderr, with its chain of causes, and keep going.
pub(super) fn write_error(
    printer: Printer,
    err: &(dyn std::error::Error + 'static),
) -> anyhow::Result<()> {
    let mut stderr = printer.stderr();
    writeln!(stderr, "{}: {err}", "error".red().bold())?;
    let mut source = err.source();
    while let Some(cause) = source {
        writeln!(stderr, "  {}: {cause}", "Caused by".red().bold())?;
        source = cause.source();
    }
    Ok(())
}

/// A packed integer, as stored in an unsigned or a signed 64-bit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub(super) enum Cell {
    Unsigned(u64),
    Signed(i64),
}

impl Cell {
    pub(super) fn new(packed: PackedVersion, signed: bool) -> Self {
        if signed {
            Self::Signed(packed.to_ordered_i64())
        } else {
            Self::Unsigned(packed.as_u64())
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsigned(value) => write!(f, "{value}"),
            Self::Signed(value) => write!(f, "{value}"),
        }
    }
}

/// Print a value as pretty JSON on stdout.
pub(super) fn write_json(printer: Printer, value: &impl Serialize) -> anyhow::Result<()> {
    let mut stdout = printer.stdout();
    writeln!(stdout, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}
