use std::cmp::Ordering;
use std::fmt::Write;
use std::str::FromStr;

use anyhow::Context;
use serde::Serialize;
use tracing::instrument;

use verint_codec::PackedVersion;

use crate::cli::OutputFormat;
use crate::commands::{ExitStatus, write_error, write_json};
use crate::printer::Printer;

#[derive(Serialize)]
struct Comparison<'a> {
    first: &'a str,
    second: &'a str,
    first_packed: u64,
    second_packed: u64,
    ordering: &'static str,
}

/// Print how two versions compare, using nothing but their packed integers.
#[instrument(skip(printer))]
pub(crate) fn compare(
    first: &str,
    second: &str,
    format: OutputFormat,
    printer: Printer,
) -> anyhow::Result<ExitStatus> {
    let packed = PackedVersion::from_str(first)
        .with_context(|| format!("Failed to encode `{first}`"))
        .and_then(|first_packed| {
            let second_packed = PackedVersion::from_str(second)
                .with_context(|| format!("Failed to encode `{second}`"))?;
            Ok((first_packed, second_packed))
        });
    let (first_packed, second_packed) = match packed {
        Ok(packed) => packed,
        Err(err) => {
            write_error(printer, err.as_ref())?;
            return Ok(ExitStatus::Failure);
        }
    };

    let ordering = match first_packed.cmp(&second_packed) {
        Ordering::Less => "<",
        Ordering::Equal => "==",
        Ordering::Greater => ">",
    };

    match format {
        OutputFormat::Text => writeln!(printer.stdout(), "{first} {ordering} {second}")?,
        OutputFormat::Json => write_json(
            printer,
            &Comparison {
                first,
                second,
                first_packed: first_packed.as_u64(),
                second_packed: second_packed.as_u64(),
                ordering,
            },
        )?,
    }
    Ok(ExitStatus::Success)
}
