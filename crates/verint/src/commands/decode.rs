use std::fmt::Write;

use anyhow::Context;
use serde::Serialize;
use tracing::instrument;

use verint_codec::PackedVersion;

use crate::cli::OutputFormat;
use crate::commands::{ExitStatus, write_error, write_json};
use crate::printer::Printer;

#[derive(Serialize)]
struct Decoded<'a> {
    integer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Print the canonical version of each packed integer, one per line.
#[instrument(skip(printer))]
pub(crate) fn decode(
    integers: &[String],
    signed: bool,
    format: OutputFormat,
    printer: Printer,
) -> anyhow::Result<ExitStatus> {
    let mut status = ExitStatus::Success;
    let mut decoded = Vec::with_capacity(integers.len());
    for integer in integers {
        let version = parse_cell(integer, signed).and_then(|packed| {
            packed
                .unpack()
                .with_context(|| format!("Failed to decode `{integer}`"))
        });
        match version {
            Ok(version) => decoded.push(Decoded {
                integer,
                version: Some(version.to_string()),
                error: None,
            }),
            Err(err) => {
                status = ExitStatus::Failure;
                if format == OutputFormat::Text {
                    write_error(printer, err.as_ref())?;
                }
                decoded.push(Decoded {
                    integer,
                    version: None,
                    error: Some(format!("{err:#}")),
                });
            }
        }
    }

    match format {
        OutputFormat::Text => {
            let mut stdout = printer.stdout();
            for version in decoded.iter().filter_map(|decoded| decoded.version.as_ref()) {
                writeln!(stdout, "{version}")?;
            }
        }
        OutputFormat::Json => write_json(printer, &decoded)?,
    }
    Ok(status)
}

/// Read a decimal or `0x`-prefixed hexadecimal integer, or a decimal signed column value.
fn parse_cell(input: &str, signed: bool) -> anyhow::Result<PackedVersion> {
    let input = input.trim();
    if signed {
        let value = input
            .parse::<i64>()
            .with_context(|| format!("`{input}` is not a signed 64-bit integer"))?;
        return Ok(PackedVersion::from_ordered_i64(value));
    }
    let value = if let Some(hex) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        u64::from_str_radix(&hex.replace('_', ""), 16)
    } else {
        input.replace('_', "").parse::<u64>()
    }
    .with_context(|| format!("`{input}` is not an unsigned 64-bit integer"))?;
    Ok(PackedVersion::from_u64(value))
}

#[cfg(test)]
mod tests {
    use super::parse_cell;

    #[test]
    fn cells() {
        assert_eq!(parse_cell("65295", false).unwrap().as_u64(), 0xFF0F);
        assert_eq!(
            parse_cell("0x0001_0000_0000_FF0F", false).unwrap().as_u64(),
            0x0001_0000_0000_FF0F
        );
        assert_eq!(parse_cell("-9223372036854775808", true).unwrap().as_u64(), 0);
        assert!(parse_cell("-1", false).is_err());
        assert!(parse_cell("1.0", false).is_err());
    }
}
