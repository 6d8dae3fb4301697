use std::fmt::Write;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, instrument};

use verint_codec::PackedVersion;

use crate::cli::OutputFormat;
use crate::commands::{Cell, ExitStatus, write_error, write_json};
use crate::printer::Printer;

#[derive(Serialize)]
struct Encoded<'a> {
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    packed: Option<Cell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Print the packed integer of each version, one per line.
///
/// Versions that can't be encoded are reported on stderr and make the command fail, but don't
/// stop the others from being encoded.
#[instrument(skip(printer))]
pub(crate) fn encode(
    versions: &[String],
    signed: bool,
    format: OutputFormat,
    printer: Printer,
) -> anyhow::Result<ExitStatus> {
    let mut status = ExitStatus::Success;
    let mut encoded = Vec::with_capacity(versions.len());
    for version in versions {
        match PackedVersion::from_str(version) {
            Ok(packed) => {
                debug!("Packed `{version}` into `{:#018x}`", packed.as_u64());
                encoded.push(Encoded {
                    version,
                    packed: Some(Cell::new(packed, signed)),
                    error: None,
                });
            }
            Err(err) => {
                status = ExitStatus::Failure;
                if format == OutputFormat::Text {
                    write_error(printer, &err)?;
                }
                encoded.push(Encoded {
                    version,
                    packed: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    match format {
        OutputFormat::Text => {
            let mut stdout = printer.stdout();
            for cell in encoded.iter().filter_map(|encoded| encoded.packed) {
                writeln!(stdout, "{cell}")?;
            }
        }
        OutputFormat::Json => write_json(printer, &encoded)?,
    }
    Ok(status)
}
