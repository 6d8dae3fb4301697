use std::fmt::Write;
use std::ops::Bound;
use std::str::FromStr;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, instrument};
use version_ranges::Ranges;

use verint_codec::{PackedVersion, VersionSpecifiers};

use crate::cli::OutputFormat;
use crate::commands::{Cell, ExitStatus, write_error, write_json};
use crate::printer::Printer;

#[derive(Serialize)]
struct Interval {
    min: Cell,
    max: Cell,
}

/// Print the inclusive integer intervals that a query for the specifiers has to scan.
#[instrument(skip(printer))]
pub(crate) fn range(
    specifiers: &str,
    signed: bool,
    format: OutputFormat,
    printer: Printer,
) -> anyhow::Result<ExitStatus> {
    let ranges = VersionSpecifiers::from_str(specifiers)
        .map_err(anyhow::Error::from)
        .and_then(|specifiers| {
            specifiers
                .to_ranges()
                .with_context(|| format!("Can't translate `{specifiers}` into packed integers"))
        });
    let ranges = match ranges {
        Ok(ranges) => ranges,
        Err(err) => {
            write_error(printer, err.as_ref())?;
            return Ok(ExitStatus::Failure);
        }
    };

    let intervals: Vec<Interval> = inclusive_bounds(&ranges)
        .into_iter()
        .map(|(min, max)| Interval {
            min: Cell::new(min, signed),
            max: Cell::new(max, signed),
        })
        .collect();
    if intervals.is_empty() {
        debug!("No version matches `{specifiers}`");
    }

    match format {
        OutputFormat::Text => {
            let mut stdout = printer.stdout();
            for Interval { min, max } in &intervals {
                writeln!(stdout, "{min}..={max}")?;
            }
        }
        OutputFormat::Json => write_json(printer, &intervals)?,
    }
    Ok(ExitStatus::Success)
}

/// Turn the segments of a range into closed integer intervals, dropping the ones that contain
/// no integer.
fn inclusive_bounds(ranges: &Ranges<PackedVersion>) -> Vec<(PackedVersion, PackedVersion)> {
    ranges
        .iter()
        .filter_map(|(lower, upper)| {
            let min = match lower {
                Bound::Included(version) => version.as_u64(),
                Bound::Excluded(version) => version.as_u64().checked_add(1)?,
                Bound::Unbounded => u64::MIN,
            };
            let max = match upper {
                Bound::Included(version) => version.as_u64(),
                Bound::Excluded(version) => version.as_u64().checked_sub(1)?,
                Bound::Unbounded => u64::MAX,
            };
            (min <= max).then(|| (PackedVersion::from_u64(min), PackedVersion::from_u64(max)))
        })
        .collect()
}
