use std::fmt::Write;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use verint_codec::{PackedVersion, ParseError, VersionKey};

use crate::cli::OutputFormat;
use crate::commands::{ExitStatus, write_json};
use crate::printer::Printer;

/// What happened to the versions of a list.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
struct Summary {
    total: usize,
    valid: usize,
    invalid: usize,
    local: usize,
    overflow: usize,
    mismatches: usize,
    ordering_violations: usize,
}

impl Summary {
    fn is_consistent(&self) -> bool {
        self.mismatches == 0 && self.ordering_violations == 0
    }
}

/// Encode every version of a list and verify that each valid one survives the round trip and
/// sorts against its predecessor the same way as a packed integer.
#[instrument(skip(printer))]
pub(crate) fn check(
    file: Option<&Path>,
    format: OutputFormat,
    printer: Printer,
) -> anyhow::Result<ExitStatus> {
    let content = match file {
        Some(path) if path != Path::new("-") => fs_err::read_to_string(path)?,
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read versions from stdin")?;
            content
        }
    };

    let summary = summarize(&content, printer)?;

    match format {
        OutputFormat::Text => {
            let mut stdout = printer.stdout();
            writeln!(
                stdout,
                "Checked {} versions: {} valid, {} invalid, {} with a local version label, {} out of range",
                summary.total, summary.valid, summary.invalid, summary.local, summary.overflow
            )?;
            writeln!(
                stdout,
                "Round-trip mismatches: {}, ordering violations: {}",
                summary.mismatches, summary.ordering_violations
            )?;
        }
        OutputFormat::Json => write_json(printer, &summary)?,
    }

    if summary.is_consistent() {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}

fn summarize(content: &str, printer: Printer) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();
    let mut previous: Option<(VersionKey, PackedVersion)> = None;

    let versions = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));
    for version in versions {
        summary.total += 1;
        let key = match VersionKey::from_str(version) {
            Ok(key) => key,
            Err(ParseError::Syntax(err)) => {
                debug!("{err}");
                summary.invalid += 1;
                continue;
            }
            Err(ParseError::LocalVersion(err)) => {
                debug!("{err}");
                summary.local += 1;
                continue;
            }
        };
        let packed = match PackedVersion::pack(&key) {
            Ok(packed) => packed,
            Err(err) => {
                debug!("Can't encode `{version}`: {err}");
                summary.overflow += 1;
                continue;
            }
        };
        summary.valid += 1;

        let canonical = key.canonicalize().to_string();
        match packed.unpack() {
            Ok(decoded) if decoded.to_string() == canonical => {}
            Ok(decoded) => {
                summary.mismatches += 1;
                writeln!(
                    printer.stderr(),
                    "{}: `{version}` decodes to `{decoded}` instead of `{canonical}`",
                    "warning".yellow().bold()
                )?;
            }
            Err(err) => {
                summary.mismatches += 1;
                writeln!(
                    printer.stderr(),
                    "{}: `{version}` doesn't decode: {err}",
                    "warning".yellow().bold()
                )?;
            }
        }

        if let Some((previous_key, previous_packed)) = &previous {
            if previous_key.cmp(&key) != previous_packed.cmp(&packed) {
                summary.ordering_violations += 1;
                writeln!(
                    printer.stderr(),
                    "{}: `{previous_key}` and `{version}` sort differently once packed",
                    "warning".yellow().bold()
                )?;
            }
        }
        previous = Some((key, packed));
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::{Summary, summarize};
    use crate::printer::Printer;

    #[test]
    fn counts() {
        let content = indoc! {"
            # A comment
            1.0
            2.0rc1

            not-a-version
            1.0+local
            4096.0
            1.0.0.0.1
            0.9.post3.dev1
        "};
        let summary = summarize(content, Printer::Quiet).unwrap();
        assert_eq!(
            summary,
            Summary {
                total: 7,
                valid: 3,
                invalid: 1,
                local: 1,
                overflow: 2,
                mismatches: 0,
                ordering_violations: 0,
            }
        );
        assert!(summary.is_consistent());
    }

    #[test]
    fn empty() {
        assert_eq!(summarize("\n\n", Printer::Quiet).unwrap(), Summary::default());
    }
}
