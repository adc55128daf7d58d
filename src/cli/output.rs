//! Handles all user-facing output for the CLI.
//!
//! Tables go through `termcolor` so outcome labels can be colored; JSON output is
//! one object per line. Everything writes into a caller-supplied sink so the same
//! code serves stdout and in-memory buffers.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::CliError;
use crate::harness::TestOutcomeMatrix;
use crate::matrix::EnumerateOptions;

// ============================================================================
// SINKS
// ============================================================================

/// Stdout, colored only when the resolved config asks for it.
pub fn stdout(use_colors: bool) -> StandardStream {
    let choice = if use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

// ============================================================================
// TABLES
// ============================================================================

const OUTCOME_PALETTE: [Color; 6] = [
    Color::Green,
    Color::Red,
    Color::Yellow,
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
];

/// Writes the header row and one row per visited combination, the resolved
/// outcome in a trailing column. Returns the number of rows written.
pub fn write_table<W: WriteColor>(
    out: &mut W,
    matrix: &TestOutcomeMatrix<String>,
    options: &EnumerateOptions<String>,
) -> Result<usize, CliError> {
    let separator = matrix.config().separator.as_str();

    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(
        out,
        "{}{}{}",
        matrix.header_row(),
        separator,
        matrix.config().header_test_name
    )?;
    out.reset()?;
    writeln!(out)?;

    let mut rows = 0usize;
    matrix
        .matrix()
        .try_for_each(options, |combination, outcome| {
            write!(out, "{}{}", matrix.row_name(combination), separator)?;
            out.set_color(ColorSpec::new().set_fg(Some(outcome_color(matrix, outcome))))?;
            write!(out, "{outcome}")?;
            out.reset()?;
            writeln!(out)?;
            rows += 1;
            Ok::<(), CliError>(())
        })?;
    Ok(rows)
}

fn outcome_color(matrix: &TestOutcomeMatrix<String>, outcome: &String) -> Color {
    let position = matrix
        .matrix()
        .outcomes()
        .iter()
        .position(|declared| declared == outcome)
        .unwrap_or(0);
    OUTCOME_PALETTE[position % OUTCOME_PALETTE.len()]
}

// ============================================================================
// JSON LINES
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    values: BTreeMap<&'a str, String>,
    outcome: &'a str,
}

/// Writes one JSON object per visited combination. Returns the number written.
pub fn write_json_rows<W: Write>(
    out: &mut W,
    matrix: &TestOutcomeMatrix<String>,
    options: &EnumerateOptions<String>,
) -> Result<usize, CliError> {
    let mut rows = 0usize;
    matrix
        .matrix()
        .try_for_each(options, |combination, outcome| {
            let row = JsonRow {
                values: combination.keys().zip(combination.labels()).collect(),
                outcome,
            };
            serde_json::to_writer(&mut *out, &row).map_err(io::Error::from)?;
            writeln!(out)?;
            rows += 1;
            Ok::<(), CliError>(())
        })?;
    Ok(rows)
}

// ============================================================================
// CHECK REPORTING
// ============================================================================

pub fn write_check_ok<W: WriteColor>(out: &mut W, path: &Path, combinations: usize) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(out, "ok")?;
    out.reset()?;
    writeln!(out, "   {} ({} combinations)", path.display(), combinations)
}

pub fn write_check_failed<W: WriteColor>(out: &mut W, path: &Path) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "FAIL")?;
    out.reset()?;
    writeln!(out, " {}", path.display())
}

pub fn write_check_summary<W: WriteColor>(out: &mut W, checked: usize, failed: usize) -> io::Result<()> {
    let color = if failed == 0 { Color::Green } else { Color::Red };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{checked} manifest(s) checked, {failed} failed")?;
    out.reset()?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartialRenderConfig;
    use crate::manifest::Manifest;
    use crate::matrix::Order;
    use termcolor::Buffer;

    const SOURCE: &str = r#"
dimensions:
  - key: string
    header: String
    values: [a, b]
  - key: number
    header: Number
    values: [1, 2]
outcomes: [outcome1, outcome2]
default: outcome1
rules:
  - when: { string: a, number: 1 }
    outcome: outcome2
"#;

    fn matrix() -> TestOutcomeMatrix<String> {
        Manifest::parse(SOURCE)
            .unwrap()
            .build(PartialRenderConfig::default())
            .unwrap()
    }

    #[test]
    fn table_has_header_and_outcome_column() {
        let matrix = matrix();
        let options = EnumerateOptions::new().order(Order::Dimensions);
        let mut buffer = Buffer::no_color();
        let rows = write_table(&mut buffer, &matrix, &options).unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();
        assert_eq!(rows, 4);
        assert_eq!(
            text,
            "String | Number | Outcome\n\
             a      | 1      | outcome2\n\
             a      | 2      | outcome1\n\
             b      | 1      | outcome1\n\
             b      | 2      | outcome1\n"
        );
    }

    #[test]
    fn json_rows_carry_values_and_outcome() {
        let matrix = matrix();
        let options = EnumerateOptions::new().only(|_, outcome: &String| outcome == "outcome2");
        let mut buffer = Vec::new();
        assert_eq!(write_json_rows(&mut buffer, &matrix, &options).unwrap(), 1);
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "{\"values\":{\"number\":\"1\",\"string\":\"a\"},\"outcome\":\"outcome2\"}\n"
        );
    }
}
