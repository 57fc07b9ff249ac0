//! Error reporting with source diagnostics.
//!
//! Uses ariadne for pretty-printed rule file errors with source context.

use ariadne::{ColorGenerator, Config, Label, Report, ReportKind, Source};
use bankledger_core::Summary;
use bankledger_rules::RuleFileError;
use std::io::Write;
use std::path::Path;

/// Report a rule file error to the given writer.
pub fn report_rule_file_error<W: Write>(
    error: &RuleFileError,
    source_path: &Path,
    source: &str,
    color: bool,
    writer: &mut W,
) -> std::io::Result<()> {
    let path_str = source_path.display().to_string();
    let mut colors = ColorGenerator::new();
    let range = error.span.into_range();

    let mut builder = Report::build(ReportKind::Error, (path_str.as_str(), range.clone()))
        .with_code(format!("R{:04}", error.code()))
        .with_message(error.message())
        .with_label(
            Label::new((path_str.as_str(), range))
                .with_message(error.label())
                .with_color(colors.next()),
        )
        .with_config(Config::default().with_compact(false).with_color(color));
    if let Some(hint) = &error.hint {
        builder = builder.with_help(hint);
    }

    builder
        .finish()
        .write((path_str.as_str(), Source::from(source)), &mut *writer)
}

/// Print the end-of-run counts.
pub fn print_summary<W: Write>(
    summary: &Summary,
    skipped: usize,
    writer: &mut W,
) -> std::io::Result<()> {
    let row_text = if skipped == 1 { "row" } else { "rows" };
    writeln!(
        writer,
        "{} matched ({} posted, {} ignored), {} unmatched, {skipped} {row_text} skipped",
        summary.matched(),
        summary.posted,
        summary.ignored,
        summary.unmatched,
    )
}
