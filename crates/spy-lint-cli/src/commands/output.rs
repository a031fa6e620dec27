//! Shared output formatting for lint results.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use miette::{GraphicalReportHandler, GraphicalTheme};
use spy_lint_core::{DiagnosticReport, LintResult};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(result, &GraphicalReportHandler::new())?,
        OutputFormat::Json => render_json(result)?,
        OutputFormat::Compact => render_compact(result),
    };
    print!("{rendered}");
    Ok(())
}

/// Renders every diagnostic as a miette report, followed by a summary line.
fn render_text(result: &LintResult, handler: &GraphicalReportHandler) -> Result<String> {
    let mut out = String::new();
    for diagnostic in &result.diagnostics {
        handler
            .render_report(&mut out, &DiagnosticReport::from(diagnostic))
            .context("Failed to render diagnostic")?;
        out.push('\n');
    }

    let (errors, warnings, infos) = result.count_by_severity();
    writeln!(
        out,
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
        result.files_checked
    )?;
    Ok(out)
}

fn render_json(result: &LintResult) -> Result<String> {
    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');
    Ok(json)
}

fn render_compact(result: &LintResult) -> String {
    result
        .diagnostics
        .iter()
        .map(|d| format!("{d}\n"))
        .collect()
}
