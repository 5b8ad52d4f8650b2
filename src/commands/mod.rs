//! Reporting commands of the `pqtool` binary.

use std::io::{self, Write};

use anyhow::Result;
use serde_json::Value;

use crate::OutputFormat;

pub mod catalog;
pub mod describe;
pub mod fields;
pub mod files;
pub mod schema;

/// Something a command prints, as text for people or JSON for tools.
pub trait Report {
    /// Render human-readable output.
    fn render_text(&self, out: &mut dyn Write) -> Result<()>;

    /// Serialize to JSON
    fn to_json(&self) -> Value;

    /// Render to JSON
    fn render_to_json(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", serde_json::to_string(&self.to_json())?)?;
        Ok(())
    }
}

/// Render `report` in `format` to `out`.
pub fn render(report: &dyn Report, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    if format.resolves_to_json() {
        report.render_to_json(out)?;
    } else {
        report.render_text(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Render `report` to stdout.
pub fn print(report: &dyn Report, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(report, format, &mut out)
}
