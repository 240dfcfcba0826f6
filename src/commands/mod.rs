use std::fs;
use std::path::Path;

use clap::ValueEnum;

use aether_sweep::{log_status, Error, SweepReport};

use crate::output;

pub mod last;
pub mod sweep;

pub type CmdResult<T> = aether_sweep::Result<(T, i32)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    Json,
    #[default]
    Markdown,
}

fn render(report: &SweepReport, format: ReportFormat) -> aether_sweep::Result<String> {
    match format {
        ReportFormat::Json => report.to_json(),
        ReportFormat::Markdown => Ok(report.to_markdown()),
    }
}

/// Write to `output` when given, otherwise print framed to stdout.
fn emit(content: &str, output: Option<&Path>) -> aether_sweep::Result<()> {
    let Some(path) = output else {
        return output::print_framed(content);
    };

    fs::write(path, content).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("write {}", path.display())))
    })?;
    log_status!("sweep", "Report saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn json_render_is_the_structured_form() {
        let mut report = SweepReport::new();
        report.add_warning("Stripe not configured");

        let rendered = render(&report, ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, report.to_value().unwrap());
    }

    #[test]
    fn emit_writes_requested_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");

        emit("# AI Agent Sweep Report\n", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# AI Agent Sweep Report\n");
    }
}
