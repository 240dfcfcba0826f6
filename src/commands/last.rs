use std::path::PathBuf;

use clap::Args;

use aether_sweep::{store, SweepConfig};

use super::{emit, render, CmdResult, ReportFormat};

#[derive(Args, Debug)]
pub struct LastArgs {
    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Re-render the persisted report. Fails with `report.not_found` before the
/// first sweep.
pub fn run(args: &LastArgs, config: &SweepConfig) -> CmdResult<()> {
    let report = store::load(&config.report_path())?;
    let content = render(&report, args.format)?;
    emit(&content, args.output.as_deref())?;
    Ok(((), 0))
}
