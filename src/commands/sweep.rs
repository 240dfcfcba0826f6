use std::path::PathBuf;

use clap::Args;

use aether_sweep::{log_status, log_verbose, store, SweepAgent, SweepConfig};

use super::{emit, render, CmdResult, ReportFormat};

#[derive(Args, Debug, Default)]
pub struct SweepArgs {
    /// Attempt fixes for auto-fixable errors
    #[arg(long)]
    pub auto_fix: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Exit code 0 when the finished report has no errors, 1 otherwise.
pub fn run(args: &SweepArgs, config: &SweepConfig) -> CmdResult<()> {
    let agent = SweepAgent::new(config, args.auto_fix)?;
    let report = agent.run_full_sweep();

    // Persistence feeds `last`; failing it must not change the sweep outcome.
    let report_path = config.report_path();
    match store::save(&report, &report_path) {
        Ok(()) => log_verbose!("sweep", "Persisted report to {}", report_path.display()),
        Err(err) => log_status!(
            "sweep",
            "Could not persist report to {}: {}",
            report_path.display(),
            err.message
        ),
    }

    let content = render(&report, args.format)?;
    emit(&content, args.output.as_deref())?;

    let exit_code = if report.has_errors() { 1 } else { 0 };
    Ok(((), exit_code))
}
