use clap::{Parser, Subcommand};

mod commands;
mod output;

use aether_sweep::{Error, SweepConfig};
use commands::{last, sweep, CmdResult};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "aether-sweep")]
#[command(version = VERSION)]
#[command(about = "Deployment health sweep with optional auto-fix")]
struct Cli {
    #[command(flatten)]
    sweep: sweep::SweepArgs,

    /// Print per-probe diagnostics to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the most recently persisted sweep report
    Last(last::LastArgs),
}

fn run(cli: &Cli) -> CmdResult<()> {
    let work_dir = std::env::current_dir().map_err(|e| {
        Error::internal_io(e.to_string(), Some("resolve working directory".to_string()))
    })?;
    let config = SweepConfig::load(work_dir)?;

    match &cli.command {
        Some(Commands::Last(args)) => last::run(args, &config),
        None => sweep::run(&cli.sweep, &config),
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    aether_sweep::set_verbose(cli.verbose);

    let exit_code = match run(&cli) {
        Ok(((), exit_code)) => exit_code,
        Err(err) => {
            output::print_error(&err);
            output::exit_code_for_error(&err)
        }
    };

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code > 255 {
        255
    } else {
        code as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sweep_flags_parse() {
        let cli = Cli::try_parse_from([
            "aether-sweep",
            "--auto-fix",
            "--format",
            "json",
            "--output",
            "report.json",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.sweep.auto_fix);
        assert_eq!(cli.sweep.format, commands::ReportFormat::Json);
        assert_eq!(cli.sweep.output.as_deref(), Some(std::path::Path::new("report.json")));
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn defaults_are_markdown_to_stdout() {
        let cli = Cli::try_parse_from(["aether-sweep"]).unwrap();
        assert!(!cli.sweep.auto_fix);
        assert_eq!(cli.sweep.format, commands::ReportFormat::Markdown);
        assert!(cli.sweep.output.is_none());
    }

    #[test]
    fn last_subcommand_has_its_own_format() {
        let cli = Cli::try_parse_from(["aether-sweep", "last", "--format", "markdown"]).unwrap();
        match cli.command {
            Some(Commands::Last(args)) => assert_eq!(args.format, commands::ReportFormat::Markdown),
            None => panic!("expected last subcommand"),
        }
    }
}
