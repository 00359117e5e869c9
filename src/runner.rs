use std::path::{Path, PathBuf};

use clap::{Args, Command, FromArgMatches as _};
use log::{info, LevelFilter};

use crate::error::SimulationError;
use crate::log::{set_log_level, LogLevelSpec};
use crate::report::write_reports;
use crate::scenario::{Scenario, ScenarioResults};

/// Default cli arguments for the doxysim runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Optional path to a JSON scenario file. The baseline scenario is used otherwise.
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional directory for the series and summary CSV reports
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Enable logging: a level (`info`) and/or module filters (`doxysim::simulator=trace`)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Simulate diseases on separate threads
    #[arg(short, long)]
    pub parallel: bool,
}

fn create_cli() -> Command {
    let cli = Command::new("doxysim")
        .about("Simulates STI prevalence under DoxyPEP with a day-stepped compartmental model");
    BaseArgs::augment_args(cli)
}

/// Runs a scenario configured from the process's command line arguments.
///
/// # Errors
/// Returns an error if argument parsing, scenario loading, simulation or report writing fails
pub fn run_with_args() -> Result<ScenarioResults, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_base_args(&args)?)
}

fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_logging(args: &BaseArgs) -> Result<(), SimulationError> {
    if args.verbose > 0 {
        set_log_level(verbosity_level(args.verbose))?;
    }
    if let Some(spec) = &args.log_level {
        spec.parse::<LogLevelSpec>()?.apply()?;
    }
    Ok(())
}

/// Runs a scenario with already parsed arguments.
///
/// # Errors
/// Returns an error if the log level is malformed, or if scenario loading, simulation or report
/// writing fails
pub fn run_with_base_args(args: &BaseArgs) -> Result<ScenarioResults, SimulationError> {
    configure_logging(args)?;

    let scenario = if args.config.is_empty() {
        Scenario::baseline()
    } else {
        info!("Loading scenario from: {}", args.config);
        Scenario::from_json_file(Path::new(&args.config))?
    };

    let results = if args.parallel {
        scenario.run_parallel()?
    } else {
        scenario.run()?
    };

    if !args.output_dir.is_empty() {
        write_reports(&PathBuf::from(&args.output_dir), &results)?;
    }
    Ok(results)
}
