//! Pawprobe CLI: run PawFinder end-to-end scenarios
//!
//! Usage:
//!   pawprobe list                      # Show available scenarios
//!   pawprobe run                       # Run every scenario
//!   pawprobe run homepage sign-in      # Run selected scenarios
//!   pawprobe run --base-url http://staging:3000 --headed

use clap::Parser;
use pawprobe_cli::{
    Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, RunArgs, Verbosity,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::List => {
            list_scenarios(&config);
            Ok(true)
        }
        Commands::Run(ref args) => {
            let config = config.with_fail_fast(args.fail_fast);
            run_scenarios(config, args)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity.is_debug())
        .init();
}

fn list_scenarios(config: &CliConfig) {
    let use_color = config.color.should_color();
    for (name, description) in pawprobe::scenarios::listing() {
        if use_color {
            println!("{:<15} {}", console::style(name).bold(), description);
        } else {
            println!("{name:<15} {description}");
        }
    }
}

#[cfg(feature = "browser")]
fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<bool> {
    use pawprobe::{ChromiumDriver, ChromiumFactory};
    use pawprobe_cli::ScenarioRunner;

    // Reject unknown names before touching the browser
    let scenarios = pawprobe::scenarios::select::<ChromiumDriver>(&args.scenarios)?;
    let probe = args.overrides().resolve()?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::run(format!("Failed to create runtime: {e}")))?;

    let mut runner = ScenarioRunner::new(ChromiumFactory::new(probe.clone()), probe, config);
    let summary = rt.block_on(runner.run(scenarios));
    Ok(summary.succeeded())
}

#[cfg(not(feature = "browser"))]
fn run_scenarios(_config: CliConfig, args: &RunArgs) -> CliResult<bool> {
    pawprobe::scenarios::select::<pawprobe::MockDriver>(&args.scenarios)?;
    args.overrides().resolve()?;
    Err(CliError::config(
        "pawprobe was built without the `browser` feature; rebuild with --features browser",
    ))
}
