//! CLI command definitions using clap

use crate::config::{ColorChoice, ProbeOverrides};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pawprobe: adaptive end-to-end browser checks for PawFinder
#[derive(Parser, Debug)]
#[command(name = "pawprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available scenarios
    List,

    /// Run scenarios against a PawFinder instance
    Run(RunArgs),
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Scenarios to run (all when omitted)
    #[arg(value_name = "SCENARIO")]
    pub scenarios: Vec<String>,

    /// YAML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Application base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable
    #[arg(long, value_name = "PATH")]
    pub chromium: Option<PathBuf>,

    /// Stop after the first failed scenario
    #[arg(long)]
    pub fail_fast: bool,
}

impl RunArgs {
    /// Probe configuration layers carried by these arguments
    #[must_use]
    pub fn overrides(&self) -> ProbeOverrides {
        ProbeOverrides {
            config_file: self.config.clone(),
            base_url: self.base_url.clone(),
            headed: self.headed,
            chromium: self.chromium.clone(),
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["pawprobe", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_run_with_flags() {
        let cli = Cli::try_parse_from([
            "pawprobe",
            "-vv",
            "run",
            "homepage",
            "sign-in",
            "--base-url",
            "http://staging:8080",
            "--headed",
            "--fail-fast",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.scenarios, vec!["homepage", "sign-in"]);
        let overrides = args.overrides();
        assert_eq!(overrides.base_url.as_deref(), Some("http://staging:8080"));
        assert!(overrides.headed);
        assert!(args.fail_fast);
    }

    #[test]
    fn test_run_without_scenarios_means_all() {
        let cli = Cli::try_parse_from(["pawprobe", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.scenarios.is_empty());
        assert!(!args.fail_fast);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["pawprobe"]).is_err());
    }

    #[test]
    fn test_color_arg_conversion() {
        assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
        assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
    }
}
