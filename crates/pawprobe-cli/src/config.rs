//! CLI configuration

use crate::error::CliResult;
use pawprobe::ProbeConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - failures only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - check narration
    Verbose,
    /// Debug - resolver attempts
    Debug,
}

impl Verbosity {
    /// Map `-q` and the `-v` count to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Check if debug mode
    #[must_use]
    pub const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }

    /// Log filter used when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "pawprobe=info,warn",
            Self::Debug => "pawprobe=debug,info",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Stop after the first failed scenario
    pub fail_fast: bool,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set fail fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Command-line overrides for the probe configuration.
///
/// Layers apply in order: YAML file, environment, then these flags.
#[derive(Debug, Clone, Default)]
pub struct ProbeOverrides {
    /// YAML configuration file
    pub config_file: Option<PathBuf>,
    /// Application base URL
    pub base_url: Option<String>,
    /// Show the browser window
    pub headed: bool,
    /// Chromium executable
    pub chromium: Option<PathBuf>,
}

impl ProbeOverrides {
    /// Build the probe configuration from the process environment
    pub fn resolve(&self) -> CliResult<ProbeConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Build the probe configuration with an explicit environment lookup
    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> CliResult<ProbeConfig> {
        let mut config = match &self.config_file {
            Some(path) => ProbeConfig::load(path)?,
            None => ProbeConfig::default(),
        };
        config = config.with_env_from(env)?;
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        if self.headed {
            config = config.with_headless(false);
        }
        if let Some(path) = &self.chromium {
            config.chromium_path = Some(path.clone());
        }
        Ok(config.validated()?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_default_verbosity() {
            assert_eq!(Verbosity::default(), Verbosity::Normal);
        }

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 4), Verbosity::Debug);
        }

        #[test]
        fn test_levels() {
            assert!(Verbosity::Quiet.is_quiet());
            assert!(!Verbosity::Normal.is_verbose());
            assert!(Verbosity::Debug.is_verbose());
            assert!(Verbosity::Debug.is_debug());
            assert!(!Verbosity::Verbose.is_debug());
        }

        #[test]
        fn test_log_filter_widens_with_verbosity() {
            assert_eq!(Verbosity::Quiet.log_filter(), "error");
            assert!(Verbosity::Debug.log_filter().contains("pawprobe=debug"));
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_explicit_choices() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
        }
    }

    mod cli_config_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let config = CliConfig::new()
                .with_verbosity(Verbosity::Verbose)
                .with_color(ColorChoice::Never)
                .with_fail_fast(true);
            assert_eq!(config.verbosity, Verbosity::Verbose);
            assert_eq!(config.color, ColorChoice::Never);
            assert!(config.fail_fast);
        }
    }

    mod override_tests {
        use super::*;
        use std::io::Write;

        fn no_env(_: &str) -> Option<String> {
            None
        }

        #[test]
        fn test_defaults_without_file() {
            let config = ProbeOverrides::default().resolve_with(no_env).unwrap();
            assert_eq!(config.base_url, pawprobe::config::DEFAULT_BASE_URL);
            assert!(config.headless);
        }

        #[test]
        fn test_flags_beat_env_and_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: http://from-file:1\nheadless: true").unwrap();

            let overrides = ProbeOverrides {
                config_file: Some(file.path().to_path_buf()),
                base_url: Some("http://from-flag:3".to_string()),
                headed: true,
                chromium: Some(PathBuf::from("/opt/chromium")),
            };
            let config = overrides
                .resolve_with(|key| {
                    (key == pawprobe::config::ENV_BASE_URL).then(|| "http://from-env:2".to_string())
                })
                .unwrap();

            assert_eq!(config.base_url, "http://from-flag:3");
            assert!(!config.headless);
            assert_eq!(config.chromium_path, Some(PathBuf::from("/opt/chromium")));
        }

        #[test]
        fn test_env_beats_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: http://from-file:1").unwrap();

            let overrides = ProbeOverrides {
                config_file: Some(file.path().to_path_buf()),
                ..ProbeOverrides::default()
            };
            let config = overrides
                .resolve_with(|key| {
                    (key == pawprobe::config::ENV_BASE_URL).then(|| "http://from-env:2".to_string())
                })
                .unwrap();

            assert_eq!(config.base_url, "http://from-env:2");
        }

        #[test]
        fn test_missing_file_is_an_error() {
            let overrides = ProbeOverrides {
                config_file: Some(PathBuf::from("/nonexistent/pawprobe.yaml")),
                ..ProbeOverrides::default()
            };
            assert!(overrides.resolve_with(no_env).is_err());
        }
    }
}
