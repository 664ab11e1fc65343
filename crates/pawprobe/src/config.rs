//! Run configuration.
//!
//! Layers, lowest to highest priority: built-in defaults, an optional YAML
//! file, environment variables, then whatever the CLI sets explicitly.
//!
//! ```yaml
//! base_url: http://staging.pawfinder.local
//! headless: false
//! timing:
//!   settle_ms: 3000
//! sign_in:
//!   email: qa@pawfinder.com
//!   password: hunter2
//! ```

use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "PAWPROBE_BASE_URL";

/// Environment variable overriding headless mode
pub const ENV_HEADLESS: &str = "PAWPROBE_HEADLESS";

/// Environment variable pointing at a Chromium binary
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Waits and pauses, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Bounded wait timeout
    pub wait_timeout_ms: u64,
    /// Bounded wait polling interval
    pub poll_interval_ms: u64,
    /// Pause after an action before inspecting the page
    pub settle_ms: u64,
    /// Shorter pause between small interactions
    pub short_settle_ms: u64,
    /// Upper bound for a page to reach ready state
    pub page_load_timeout_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 10_000,
            poll_interval_ms: 250,
            settle_ms: 2_000,
            short_settle_ms: 1_000,
            page_load_timeout_ms: 15_000,
        }
    }
}

impl Timing {
    /// Settle pause
    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Short settle pause
    #[must_use]
    pub const fn short_settle(&self) -> Duration {
        Duration::from_millis(self.short_settle_ms)
    }

    /// Options for bounded waits
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.wait_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Options for waiting on a page load
    #[must_use]
    pub fn page_load_options(&self) -> WaitOptions {
        self.wait_options().with_timeout(self.page_load_timeout_ms)
    }
}

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Values typed into the adoption form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Applicant {
    /// Applicant name
    pub name: String,
    /// Applicant email
    pub email: String,
    /// Applicant phone
    pub phone: String,
}

impl Default for Applicant {
    fn default() -> Self {
        Self {
            name: "Hasib".to_string(),
            email: "hasib@gmail.com".to_string(),
            phone: "0123456789".to_string(),
        }
    }
}

/// Full run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Application root, without trailing slash
    pub base_url: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Enable the Chromium sandbox
    pub sandbox: bool,
    /// Explicit Chromium binary
    pub chromium_path: Option<PathBuf>,
    /// Initial window width
    pub window_width: u32,
    /// Initial window height
    pub window_height: u32,
    /// Waits and pauses
    pub timing: Timing,
    /// Account used by the sign-in scenario
    pub sign_in: Credentials,
    /// Account used by the marketplace scenario
    pub marketplace: Credentials,
    /// Pet shown by the details scenario
    pub details_pet_id: u32,
    /// Pet whose adoption form is submitted
    pub adoption_pet_id: u32,
    /// Adoption form values
    pub applicant: Applicant,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            sandbox: false,
            chromium_path: None,
            window_width: 1920,
            window_height: 1080,
            timing: Timing::default(),
            sign_in: Credentials::new("testuser@pawfinder.com", "TestPassword123"),
            marketplace: Credentials::new("testuser@example.com", "password123"),
            details_pet_id: 5,
            adoption_pet_id: 6,
            applicant: Applicant::default(),
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> ProbeResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ProbeError::Config {
            message: format!("{name} must be a boolean, got {other:?}"),
        }),
    }
}

impl ProbeConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML; missing keys keep their defaults
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validated()
    }

    /// Load a YAML file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> ProbeResult<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> ProbeResult<Self> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_HEADLESS) {
            self.headless = parse_flag(ENV_HEADLESS, &raw)?;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH) {
            self.chromium_path = Some(PathBuf::from(path));
        }
        self.validated()
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set timing
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Check invariants and normalise the base URL
    pub fn validated(mut self) -> ProbeResult<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ProbeError::Config {
                message: format!("base_url must be an http(s) URL, got {:?}", self.base_url),
            });
        }
        self.base_url = trimmed.to_string();
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ProbeError::Config {
                message: "window size must be non-zero".to_string(),
            });
        }
        Ok(self)
    }

    /// Absolute URL of an application route
    #[must_use]
    pub fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.headless);
        assert_eq!(config.sign_in.email, "testuser@pawfinder.com");
        assert_eq!(config.timing.settle(), Duration::from_secs(2));
    }

    #[test]
    fn test_url_joining() {
        let config = ProbeConfig::default();
        assert_eq!(config.url("/sign-in"), "http://localhost:3000/sign-in");
        assert_eq!(config.url("pets/5"), "http://localhost:3000/pets/5");
        assert_eq!(config.url(""), "http://localhost:3000/");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ProbeConfig::from_yaml(
            "base_url: http://staging.local/\ntiming:\n  settle_ms: 500\n",
        )
        .unwrap();
        assert_eq!(config.base_url, "http://staging.local");
        assert_eq!(config.timing.settle_ms, 500);
        assert_eq!(config.timing.wait_timeout_ms, 10_000);
        assert_eq!(config.adoption_pet_id, 6);
    }

    #[test]
    fn test_invalid_yaml_is_yaml_error() {
        let err = ProbeConfig::from_yaml("headless: [").unwrap_err();
        assert!(matches!(err, ProbeError::Yaml(_)));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = ProbeConfig::from_yaml("base_url: localhost:3000").unwrap_err();
        assert!(matches!(err, ProbeError::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://pawfinder.example"),
            (ENV_HEADLESS, "false"),
            (ENV_CHROMIUM_PATH, "/opt/chromium"),
        ]
        .into_iter()
        .collect();
        let config = ProbeConfig::default()
            .with_env_from(|k| env.get(k).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.base_url, "https://pawfinder.example");
        assert!(!config.headless);
        assert_eq!(config.chromium_path, Some(PathBuf::from("/opt/chromium")));
    }

    #[test]
    fn test_env_bad_flag() {
        let err = ProbeConfig::default()
            .with_env_from(|k| (k == ENV_HEADLESS).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_HEADLESS));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "headless: false\ndetails_pet_id: 9").unwrap();
        let config = ProbeConfig::load(file.path()).unwrap();
        assert!(!config.headless);
        assert_eq!(config.details_pet_id, 9);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ProbeConfig::load(Path::new("/nonexistent/pawprobe.yaml")).unwrap_err();
        assert!(matches!(err, ProbeError::Io(_)));
    }
}
