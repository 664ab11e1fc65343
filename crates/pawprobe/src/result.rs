//! Result and error types for pawprobe.

use thiserror::Error;

/// Result type for pawprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a browser session
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A locator query could not be evaluated (bad selector, DOM exception)
    #[error("Query {locator} failed: {message}")]
    Query {
        /// Locator as written
        locator: String,
        /// Error message
        message: String,
    },

    /// An interaction with an element failed (obstructed, detached, ...)
    #[error("{action} failed: {message}")]
    Action {
        /// Interaction name
        action: String,
        /// Error message
        message: String,
    },

    /// Element handle no longer refers to the current document
    #[error("Stale element handle {id}")]
    StaleElement {
        /// Handle id
        id: String,
    },

    /// Bounded wait elapsed before the condition held
    #[error("Timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Condition description
        condition: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario body panicked; the session was still released
    #[error("Scenario panicked: {message}")]
    ScenarioPanicked {
        /// Panic payload, when it was a string
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create an action error
    #[must_use]
    pub fn action(action: impl Into<String>, message: impl ToString) -> Self {
        Self::Action {
            action: action.into(),
            message: message.to_string(),
        }
    }

    /// Create a query error
    #[must_use]
    pub fn query(locator: impl ToString, message: impl ToString) -> Self {
        Self::Query {
            locator: locator.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a script error
    #[must_use]
    pub fn script(message: impl ToString) -> Self {
        Self::Script {
            message: message.to_string(),
        }
    }

    /// Whether this error came from a bounded wait running out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinguishable() {
        let err = ProbeError::Timeout {
            ms: 500,
            condition: "url contains /sign-in".to_string(),
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("500ms"));
        assert!(!ProbeError::action("click", "obstructed").is_timeout());
    }

    #[test]
    fn test_action_error_message() {
        let err = ProbeError::action("click", "element is obstructed");
        assert_eq!(err.to_string(), "click failed: element is obstructed");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ProbeError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
