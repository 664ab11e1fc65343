//! Browser driver capability interface.
//!
//! Everything above this module (resolver, verification, waits, scenarios)
//! talks to the browser only through [`ProbeDriver`], so the same scenario
//! code runs against Chromium over CDP or against the scripted
//! [`MockDriver`](crate::MockDriver) in unit tests.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  ProbeDriver (async trait)                                 │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────┐    │
//! │  │  ChromiumDriver     │        │  MockDriver         │    │
//! │  │  (feature=browser)  │        │  (scripted pages)   │    │
//! │  └─────────────────────┘        └─────────────────────┘    │
//! └────────────────────────────────────────────────────────────┘
//! ```

use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::wait::{Condition, WaitOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Live handle to an element in the current document.
///
/// Valid until the next navigation; using it afterwards yields
/// [`ProbeError::StaleElement`](crate::ProbeError::StaleElement).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier
    pub id: String,
    /// Lowercase tag name
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into().to_ascii_lowercase(),
        }
    }

    /// Check the tag name, case-insensitively
    #[must_use]
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.tag_name, self.id)
    }
}

/// Abstract driver trait for browser automation
#[async_trait]
pub trait ProbeDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Go back in history
    async fn back(&mut self) -> ProbeResult<()>;

    /// Reload page
    async fn refresh(&mut self) -> ProbeResult<()>;

    /// Resize the viewport
    async fn set_window_size(&mut self, width: u32, height: u32) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Get document title
    async fn title(&self) -> ProbeResult<String>;

    /// Get the full rendered markup
    async fn page_source(&self) -> ProbeResult<String>;

    /// Get `document.readyState`
    async fn ready_state(&self) -> ProbeResult<String>;

    /// All elements matching a selector, in document order
    async fn find(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>>;

    /// Elements matching a selector inside `parent`, in document order
    async fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbeResult<Vec<ElementHandle>>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Click element via a script-dispatched click (ignores overlays)
    async fn js_click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type text into element
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Press Enter with element focused
    async fn press_enter(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Clear an input's value
    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether the element is enabled
    async fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether a checkbox/radio/option is selected
    async fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Read an attribute
    async fn get_attribute(&self, element: &ElementHandle, name: &str)
        -> ProbeResult<Option<String>>;

    /// Visible text of the element
    async fn text(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Rendered height in CSS pixels
    async fn height(&self, element: &ElementHandle) -> ProbeResult<f64>;

    /// Number of options of a `<select>`
    async fn option_count(&self, element: &ElementHandle) -> ProbeResult<usize>;

    /// Select the option at `index` of a `<select>`
    async fn select_index(&self, element: &ElementHandle, index: usize) -> ProbeResult<()>;

    /// Close the browser session
    async fn quit(&mut self) -> ProbeResult<()>;

    /// Block until `condition` holds or `timeout` elapses.
    ///
    /// Returns the element for element conditions, `None` otherwise.
    async fn wait_until(
        &self,
        condition: &Condition,
        timeout: Duration,
    ) -> ProbeResult<Option<ElementHandle>> {
        let options = WaitOptions::new().with_timeout(timeout.as_millis() as u64);
        crate::wait::wait_for(self, condition, &options).await
    }
}

/// Launches fresh driver sessions, one per scenario
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Driver type produced
    type Driver: ProbeDriver;

    /// Start a new session
    async fn launch(&self) -> ProbeResult<Self::Driver>;
}
