//! Bounded polling waits.
//!
//! A wait re-checks its [`Condition`] every poll interval until it holds or
//! the timeout elapses. Driver errors raised while polling count as
//! "not yet"; only the elapsed timeout is reported, as
//! [`ProbeError::Timeout`], so callers can tell a slow page apart from a
//! failed action.

use crate::driver::{ElementHandle, ProbeDriver};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Something a wait can block on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// At least one element matches
    Present(Selector),
    /// A matching element is displayed and enabled
    Clickable(Selector),
    /// Current URL contains the substring
    UrlContains(String),
    /// `document.readyState` is `complete`
    DocumentReady,
}

impl Condition {
    /// Element present
    #[must_use]
    pub fn present(selector: impl Into<Selector>) -> Self {
        Self::Present(selector.into())
    }

    /// Element clickable
    #[must_use]
    pub fn clickable(selector: impl Into<Selector>) -> Self {
        Self::Clickable(selector.into())
    }

    /// URL contains
    #[must_use]
    pub fn url_contains(needle: impl Into<String>) -> Self {
        Self::UrlContains(needle.into())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(sel) => write!(f, "presence of {sel}"),
            Self::Clickable(sel) => write!(f, "{sel} to be clickable"),
            Self::UrlContains(needle) => write!(f, "url containing {needle:?}"),
            Self::DocumentReady => f.write_str("document ready"),
        }
    }
}

/// Poll `check` until it yields `Some`, or fail with a timeout.
///
/// A check still running at the deadline is dropped.
pub async fn poll<T, F, Fut>(
    options: &WaitOptions,
    description: &str,
    mut check: F,
) -> ProbeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let timeout = options.timeout();
    let started = Instant::now();
    loop {
        let remaining = timeout.saturating_sub(started.elapsed());
        match tokio::time::timeout(remaining, check()).await {
            Ok(Ok(Some(value))) => return Ok(value),
            Ok(Ok(None)) => {}
            Ok(Err(e)) => tracing::trace!(error = %e, "poll check errored, retrying"),
            Err(_) => tracing::trace!("poll check outlived the wait"),
        }
        let remaining = timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(ProbeError::Timeout {
                ms: options.timeout_ms,
                condition: description.to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval().min(remaining)).await;
    }
}

/// Wait for `condition`.
///
/// Element conditions return the first satisfying element.
pub async fn wait_for<D>(
    driver: &D,
    condition: &Condition,
    options: &WaitOptions,
) -> ProbeResult<Option<ElementHandle>>
where
    D: ProbeDriver + ?Sized,
{
    let description = condition.to_string();
    tracing::debug!(condition = %description, timeout_ms = options.timeout_ms, "waiting");
    match condition {
        Condition::Present(selector) => {
            let found = poll(options, &description, || first_present(driver, selector)).await?;
            Ok(Some(found))
        }
        Condition::Clickable(selector) => {
            let found = poll(options, &description, || first_clickable(driver, selector)).await?;
            Ok(Some(found))
        }
        Condition::UrlContains(needle) => {
            poll(options, &description, || url_contains(driver, needle)).await?;
            Ok(None)
        }
        Condition::DocumentReady => {
            poll(options, &description, || document_ready(driver)).await?;
            Ok(None)
        }
    }
}

async fn first_present<D>(driver: &D, selector: &Selector) -> ProbeResult<Option<ElementHandle>>
where
    D: ProbeDriver + ?Sized,
{
    Ok(driver.find(selector).await?.into_iter().next())
}

async fn first_clickable<D>(driver: &D, selector: &Selector) -> ProbeResult<Option<ElementHandle>>
where
    D: ProbeDriver + ?Sized,
{
    for element in driver.find(selector).await? {
        if driver.is_displayed(&element).await? && driver.is_enabled(&element).await? {
            return Ok(Some(element));
        }
    }
    Ok(None)
}

async fn url_contains<D>(driver: &D, needle: &str) -> ProbeResult<Option<()>>
where
    D: ProbeDriver + ?Sized,
{
    Ok(driver.current_url().await?.contains(needle).then_some(()))
}

async fn document_ready<D>(driver: &D) -> ProbeResult<Option<()>>
where
    D: ProbeDriver + ?Sized,
{
    Ok((driver.ready_state().await? == "complete").then_some(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};

    fn quick() -> WaitOptions {
        WaitOptions::new().with_timeout(60).with_poll_interval(10)
    }

    #[test]
    fn test_wait_options_defaults() {
        let opts = WaitOptions::default();
        assert_eq!(opts.timeout(), Duration::from_secs(10));
        assert_eq!(opts.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_condition_display() {
        assert_eq!(
            Condition::url_contains("/sign-in").to_string(),
            "url containing \"/sign-in\""
        );
        assert_eq!(
            Condition::present("h1").to_string(),
            "presence of css:h1"
        );
    }

    #[tokio::test]
    async fn test_hung_check_is_cut_off_at_timeout() {
        let started = Instant::now();
        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            poll(&quick(), "hung check", || {
                std::future::pending::<ProbeResult<Option<()>>>()
            }),
        )
        .await
        .expect("poll ignored its own timeout");

        match outcome {
            Err(ProbeError::Timeout { ms, condition }) => {
                assert_eq!(ms, 60);
                assert_eq!(condition, "hung check");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_present_returns_element() {
        let mut driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.add(MockElement::new("h", "h1").text("Find a friend"), &["h1"]);
        });
        driver.navigate("http://app/").await.unwrap();

        let found = wait_for(&driver, &Condition::present("h1"), &quick())
            .await
            .unwrap();
        assert_eq!(found.map(|e| e.id), Some("h".to_string()));
    }

    #[tokio::test]
    async fn test_clickable_skips_disabled() {
        let mut driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.add(MockElement::new("a", "button").disabled(), &["button"]);
            p.add(MockElement::new("b", "button"), &["button"]);
        });
        driver.navigate("http://app/").await.unwrap();

        let found = wait_for(&driver, &Condition::clickable("button"), &quick())
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_timeout() {
        let mut driver = MockDriver::new();
        driver.navigate("http://app/").await.unwrap();

        let err = wait_for(&driver, &Condition::url_contains("/sign-in"), &quick())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_query_errors_count_as_not_yet() {
        let mut driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.fail_query("css:h1");
        });
        driver.navigate("http://app/").await.unwrap();

        let err = wait_for(&driver, &Condition::present("h1"), &quick())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_document_ready() {
        let mut driver = MockDriver::new();
        driver.navigate("http://app/").await.unwrap();
        let outcome = wait_for(&driver, &Condition::DocumentReady, &quick())
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_trait_wait_until_uses_timeout() {
        let mut driver = MockDriver::new();
        driver.navigate("http://app/").await.unwrap();
        let err = driver
            .wait_until(&Condition::present(".never"), Duration::from_millis(30))
            .await
            .unwrap_err();
        match err {
            ProbeError::Timeout { ms, .. } => assert_eq!(ms, 30),
            other => panic!("unexpected {other:?}"),
        }
    }
}
