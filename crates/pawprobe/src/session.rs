//! Scoped browser sessions.
//!
//! [`scoped`] hands a driver to a scenario body and quits it exactly once
//! afterwards, whether the body returned, failed or panicked. A panic is
//! turned into [`ProbeError::ScenarioPanicked`] so the runner can keep going
//! with the next scenario.

use crate::driver::ProbeDriver;
use crate::result::{ProbeError, ProbeResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// Driver plus a record of whether it has been released
#[derive(Debug)]
pub struct Session<D: ProbeDriver> {
    driver: D,
    released: bool,
}

impl<D: ProbeDriver> Session<D> {
    /// Take ownership of a freshly launched driver
    #[must_use]
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            released: false,
        }
    }

    /// Driver access
    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Whether `release` has run
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }

    /// Quit the driver. Later calls do nothing.
    pub async fn release(&mut self) -> ProbeResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.driver.quit().await
    }
}

impl<D: ProbeDriver> Drop for Session<D> {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!("browser session dropped without being released");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Run `body` with the driver, then quit it.
///
/// The body's result is returned. A failing `quit` is logged and does not
/// override it. Anything the body needs besides the driver must be moved
/// into the closure.
///
/// ```ignore
/// let title = scoped(driver, |d| Box::pin(async move {
///     d.navigate("http://localhost:3000/").await?;
///     d.title().await
/// }))
/// .await?;
/// ```
pub async fn scoped<D, T, F>(driver: D, body: F) -> ProbeResult<T>
where
    D: ProbeDriver,
    F: for<'s> FnOnce(&'s mut D) -> BoxFuture<'s, ProbeResult<T>>,
{
    let mut session = Session::new(driver);
    let driver = session.driver();
    let outcome = AssertUnwindSafe(async move { body(driver).await })
        .catch_unwind()
        .await;
    let result = outcome.unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(%message, "scenario body panicked");
        Err(ProbeError::ScenarioPanicked { message })
    });
    if let Err(e) = session.release().await {
        tracing::warn!(error = %e, "failed to quit browser session");
    }
    result
}
