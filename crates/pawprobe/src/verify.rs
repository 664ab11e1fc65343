//! Action verification by before/after snapshots.
//!
//! Capture a [`Snapshot`], run the action, sleep for a settle duration,
//! capture again and compare. A difference means the action visibly did
//! something. No difference is reported as [`Effect::Unclear`], never as
//! proof that nothing happened. If the second capture fails (typically
//! because the element went stale when the page navigated) that counts as
//! a change.

use crate::driver::{ElementHandle, ProbeDriver};
use crate::result::ProbeResult;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

/// What to snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Watch {
    /// The current URL
    Url,
    /// The full rendered markup
    PageSource,
    /// A set of attributes of one element
    Attributes {
        /// Element to read
        element: ElementHandle,
        /// Attribute names
        names: Vec<String>,
    },
}

impl Watch {
    /// Watch attributes of an element
    #[must_use]
    pub fn attributes<'a>(element: &ElementHandle, names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::Attributes {
            element: element.clone(),
            names: names.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Captured page state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    /// URL at capture time
    Url(String),
    /// Markup at capture time
    PageSource(String),
    /// Attribute values at capture time, absent attributes as `None`
    Attributes(BTreeMap<String, Option<String>>),
}

impl Snapshot {
    /// Capture the state named by `watch`
    pub async fn capture<D>(driver: &D, watch: &Watch) -> ProbeResult<Self>
    where
        D: ProbeDriver + ?Sized,
    {
        match watch {
            Watch::Url => Ok(Self::Url(driver.current_url().await?)),
            Watch::PageSource => Ok(Self::PageSource(driver.page_source().await?)),
            Watch::Attributes { element, names } => {
                let mut values = BTreeMap::new();
                for name in names {
                    values.insert(name.clone(), driver.get_attribute(element, name).await?);
                }
                Ok(Self::Attributes(values))
            }
        }
    }
}

/// Verdict of a before/after comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// State changed
    Observed,
    /// State did not change; the action may still have worked
    Unclear,
}

impl Effect {
    /// Compare a snapshot with the result of re-capturing it
    #[must_use]
    pub fn between(before: &Snapshot, after: &ProbeResult<Snapshot>) -> Self {
        match after {
            Ok(after) if after == before => Self::Unclear,
            _ => Self::Observed,
        }
    }

    /// Whether a change was seen
    #[must_use]
    pub const fn is_observed(self) -> bool {
        matches!(self, Self::Observed)
    }
}

/// Run `action` and report whether the watched state changed.
///
/// Fails only if the initial capture or the action itself fails.
pub async fn observe<D, F>(
    driver: &D,
    watch: &Watch,
    settle: Duration,
    action: F,
) -> ProbeResult<Effect>
where
    D: ProbeDriver + ?Sized,
    F: Future<Output = ProbeResult<()>>,
{
    let before = Snapshot::capture(driver, watch).await?;
    action.await?;
    tokio::time::sleep(settle).await;
    let after = Snapshot::capture(driver, watch).await;
    if let Err(e) = &after {
        tracing::debug!(error = %e, "re-capture failed, counting as a change");
    }
    let effect = Effect::between(&before, &after);
    tracing::debug!(?watch, ?effect, "verified action");
    Ok(effect)
}
