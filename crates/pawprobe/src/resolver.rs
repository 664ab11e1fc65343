//! Adaptive element resolver.
//!
//! Walks a [`CandidateSet`] in declared order and returns the first element
//! that satisfies a [`Requirement`]. Locators whose query fails are treated
//! as non-matches and a state probe that throws marks only that element
//! unusable, so one bad candidate never aborts a resolution. Not finding
//! anything is an ordinary outcome, never an error.
//!
//! ```text
//! candidate #0 ──query──► [] ........................ Missing
//! candidate #1 ──query──► [el(hidden)] ............... Unusable
//! candidate #2 ──query──► [el(hidden), el(ok)] ───────► Resolved(#2, el(ok))
//! candidate #3   (never queried)
//! ```

use crate::driver::{ElementHandle, ProbeDriver};
use crate::locator::{CandidateSet, Selector};
use std::collections::HashSet;
use std::fmt;

/// Interactive state an element must be in to count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    /// Matching is enough
    PresentOnly,
    /// Rendered and visible
    Visible,
    /// Visible and not disabled
    #[default]
    VisibleEnabled,
}

/// Result of probing one locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// At least one match satisfied the requirement
    Usable,
    /// Matches exist but none satisfied the requirement
    Unusable,
    /// No match, or the query itself failed
    Missing,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Usable => "usable",
            Self::Unusable => "unusable",
            Self::Missing => "missing",
        };
        f.write_str(label)
    }
}

/// Extra conditions on an element beyond its interactive state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFilter {
    /// Case-insensitive keywords, any of which must appear
    pub keywords: Vec<String>,
    /// Attributes searched for keywords besides the visible text
    pub attributes: Vec<String>,
    /// Minimum rendered height in pixels
    pub min_height: Option<f64>,
}

impl ContentFilter {
    /// Require any of `keywords` in the element's text
    #[must_use]
    pub fn keywords<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            keywords: keywords.into_iter().map(str::to_lowercase).collect(),
            ..Self::default()
        }
    }

    /// Also look for keywords in this attribute
    #[must_use]
    pub fn in_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Require a minimum rendered height
    #[must_use]
    pub const fn min_height(mut self, height: f64) -> Self {
        self.min_height = Some(height);
        self
    }
}

/// Everything an element must satisfy to be picked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    /// Interactive state
    pub requirement: Requirement,
    /// Optional content filter
    pub filter: Option<ContentFilter>,
}

impl Criteria {
    /// Add a content filter
    #[must_use]
    pub fn filtered(mut self, filter: ContentFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl From<Requirement> for Criteria {
    fn from(requirement: Requirement) -> Self {
        Self {
            requirement,
            filter: None,
        }
    }
}

/// Element picked by a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Live handle
    pub element: ElementHandle,
    /// Rank of the locator that matched
    pub rank: usize,
    /// The locator that matched
    pub selector: Selector,
}

/// One line of a resolution's attempt log
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// Locator rank
    pub rank: usize,
    /// Locator tried
    pub selector: Selector,
    /// What came of it
    pub outcome: Outcome,
    /// Number of elements the query returned
    pub matches: usize,
    /// Query error, if the query failed
    pub error: Option<String>,
}

/// Resolution result plus the attempt log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Winner, if any
    pub resolved: Option<Resolved>,
    /// Locators tried, in order, up to and including the winner
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    /// Whether anything was found
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Usable elements found by the first populated locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Populated {
    /// Rank of the locator
    pub rank: usize,
    /// The locator
    pub selector: Selector,
    /// All its usable elements, in document order
    pub elements: Vec<ElementHandle>,
}

async fn satisfies<D>(driver: &D, element: &ElementHandle, criteria: &Criteria) -> bool
where
    D: ProbeDriver + ?Sized,
{
    let state = match criteria.requirement {
        Requirement::PresentOnly => Ok(true),
        Requirement::Visible => driver.is_displayed(element).await,
        Requirement::VisibleEnabled => match driver.is_displayed(element).await {
            Ok(true) => driver.is_enabled(element).await,
            other => other,
        },
    };
    match state {
        Ok(true) => {}
        Ok(false) => return false,
        Err(e) => {
            tracing::debug!(%element, error = %e, "state probe failed, element unusable");
            return false;
        }
    }
    match &criteria.filter {
        Some(filter) => passes_filter(driver, element, filter).await,
        None => true,
    }
}

async fn passes_filter<D>(driver: &D, element: &ElementHandle, filter: &ContentFilter) -> bool
where
    D: ProbeDriver + ?Sized,
{
    if let Some(min) = filter.min_height {
        match driver.height(element).await {
            Ok(h) if h >= min => {}
            _ => return false,
        }
    }
    if filter.keywords.is_empty() {
        return true;
    }
    let mut haystacks = Vec::with_capacity(filter.attributes.len() + 1);
    if let Ok(text) = driver.text(element).await {
        haystacks.push(text.to_lowercase());
    }
    for name in &filter.attributes {
        if let Ok(Some(value)) = driver.get_attribute(element, name).await {
            haystacks.push(value.to_lowercase());
        }
    }
    haystacks
        .iter()
        .any(|h| filter.keywords.iter().any(|k| h.contains(k.as_str())))
}

/// Query one locator and test its matches. Never fails.
async fn probe<D>(
    driver: &D,
    rank: usize,
    selector: &Selector,
    criteria: &Criteria,
    stop_at_first: bool,
) -> (Attempt, Vec<ElementHandle>)
where
    D: ProbeDriver + ?Sized,
{
    let matches = match driver.find(selector).await {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!(rank, %selector, error = %e, "query failed, treated as no match");
            let attempt = Attempt {
                rank,
                selector: selector.clone(),
                outcome: Outcome::Missing,
                matches: 0,
                error: Some(e.to_string()),
            };
            return (attempt, Vec::new());
        }
    };

    let mut usable = Vec::new();
    for element in &matches {
        if satisfies(driver, element, criteria).await {
            usable.push(element.clone());
            if stop_at_first {
                break;
            }
        }
    }

    let outcome = if !usable.is_empty() {
        Outcome::Usable
    } else if matches.is_empty() {
        Outcome::Missing
    } else {
        Outcome::Unusable
    };
    tracing::debug!(rank, %selector, matches = matches.len(), %outcome, "probed locator");
    let attempt = Attempt {
        rank,
        selector: selector.clone(),
        outcome,
        matches: matches.len(),
        error: None,
    };
    (attempt, usable)
}

/// Resolve the first usable element, with the attempt log
pub async fn resolve_report<D>(
    driver: &D,
    candidates: &CandidateSet,
    criteria: impl Into<Criteria>,
) -> Resolution
where
    D: ProbeDriver + ?Sized,
{
    let criteria = criteria.into();
    let mut resolution = Resolution::default();
    for locator in candidates.locators() {
        let (attempt, usable) =
            probe(driver, locator.rank, &locator.selector, &criteria, true).await;
        resolution.attempts.push(attempt);
        if let Some(element) = usable.into_iter().next() {
            tracing::debug!(role = candidates.role(), %locator, %element, "resolved");
            resolution.resolved = Some(Resolved {
                element,
                rank: locator.rank,
                selector: locator.selector.clone(),
            });
            return resolution;
        }
    }
    tracing::debug!(
        role = candidates.role(),
        tried = candidates.len(),
        "no usable element"
    );
    resolution
}

/// Resolve the first usable element: first locator in declared order, then
/// first element in document order. `None` when nothing qualifies.
pub async fn resolve<D>(
    driver: &D,
    candidates: &CandidateSet,
    criteria: impl Into<Criteria>,
) -> Option<Resolved>
where
    D: ProbeDriver + ?Sized,
{
    resolve_report(driver, candidates, criteria).await.resolved
}

/// Every usable element across all locators, in locator then document
/// order. An element matched by several locators appears once.
pub async fn resolve_all<D>(
    driver: &D,
    candidates: &CandidateSet,
    criteria: impl Into<Criteria>,
) -> Vec<ElementHandle>
where
    D: ProbeDriver + ?Sized,
{
    let criteria = criteria.into();
    let mut seen = HashSet::new();
    let mut all = Vec::new();
    for locator in candidates.locators() {
        let (_, usable) = probe(driver, locator.rank, &locator.selector, &criteria, false).await;
        all.extend(usable.into_iter().filter(|e| seen.insert(e.id.clone())));
    }
    tracing::debug!(role = candidates.role(), found = all.len(), "collected candidates");
    all
}

/// All usable elements of the first locator that has any
pub async fn first_populated<D>(
    driver: &D,
    candidates: &CandidateSet,
    criteria: impl Into<Criteria>,
) -> Option<Populated>
where
    D: ProbeDriver + ?Sized,
{
    let criteria = criteria.into();
    for locator in candidates.locators() {
        let (_, usable) = probe(driver, locator.rank, &locator.selector, &criteria, false).await;
        if !usable.is_empty() {
            return Some(Populated {
                rank: locator.rank,
                selector: locator.selector.clone(),
                elements: usable,
            });
        }
    }
    None
}
