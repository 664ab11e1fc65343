//! Pawprobe: end-to-end browser checks for the PawFinder web application.
//!
//! Scenarios drive a real browser against a running PawFinder instance and
//! report each check as passed, failed or inconclusive. Because the
//! application's markup drifts, scenarios never rely on a single selector:
//! they hand an ordered [`CandidateSet`] to the adaptive resolver, which
//! returns the first element that is actually usable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     PAWPROBE Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Resolver / │    │ ProbeDriver│            │
//! │   │ catalog    │───►│ Verify /   │───►│ (chromium  │            │
//! │   │            │    │ Wait       │    │  or mock)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each scenario runs in its own browser session, released on every exit
//! path by [`scoped`].

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod browser;
pub mod config;
mod driver;
mod locator;
mod mock;
mod resolver;
mod result;
mod scenario;
pub mod scenarios;
mod session;
mod verify;
mod wait;

#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumFactory};
pub use config::{Applicant, Credentials, ProbeConfig, Timing};
pub use driver::{DriverFactory, ElementHandle, ProbeDriver};
pub use locator::{
    css_string, xpath_literal, AttrMatch, CandidateSet, Locator, LocatorKind, Query, Selector,
};
pub use mock::{MockDriver, MockEffect, MockElement, MockPage};
pub use resolver::{
    first_populated, resolve, resolve_all, resolve_report, Attempt, ContentFilter, Criteria,
    Outcome, Populated, Requirement, Resolution, Resolved,
};
pub use result::{ProbeError, ProbeResult};
pub use scenario::{CheckResult, CheckStatus, Scenario, ScenarioReport, Verdict};
pub use session::{scoped, Session};
pub use verify::{observe, Effect, Snapshot, Watch};
pub use wait::{poll, wait_for, Condition, WaitOptions};
