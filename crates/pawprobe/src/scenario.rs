//! Scenario model: named checks, verdicts and per-scenario reports.
//!
//! A check is an async block yielding a [`Verdict`]. If the block returns an
//! error (an action failed, a wait timed out) the error is logged and
//! recorded as that check's failure; the remaining checks still run. A
//! resolution miss is not an error: checks report it as
//! [`CheckStatus::Inconclusive`].

use crate::config::ProbeConfig;
use crate::driver::ProbeDriver;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

/// Outcome of one check, or of a whole scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckStatus {
    /// Behaviour confirmed
    Passed,
    /// Behaviour contradicted, or an action raised
    Failed,
    /// Could not tell, usually because an element was not found
    Inconclusive,
}

impl CheckStatus {
    /// Transcript symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Passed => "✓",
            Self::Failed => "✗",
            Self::Inconclusive => "?",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Inconclusive => "inconclusive",
        };
        f.write_str(label)
    }
}

/// Status plus a short human-readable note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Status
    pub status: CheckStatus,
    /// What was observed
    pub note: String,
}

impl Verdict {
    /// Passed verdict
    #[must_use]
    pub fn pass(note: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Passed,
            note: note.into(),
        }
    }

    /// Failed verdict
    #[must_use]
    pub fn fail(note: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Failed,
            note: note.into(),
        }
    }

    /// Inconclusive verdict
    #[must_use]
    pub fn inconclusive(note: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Inconclusive,
            note: note.into(),
        }
    }

    /// Pass when `ok`, otherwise inconclusive
    #[must_use]
    pub fn pass_or_inconclusive(ok: bool, pass: impl Into<String>, otherwise: impl Into<String>) -> Self {
        if ok {
            Self::pass(pass)
        } else {
            Self::inconclusive(otherwise)
        }
    }

    /// Pass when `ok`, otherwise failed
    #[must_use]
    pub fn pass_or_fail(ok: bool, pass: impl Into<String>, otherwise: impl Into<String>) -> Self {
        if ok {
            Self::pass(pass)
        } else {
            Self::fail(otherwise)
        }
    }
}

/// Recorded check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Status
    pub status: CheckStatus,
    /// Note
    pub note: String,
    /// Time spent
    pub duration: Duration,
}

/// Everything one scenario run produced
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: String,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Checks in execution order
    pub checks: Vec<CheckResult>,
    /// Error that aborted the scenario, if any
    pub aborted: Option<String>,
    /// Total duration, set by the runner
    pub duration: Duration,
}

impl ScenarioReport {
    /// Start an empty report
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            started_at: Utc::now(),
            checks: Vec::new(),
            aborted: None,
            duration: Duration::ZERO,
        }
    }

    /// Run one check and record its verdict
    pub async fn check<F>(&mut self, name: &str, check: F) -> CheckStatus
    where
        F: Future<Output = ProbeResult<Verdict>>,
    {
        let started = Instant::now();
        let verdict = match check.await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(scenario = %self.scenario, check = name, error = %e, "check raised");
                Verdict::fail(e.to_string())
            }
        };
        self.record(name, verdict, started.elapsed())
    }

    /// Record a verdict produced elsewhere
    pub fn record(&mut self, name: &str, verdict: Verdict, duration: Duration) -> CheckStatus {
        tracing::info!(
            scenario = %self.scenario,
            check = name,
            status = %verdict.status,
            note = %verdict.note,
            "check finished"
        );
        let status = verdict.status;
        self.checks.push(CheckResult {
            name: name.to_string(),
            status,
            note: verdict.note,
            duration,
        });
        status
    }

    /// Mark the scenario aborted
    pub fn abort(&mut self, error: &ProbeError) {
        tracing::error!(scenario = %self.scenario, error = %error, "scenario aborted");
        self.aborted = Some(error.to_string());
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// Number of passed checks
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(CheckStatus::Passed)
    }

    /// Number of failed checks
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(CheckStatus::Failed)
    }

    /// Number of inconclusive checks
    #[must_use]
    pub fn inconclusive(&self) -> usize {
        self.count(CheckStatus::Inconclusive)
    }

    /// Aggregate verdict.
    ///
    /// Failed if aborted or any check failed, inconclusive if nothing
    /// passed, otherwise passed.
    #[must_use]
    pub fn verdict(&self) -> CheckStatus {
        if self.aborted.is_some() || self.failed() > 0 {
            CheckStatus::Failed
        } else if self.passed() == 0 {
            CheckStatus::Inconclusive
        } else {
            CheckStatus::Passed
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({})",
            self.scenario,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        for check in &self.checks {
            writeln!(
                f,
                "  {} {}: {} [{:.2}s]",
                check.status.symbol(),
                check.name,
                check.note,
                check.duration.as_secs_f64()
            )?;
        }
        if let Some(error) = &self.aborted {
            writeln!(f, "  aborted: {error}")?;
        }
        write!(
            f,
            "  => {} ({} passed, {} failed, {} inconclusive)",
            self.verdict(),
            self.passed(),
            self.failed(),
            self.inconclusive()
        )
    }
}

/// A runnable end-to-end scenario
#[async_trait]
pub trait Scenario<D: ProbeDriver>: Send + Sync {
    /// Name used on the command line
    fn name(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// Run all checks against a fresh session.
    ///
    /// An error return aborts the scenario; individual check failures
    /// belong in `report` instead.
    async fn run(
        &self,
        driver: &mut D,
        config: &ProbeConfig,
        report: &mut ScenarioReport,
    ) -> ProbeResult<()>;
}
