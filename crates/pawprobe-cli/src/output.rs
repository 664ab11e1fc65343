//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pawprobe::{CheckStatus, ScenarioReport};
use std::time::Duration;

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner while a scenario runs. Skipped when stderr is not a terminal.
    pub fn start_scenario(&mut self, name: &str, position: usize, total: usize) {
        if self.quiet || !self.term.is_term() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("({position}/{total}) {name}"));
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
    }

    /// Remove the current spinner
    pub fn finish_scenario(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print one line per scenario outcome
    pub fn scenario(&self, report: &ScenarioReport) {
        let message = format!(
            "{} ({} passed, {} failed, {} inconclusive) in {:.2}s",
            report.scenario,
            report.passed(),
            report.failed(),
            report.inconclusive(),
            report.duration.as_secs_f64()
        );
        match report.verdict() {
            CheckStatus::Passed => self.success(&message),
            CheckStatus::Failed => self.failure(&message),
            CheckStatus::Inconclusive => self.warning(&message),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("?").yellow().bold().to_string()
        } else {
            "INCONCLUSIVE".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, summary: &RunSummary) {
        if self.quiet && summary.succeeded() {
            return;
        }

        let _ = self.term.write_line("");
        let total = summary.reports.len();
        let (passed, failed, inconclusive) = summary.counts();
        let secs = summary.duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let inconclusive_style = Style::new().yellow();

            let status = if summary.succeeded() {
                passed_style.apply_to("PASSED")
            } else {
                failed_style.apply_to("FAILED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} inconclusive)",
                status,
                total,
                secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                inconclusive_style.apply_to(inconclusive)
            ));
        } else {
            let status = if summary.succeeded() { "PASSED" } else { "FAILED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {secs:.2}s ({passed} passed, {failed} failed, {inconclusive} inconclusive)"
            ));
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Reports in execution order
    pub reports: Vec<ScenarioReport>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Scenario counts as `(passed, failed, inconclusive)`
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        self.reports
            .iter()
            .fold((0, 0, 0), |(p, f, i), report| match report.verdict() {
                CheckStatus::Passed => (p + 1, f, i),
                CheckStatus::Failed => (p, f + 1, i),
                CheckStatus::Inconclusive => (p, f, i + 1),
            })
    }

    /// True when no scenario failed
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.reports
            .iter()
            .all(|r| r.verdict() != CheckStatus::Failed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pawprobe::{ProbeError, Verdict};

    fn report(name: &str, verdicts: Vec<Verdict>) -> ScenarioReport {
        let mut report = ScenarioReport::new(name);
        for (i, verdict) in verdicts.into_iter().enumerate() {
            report.record(&format!("check {i}"), verdict, Duration::from_millis(10));
        }
        report
    }

    #[test]
    fn test_counts_and_success() {
        let summary = RunSummary {
            reports: vec![
                report("homepage", vec![Verdict::pass("ok")]),
                report("marketplace", vec![Verdict::inconclusive("no products")]),
            ],
            duration: Duration::from_secs(1),
        };
        assert_eq!(summary.counts(), (1, 0, 1));
        assert!(summary.succeeded());
    }

    #[test]
    fn test_aborted_scenario_fails_run() {
        let mut aborted = report("sign-in", vec![Verdict::pass("form found")]);
        aborted.abort(&ProbeError::action("click", "obstructed"));
        let summary = RunSummary {
            reports: vec![aborted],
            duration: Duration::ZERO,
        };
        assert_eq!(summary.counts(), (0, 1, 0));
        assert!(!summary.succeeded());
    }

    #[test]
    fn test_empty_run_succeeds() {
        assert!(RunSummary::default().succeeded());
    }

    #[test]
    fn test_quiet_reporter_does_not_start_spinner() {
        let mut reporter = ProgressReporter::new(false, true);
        reporter.start_scenario("homepage", 1, 1);
        assert!(reporter.spinner.is_none());
        reporter.finish_scenario();
    }
}
