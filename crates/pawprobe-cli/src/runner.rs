//! Scenario runner: one browser session per scenario

use crate::config::CliConfig;
use crate::output::{ProgressReporter, RunSummary};
use chrono::Utc;
use pawprobe::{scoped, CheckStatus, DriverFactory, ProbeConfig, Scenario, ScenarioReport};
use std::sync::Arc;
use std::time::Instant;

/// Runs selected scenarios in order and collects their reports
#[derive(Debug)]
pub struct ScenarioRunner<F> {
    factory: F,
    probe: ProbeConfig,
    config: CliConfig,
    reporter: ProgressReporter,
}

impl<F: DriverFactory> ScenarioRunner<F> {
    /// Create a runner that launches sessions from `factory`
    #[must_use]
    pub fn new(factory: F, probe: ProbeConfig, config: CliConfig) -> Self {
        let reporter = ProgressReporter::new(
            config.color.should_color(),
            config.verbosity.is_quiet(),
        );
        Self {
            factory,
            probe,
            config,
            reporter,
        }
    }

    /// Run every scenario, stopping early only under `fail_fast`
    pub async fn run(&mut self, scenarios: Vec<Arc<dyn Scenario<F::Driver>>>) -> RunSummary {
        let started = Instant::now();
        let total = scenarios.len();
        self.reporter.header(&format!(
            "Running {total} scenario(s) against {} at {}",
            self.probe.base_url,
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        let mut summary = RunSummary::default();
        for (index, scenario) in scenarios.into_iter().enumerate() {
            self.reporter.start_scenario(scenario.name(), index + 1, total);
            let report = self.run_one(scenario).await;
            self.reporter.finish_scenario();
            self.reporter.scenario(&report);
            self.print_transcript(&report);

            let failed = report.verdict() == CheckStatus::Failed;
            summary.reports.push(report);
            if failed && self.config.fail_fast {
                tracing::warn!(remaining = total - index - 1, "stopping after first failure");
                break;
            }
        }
        summary.duration = started.elapsed();
        self.reporter.summary(&summary);
        summary
    }

    async fn run_one(&self, scenario: Arc<dyn Scenario<F::Driver>>) -> ScenarioReport {
        let name = scenario.name();
        let started = Instant::now();
        tracing::info!(scenario = name, "starting scenario");

        let mut report = match self.factory.launch().await {
            Ok(driver) => {
                let config = self.probe.clone();
                scoped(driver, move |d| {
                    Box::pin(async move {
                        let mut report = ScenarioReport::new(scenario.name());
                        if let Err(e) = scenario.run(d, &config, &mut report).await {
                            report.abort(&e);
                        }
                        Ok(report)
                    })
                })
                .await
                .unwrap_or_else(|e| {
                    let mut report = ScenarioReport::new(name);
                    report.abort(&e);
                    report
                })
            }
            Err(e) => {
                let mut report = ScenarioReport::new(name);
                report.abort(&e);
                report
            }
        };
        report.duration = started.elapsed();
        report
    }

    fn print_transcript(&self, report: &ScenarioReport) {
        if self.config.verbosity.is_quiet() && report.verdict() != CheckStatus::Failed {
            return;
        }
        println!("{report}\n");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use async_trait::async_trait;
    use pawprobe::{MockDriver, ProbeDriver, ProbeError, ProbeResult, Verdict};

    struct MockFactory {
        driver: MockDriver,
        broken: bool,
    }

    #[async_trait]
    impl DriverFactory for MockFactory {
        type Driver = MockDriver;

        async fn launch(&self) -> ProbeResult<MockDriver> {
            if self.broken {
                return Err(ProbeError::BrowserNotFound);
            }
            Ok(self.driver.clone())
        }
    }

    struct Greets;

    #[async_trait]
    impl Scenario<MockDriver> for Greets {
        fn name(&self) -> &'static str {
            "greets"
        }

        fn description(&self) -> &'static str {
            "reads the title"
        }

        async fn run(
            &self,
            driver: &mut MockDriver,
            config: &ProbeConfig,
            report: &mut ScenarioReport,
        ) -> ProbeResult<()> {
            driver.navigate(&config.url("/")).await?;
            report
                .check("title", async {
                    let title = driver.title().await?;
                    Ok(Verdict::pass_or_fail(title == "Home", "title is Home", title))
                })
                .await;
            Ok(())
        }
    }

    struct Explodes;

    #[async_trait]
    impl Scenario<MockDriver> for Explodes {
        fn name(&self) -> &'static str {
            "explodes"
        }

        fn description(&self) -> &'static str {
            "aborts"
        }

        async fn run(
            &self,
            _driver: &mut MockDriver,
            _config: &ProbeConfig,
            _report: &mut ScenarioReport,
        ) -> ProbeResult<()> {
            Err(ProbeError::action("click", "element obstructed"))
        }
    }

    struct Panics;

    #[async_trait]
    impl Scenario<MockDriver> for Panics {
        fn name(&self) -> &'static str {
            "panics"
        }

        fn description(&self) -> &'static str {
            "panics"
        }

        async fn run(
            &self,
            _driver: &mut MockDriver,
            _config: &ProbeConfig,
            _report: &mut ScenarioReport,
        ) -> ProbeResult<()> {
            panic!("unexpected markup");
        }
    }

    fn runner(factory: MockFactory, fail_fast: bool) -> ScenarioRunner<MockFactory> {
        let config = CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_fail_fast(fail_fast);
        ScenarioRunner::new(factory, ProbeConfig::default().with_base_url("http://app"), config)
    }

    fn home_driver() -> MockDriver {
        let driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.title("Home");
        });
        driver
    }

    #[tokio::test]
    async fn test_each_scenario_gets_a_session() {
        let driver = home_driver();
        let mut runner = runner(
            MockFactory {
                driver: driver.clone(),
                broken: false,
            },
            false,
        );

        let summary = runner
            .run(vec![Arc::new(Greets), Arc::new(Explodes), Arc::new(Greets)])
            .await;

        assert_eq!(summary.counts(), (2, 1, 0));
        assert!(!summary.succeeded());
        assert_eq!(driver.quit_count(), 3);
        let aborted = summary.reports[1].aborted.as_deref().unwrap();
        assert!(aborted.contains("obstructed"));
    }

    #[tokio::test]
    async fn test_fail_fast_stops_after_failure() {
        let driver = home_driver();
        let mut runner = runner(
            MockFactory {
                driver: driver.clone(),
                broken: false,
            },
            true,
        );

        let summary = runner.run(vec![Arc::new(Explodes), Arc::new(Greets)]).await;

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(driver.quit_count(), 1);
    }

    #[tokio::test]
    async fn test_panicking_scenario_is_reported_and_released() {
        let driver = home_driver();
        let mut runner = runner(
            MockFactory {
                driver: driver.clone(),
                broken: false,
            },
            false,
        );

        let summary = runner.run(vec![Arc::new(Panics), Arc::new(Greets)]).await;

        assert_eq!(summary.counts(), (1, 1, 0));
        let aborted = summary.reports[0].aborted.as_deref().unwrap();
        assert!(aborted.contains("unexpected markup"));
        assert_eq!(driver.quit_count(), 2);
    }

    #[tokio::test]
    async fn test_launch_failure_fails_scenario() {
        let driver = home_driver();
        let mut runner = runner(
            MockFactory {
                driver: driver.clone(),
                broken: true,
            },
            false,
        );

        let summary = runner.run(vec![Arc::new(Greets)]).await;

        assert_eq!(summary.reports[0].verdict(), CheckStatus::Failed);
        assert!(summary.reports[0]
            .aborted
            .as_deref()
            .unwrap()
            .contains("Browser not found"));
        assert_eq!(driver.quit_count(), 0);
    }
}
