//! Homepage smoke checks: heading, Sign In link, View Details button.

use super::{describe, open};
use crate::config::ProbeConfig;
use crate::driver::ProbeDriver;
use crate::locator::CandidateSet;
use crate::resolver::{resolve, Requirement};
use crate::result::ProbeResult;
use crate::scenario::{Scenario, ScenarioReport, Verdict};
use crate::wait::{wait_for, Condition};
use async_trait::async_trait;

/// Homepage load and primary navigation
#[derive(Debug, Clone, Copy, Default)]
pub struct Homepage;

fn sign_in_link() -> CandidateSet {
    CandidateSet::of(
        "sign in link",
        [
            "xpath://a[normalize-space()='Sign In']",
            "a:contains('Sign In')",
            "a[href*='sign-in']",
        ],
    )
}

fn view_details_button() -> CandidateSet {
    CandidateSet::of(
        "view details button",
        [
            "xpath://button[contains(text(), 'View Details')]",
            "a:contains('View Details')",
            "text:View Details",
        ],
    )
}

async fn heading<D: ProbeDriver>(driver: &D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let h1 = wait_for(driver, &Condition::present("h1"), &config.timing.wait_options()).await?;
    let note = match h1 {
        Some(h1) => format!("h1 present: {}", describe(driver, &h1).await),
        None => "h1 present".to_string(),
    };
    Ok(Verdict::pass(note))
}

async fn sign_in_navigates<D: ProbeDriver>(
    driver: &mut D,
    config: &ProbeConfig,
) -> ProbeResult<Verdict> {
    open(driver, config, "/").await?;
    let Some(link) = resolve(driver, &sign_in_link(), Requirement::VisibleEnabled).await else {
        return Ok(Verdict::inconclusive("Sign In link not found"));
    };
    driver.click(&link.element).await?;
    wait_for(
        driver,
        &Condition::url_contains("/sign-in"),
        &config.timing.wait_options(),
    )
    .await?;
    Ok(Verdict::pass(format!(
        "redirected to {}",
        driver.current_url().await?
    )))
}

async fn view_details_navigates<D: ProbeDriver>(
    driver: &mut D,
    config: &ProbeConfig,
) -> ProbeResult<Verdict> {
    open(driver, config, "/").await?;
    let Some(button) = resolve(driver, &view_details_button(), Requirement::VisibleEnabled).await
    else {
        return Ok(Verdict::inconclusive("View Details button not found"));
    };
    driver.click(&button.element).await?;
    let options = config.timing.wait_options();
    wait_for(driver, &Condition::url_contains("/details"), &options).await?;
    let header = wait_for(driver, &Condition::present("h1"), &options).await?;
    let title = match header {
        Some(h1) => describe(driver, &h1).await,
        None => String::new(),
    };
    Ok(Verdict::pass(format!("detail page loaded: {title}")))
}

#[async_trait]
impl<D: ProbeDriver> Scenario<D> for Homepage {
    fn name(&self) -> &'static str {
        "homepage"
    }

    fn description(&self) -> &'static str {
        "Homepage loads; Sign In and View Details navigate"
    }

    async fn run(
        &self,
        driver: &mut D,
        config: &ProbeConfig,
        report: &mut ScenarioReport,
    ) -> ProbeResult<()> {
        open(driver, config, "/").await?;
        report.check("homepage loads", heading(driver, config)).await;
        report
            .check("sign in link", sign_in_navigates(driver, config))
            .await;
        report
            .check("view details", view_details_navigates(driver, config))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockEffect, MockElement};
    use crate::scenario::CheckStatus;
    use crate::scenarios::testing::fast_config;

    fn site() -> MockDriver {
        let driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.add(MockElement::new("h1", "h1").text("Find your new best friend"), &["h1"])
                .add(
                    MockElement::new("signin", "a").text("Sign In"),
                    &["xpath://a[normalize-space()='Sign In']"],
                )
                .add(
                    MockElement::new("vd", "button").text("View Details"),
                    &["xpath://button[contains(text(), 'View Details')]"],
                )
                .on_click("signin", MockEffect::Navigate("http://app/sign-in".into()))
                .on_click("vd", MockEffect::Navigate("http://app/pets/1/details".into()));
        });
        driver.page("http://app/pets/1/details", |p| {
            p.add(MockElement::new("name", "h1").text("Buddy"), &["h1"]);
        });
        driver
    }

    #[tokio::test]
    async fn test_all_checks_pass() {
        let mut driver = site();
        let mut report = ScenarioReport::new("homepage");
        Homepage
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.verdict(), CheckStatus::Passed, "{report}");
        assert_eq!(report.passed(), 3);
        assert!(report.checks[2].note.contains("Buddy"));
    }

    #[tokio::test]
    async fn test_link_that_goes_nowhere_fails_with_timeout() {
        let mut driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.add(MockElement::new("h1", "h1"), &["h1"]).add(
                MockElement::new("signin", "a").text("Sign In"),
                &["a[href*='sign-in']"],
            );
        });
        let mut report = ScenarioReport::new("homepage");
        Homepage
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.checks[1].status, CheckStatus::Failed);
        assert!(report.checks[1].note.contains("Timed out"));
        assert_eq!(report.checks[2].status, CheckStatus::Inconclusive);
        assert_eq!(report.verdict(), CheckStatus::Failed);
    }
}
