//! Marketplace listing, after an optional login.

use super::{open, pause, truncate};
use crate::config::ProbeConfig;
use crate::driver::ProbeDriver;
use crate::locator::CandidateSet;
use crate::resolver::{first_populated, resolve, Requirement};
use crate::result::ProbeResult;
use crate::scenario::{CheckStatus, Scenario, ScenarioReport, Verdict};
use async_trait::async_trait;

/// Marketplace reachable and showing products
#[derive(Debug, Clone, Copy, Default)]
pub struct Marketplace;

fn products() -> CandidateSet {
    CandidateSet::of(
        "product",
        [
            ".product-card",
            ".product-item",
            ".product",
            "[data-testid*='product']",
            ".card",
            ".item",
            ".grid > div",
            ".products .product",
        ],
    )
}

async fn login<D: ProbeDriver>(driver: &mut D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    open(driver, config, "/sign-in").await?;
    let email = resolve(
        &*driver,
        &CandidateSet::new("email").css("input[name='email']"),
        Requirement::PresentOnly,
    )
    .await;
    let password = resolve(
        &*driver,
        &CandidateSet::new("password").css("input[name='password']"),
        Requirement::PresentOnly,
    )
    .await;
    let (Some(email), Some(password)) = (email, password) else {
        return Ok(Verdict::inconclusive("login form not found, continuing anonymously"));
    };

    let credentials = &config.marketplace;
    driver.send_keys(&email.element, &credentials.email).await?;
    driver.send_keys(&password.element, &credentials.password).await?;
    driver.press_enter(&password.element).await?;
    pause(config.timing.settle()).await;
    Ok(Verdict::pass(format!("submitted credentials for {}", credentials.email)))
}

async fn loads<D: ProbeDriver>(driver: &mut D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    open(driver, config, "/marketplace").await?;
    let url = driver.current_url().await?;
    Ok(Verdict::pass_or_fail(
        !url.contains("sign-in"),
        format!("loaded {url}"),
        "redirected to sign-in, login may be required",
    ))
}

async fn listing<D: ProbeDriver>(driver: &D) -> ProbeResult<Verdict> {
    match first_populated(driver, &products(), Requirement::Visible).await {
        Some(found) => Ok(Verdict::pass(format!(
            "{} product(s) via {}",
            found.elements.len(),
            found.selector
        ))),
        None => {
            let source = driver.page_source().await?;
            tracing::debug!(source = %truncate(&source, 1000), "no products visible");
            Ok(Verdict::inconclusive("no products visible"))
        }
    }
}

#[async_trait]
impl<D: ProbeDriver> Scenario<D> for Marketplace {
    fn name(&self) -> &'static str {
        "marketplace"
    }

    fn description(&self) -> &'static str {
        "Marketplace loads without a sign-in redirect and lists products"
    }

    async fn run(
        &self,
        driver: &mut D,
        config: &ProbeConfig,
        report: &mut ScenarioReport,
    ) -> ProbeResult<()> {
        report.check("login", login(driver, config)).await;
        let reachable = report
            .check("marketplace loads", loads(driver, config))
            .await;
        if reachable == CheckStatus::Passed {
            report.check("products visible", listing(driver)).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};

    fn sign_in_form(driver: &MockDriver) {
        driver.page("http://app/sign-in", |p| {
            p.add(MockElement::new("e", "input"), &["input[name='email']"])
                .add(MockElement::new("p", "input"), &["input[name='password']"]);
        });
    }

    #[tokio::test]
    async fn test_products_listed_after_login() {
        let mut driver = MockDriver::new();
        sign_in_form(&driver);
        driver.page("http://app/marketplace", |p| {
            p.add(MockElement::new("hidden", "div").hidden(), &[".product-card"])
                .add(MockElement::new("c1", "div"), &[".card"])
                .add(MockElement::new("c2", "div"), &[".card"]);
        });
        let observer = driver.clone();
        let mut report = ScenarioReport::new("marketplace");
        Marketplace
            .run(&mut driver, &super::super::testing::fast_config(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.verdict(), CheckStatus::Passed, "{report}");
        assert!(report.checks[2].note.starts_with("2 product(s) via css:.card"));
        assert!(observer.was_called("press_enter:p"));
    }

    #[tokio::test]
    async fn test_redirect_to_sign_in_fails() {
        let mut driver = MockDriver::new();
        sign_in_form(&driver);
        driver.page("http://app/marketplace", |p| {
            p.redirect("http://app/sign-in?next=/marketplace");
        });
        let mut report = ScenarioReport::new("marketplace");
        Marketplace
            .run(&mut driver, &super::super::testing::fast_config(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.checks[1].status, CheckStatus::Failed);
        assert_eq!(report.verdict(), CheckStatus::Failed);
    }
}
