//! Adoption form submission.

use super::{open, pause};
use crate::config::ProbeConfig;
use crate::driver::{ElementHandle, ProbeDriver};
use crate::locator::{CandidateSet, Selector};
use crate::resolver::{resolve, Requirement};
use crate::result::ProbeResult;
use crate::scenario::{CheckStatus, Scenario, ScenarioReport, Verdict};
use async_trait::async_trait;

/// Texts the application shows after a successful submission
const CONFIRMATIONS: [&str; 2] = ["Adoption submitted", "Thank you"];

/// Fill the adoption form of one pet and submit it
#[derive(Debug, Clone, Copy, Default)]
pub struct AdoptionForm;

fn submit_button() -> CandidateSet {
    CandidateSet::of(
        "submit button",
        [
            "xpath://button[contains(text(), 'Submit')]",
            "button[type='submit']",
            "button:contains('Adopt')",
        ],
    )
}

async fn list_inputs<D: ProbeDriver>(driver: &D, inputs: &[ElementHandle]) -> ProbeResult<String> {
    let mut described = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let mut parts = Vec::new();
        for name in ["name", "id", "placeholder"] {
            if let Some(value) = driver.get_attribute(input, name).await? {
                parts.push(format!("{name}={value}"));
            }
        }
        described.push(format!("[{i}] {}", parts.join(" ")));
    }
    Ok(described.join(", "))
}

#[async_trait]
impl<D: ProbeDriver> Scenario<D> for AdoptionForm {
    fn name(&self) -> &'static str {
        "adoption-form"
    }

    fn description(&self) -> &'static str {
        "Fill in and submit the adoption form"
    }

    async fn run(
        &self,
        driver: &mut D,
        config: &ProbeConfig,
        report: &mut ScenarioReport,
    ) -> ProbeResult<()> {
        open(driver, config, &format!("/pets/{}", config.adoption_pet_id)).await?;
        let driver = &*driver;
        let found = driver.find(&Selector::css("input")).await;

        let listed = report
            .check("form inputs", async {
                let inputs = match &found {
                    Ok(inputs) => inputs,
                    Err(e) => {
                        return Ok(Verdict::inconclusive(format!("input lookup failed: {e}")))
                    }
                };
                if inputs.len() < 3 {
                    return Ok(Verdict::inconclusive(format!(
                        "found {} input(s), at least 3 required",
                        inputs.len()
                    )));
                }
                Ok(Verdict::pass(list_inputs(driver, inputs).await?))
            })
            .await;
        let (CheckStatus::Passed, Ok(inputs)) = (listed, found) else {
            return Ok(());
        };

        let filled = report
            .check("fill applicant", async {
                let applicant = &config.applicant;
                for (input, value) in inputs
                    .iter()
                    .zip([&applicant.name, &applicant.email, &applicant.phone])
                {
                    driver.send_keys(input, value).await?;
                }
                Ok(Verdict::pass(format!("entered {}", applicant.name)))
            })
            .await;
        if filled != CheckStatus::Passed {
            return Ok(());
        }

        report
            .check("submit", async {
                let Some(button) = resolve(driver, &submit_button(), Requirement::VisibleEnabled).await
                else {
                    return Ok(Verdict::inconclusive("submit button not found"));
                };
                driver.click(&button.element).await?;
                pause(config.timing.settle()).await;
                let source = driver.page_source().await?;
                Ok(match CONFIRMATIONS.iter().find(|c| source.contains(**c)) {
                    Some(text) => Verdict::pass(format!("confirmation shown: {text:?}")),
                    None => Verdict::fail("no confirmation message after submitting"),
                })
            })
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockEffect, MockElement};
    use crate::scenarios::testing::fast_config;

    fn form(confirm: bool) -> MockDriver {
        let driver = MockDriver::new();
        driver.page("http://app/pets/6", |p| {
            p.add(MockElement::new("n", "input").attr("name", "name"), &["input"])
                .add(MockElement::new("e", "input").attr("name", "email"), &["input"])
                .add(MockElement::new("t", "input").attr("name", "phone"), &["input"])
                .add(
                    MockElement::new("go", "button").text("Submit"),
                    &["xpath://button[contains(text(), 'Submit')]"],
                );
            if confirm {
                p.on_click(
                    "go",
                    MockEffect::SetSource("<p>Thank you for adopting!</p>".into()),
                );
            }
        });
        driver
    }

    #[tokio::test]
    async fn test_submission_confirmed() {
        let mut driver = form(true);
        let observer = driver.clone();
        let mut report = ScenarioReport::new("adoption-form");
        AdoptionForm
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.verdict(), CheckStatus::Passed, "{report}");
        assert!(report.checks[0].note.contains("name=email"));
        assert!(observer.was_called("send_keys:e:hasib@gmail.com"));
    }

    #[tokio::test]
    async fn test_missing_confirmation_fails() {
        let mut driver = form(false);
        let mut report = ScenarioReport::new("adoption-form");
        AdoptionForm
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();
        assert_eq!(report.checks[2].status, CheckStatus::Failed);
    }

    #[tokio::test]
    async fn test_too_few_inputs_is_inconclusive() {
        let mut driver = MockDriver::new();
        let mut report = ScenarioReport::new("adoption-form");
        AdoptionForm
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();
        assert_eq!(report.checks.len(), 1);
        assert_eq!(report.verdict(), CheckStatus::Inconclusive);
    }

    #[tokio::test]
    async fn test_failed_input_query_is_inconclusive() {
        let mut driver = form(true);
        driver.page("http://app/pets/6", |p| {
            p.fail_query("input");
        });
        let mut report = ScenarioReport::new("adoption-form");
        AdoptionForm
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.checks.len(), 1);
        assert_eq!(report.checks[0].status, CheckStatus::Inconclusive);
        assert!(report.checks[0].note.contains("input lookup failed"), "{report}");
        assert!(report.checks[0].note.contains("invalid selector"), "{report}");
    }
}
