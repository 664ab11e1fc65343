//! Pet details page load.

use super::open;
use crate::config::ProbeConfig;
use crate::driver::ProbeDriver;
use crate::result::ProbeResult;
use crate::scenario::{Scenario, ScenarioReport, Verdict};
use async_trait::async_trait;

/// `/pets/{id}` loads with a pet URL and a title
#[derive(Debug, Clone, Copy, Default)]
pub struct PetDetails;

#[async_trait]
impl<D: ProbeDriver> Scenario<D> for PetDetails {
    fn name(&self) -> &'static str {
        "pet-details"
    }

    fn description(&self) -> &'static str {
        "Pet details page loads with a title"
    }

    async fn run(
        &self,
        driver: &mut D,
        config: &ProbeConfig,
        report: &mut ScenarioReport,
    ) -> ProbeResult<()> {
        open(driver, config, &format!("/pets/{}", config.details_pet_id)).await?;
        let driver = &*driver;

        report
            .check("url mentions pet", async {
                let url = driver.current_url().await?;
                Ok(Verdict::pass_or_fail(
                    url.to_lowercase().contains("pet"),
                    format!("landed on {url}"),
                    format!("redirected away to {url}"),
                ))
            })
            .await;

        report
            .check("title present", async {
                let title = driver.title().await?;
                Ok(Verdict::pass_or_fail(
                    !title.trim().is_empty(),
                    format!("title {title:?}"),
                    "document title is empty",
                ))
            })
            .await;
        Ok(())
    }
}
