//! PawFinder scenario catalog.
//!
//! | name            | covers                                             |
//! |-----------------|----------------------------------------------------|
//! | `homepage`      | h1 present, Sign In link, View Details button      |
//! | `home-pets`     | search, navigation, pet cards, filters, favorites  |
//! | `pet-details`   | `/pets/{id}` loads with a title                    |
//! | `sign-in`       | sign-in form, validation, login, extras, a11y      |
//! | `marketplace`   | optional login, product listing                    |
//! | `veterinary`    | vet listing, search, filters, viewports, load time |
//! | `adoption-form` | fill and submit the adoption form                  |

mod adoption_form;
mod home_pets;
mod homepage;
mod marketplace;
mod pet_details;
mod sign_in;
mod veterinary;

pub use adoption_form::AdoptionForm;
pub use home_pets::HomePets;
pub use homepage::Homepage;
pub use marketplace::Marketplace;
pub use pet_details::PetDetails;
pub use sign_in::SignIn;
pub use veterinary::Veterinary;

use crate::config::ProbeConfig;
use crate::driver::{ElementHandle, ProbeDriver};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::Scenario;
use crate::wait::{wait_for, Condition};
use std::sync::Arc;
use std::time::Duration;

/// Every scenario, in the order `run` executes them by default
#[must_use]
pub fn catalog<D: ProbeDriver>() -> Vec<Arc<dyn Scenario<D>>> {
    let scenarios: [Arc<dyn Scenario<D>>; 7] = [
        Arc::new(Homepage),
        Arc::new(HomePets),
        Arc::new(PetDetails),
        Arc::new(SignIn),
        Arc::new(Marketplace),
        Arc::new(Veterinary),
        Arc::new(AdoptionForm),
    ];
    Vec::from(scenarios)
}

/// `(name, description)` of every scenario in catalog order
#[must_use]
pub fn listing() -> Vec<(&'static str, &'static str)> {
    catalog::<crate::mock::MockDriver>()
        .iter()
        .map(|s| (s.name(), s.description()))
        .collect()
}

/// Pick scenarios by name, keeping catalog order. Empty selects all.
pub fn select<D: ProbeDriver>(names: &[String]) -> ProbeResult<Vec<Arc<dyn Scenario<D>>>> {
    let all = catalog::<D>();
    if let Some(unknown) = names
        .iter()
        .find(|n| !all.iter().any(|s| s.name() == n.as_str()))
    {
        let known: Vec<&str> = all.iter().map(|s| s.name()).collect();
        return Err(ProbeError::Config {
            message: format!(
                "unknown scenario {unknown:?}, expected one of: {}",
                known.join(", ")
            ),
        });
    }
    if names.is_empty() {
        return Ok(all);
    }
    Ok(all
        .into_iter()
        .filter(|s| names.iter().any(|n| n == s.name()))
        .collect())
}

/// Navigate to a route, wait for the document, then let scripts settle
pub(crate) async fn open<D>(driver: &mut D, config: &ProbeConfig, route: &str) -> ProbeResult<()>
where
    D: ProbeDriver + ?Sized,
{
    visit(driver, config, &config.url(route)).await
}

/// Like [`open`] with an absolute URL
pub(crate) async fn visit<D>(driver: &mut D, config: &ProbeConfig, url: &str) -> ProbeResult<()>
where
    D: ProbeDriver + ?Sized,
{
    tracing::info!(%url, "opening");
    driver.navigate(url).await?;
    wait_for(
        &*driver,
        &Condition::DocumentReady,
        &config.timing.page_load_options(),
    )
    .await?;
    pause(config.timing.settle()).await;
    Ok(())
}

pub(crate) async fn pause(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Short description of an element for notes: its text, else a label attribute
pub(crate) async fn describe<D>(driver: &D, element: &ElementHandle) -> String
where
    D: ProbeDriver + ?Sized,
{
    if let Ok(text) = driver.text(element).await {
        let text = text.trim();
        if !text.is_empty() {
            return truncate(text, 40);
        }
    }
    for name in ["aria-label", "placeholder", "name", "href"] {
        if let Ok(Some(value)) = driver.get_attribute(element, name).await {
            if !value.is_empty() {
                return truncate(&value, 40);
            }
        }
    }
    element.to_string()
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::{ProbeConfig, Timing};

    /// Config with millisecond pauses, served from `http://app`
    pub(crate) fn fast_config() -> ProbeConfig {
        ProbeConfig::default()
            .with_base_url("http://app")
            .with_timing(Timing {
                wait_timeout_ms: 40,
                poll_interval_ms: 5,
                settle_ms: 1,
                short_settle_ms: 1,
                page_load_timeout_ms: 40,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    #[test]
    fn test_catalog_names_are_unique() {
        let names: Vec<&str> = catalog::<MockDriver>().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "homepage",
                "home-pets",
                "pet-details",
                "sign-in",
                "marketplace",
                "veterinary",
                "adoption-form"
            ]
        );
    }

    #[test]
    fn test_listing_has_descriptions() {
        let listing = listing();
        assert_eq!(listing.len(), 7);
        assert_eq!(listing[0].0, "homepage");
        assert!(listing.iter().all(|(_, description)| !description.is_empty()));
    }

    #[test]
    fn test_select_keeps_catalog_order() {
        let picked = select::<MockDriver>(&["veterinary".to_string(), "homepage".to_string()])
            .unwrap();
        let names: Vec<&str> = picked.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["homepage", "veterinary"]);
    }

    #[test]
    fn test_select_rejects_unknown() {
        let err = select::<MockDriver>(&["checkout".to_string()]).err().unwrap();
        assert!(err.to_string().contains("checkout"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 3), "abc...");
    }
}
