//! Pet discovery features on the homepage.
//!
//! Every feature here is optional in the application, so a missing control
//! makes its check inconclusive rather than failed. Actions are verified by
//! watching the URL, the markup or the clicked element's attributes.

use super::{describe, open};
use crate::config::ProbeConfig;
use crate::driver::ProbeDriver;
use crate::locator::{CandidateSet, Selector};
use crate::resolver::{resolve, resolve_all, ContentFilter, Criteria, Requirement};
use crate::result::ProbeResult;
use crate::scenario::{Scenario, ScenarioReport, Verdict};
use crate::verify::{observe, Watch};
use async_trait::async_trait;

const SEARCH_TERMS: [&str; 2] = ["dog", "cat"];

/// Words a pet card shows somewhere in its text
const PET_CARD_KEYWORDS: [&str; 7] = ["breed", "age", "adopt", "months", "years", "male", "female"];

/// Cards shorter than this are badges or chips, not listings
const PET_CARD_MIN_HEIGHT: f64 = 50.0;

/// Search, navigation, pet cards, filters and favorites on `/`
#[derive(Debug, Clone, Copy, Default)]
pub struct HomePets;

fn search_input() -> CandidateSet {
    CandidateSet::of(
        "search input",
        [
            "input[type='search']",
            "input[placeholder*='search' i]",
            "input[placeholder*='find' i]",
            "input[placeholder*='pet' i]",
            "input[name*='search']",
            "[data-testid*='search']",
            ".search-input",
            "#search",
            ".pet-search",
        ],
    )
}

fn search_results() -> CandidateSet {
    CandidateSet::of(
        "search results",
        [
            ".search-results",
            ".results",
            ".pet-results",
            "[data-testid*='results']",
            ".pets",
            ".listings",
        ],
    )
}

fn pet_navigation() -> CandidateSet {
    CandidateSet::of(
        "pet navigation",
        [
            "a[href*='adopt']",
            "a[href*='pets']",
            "a[href*='find']",
            "button:contains('Find')",
            "button:contains('Adopt')",
            ".cta-button",
            ".find-pets",
            ".adopt-button",
            "[data-testid*='adopt']",
            "[data-testid*='find']",
            "nav a",
            ".navigation a",
            "//a[contains(text(), 'Find') or contains(text(), 'Adopt') or contains(text(), 'Browse')]",
            "//button[contains(text(), 'Find') or contains(text(), 'Adopt') or contains(text(), 'Browse')]",
        ],
    )
}

fn pet_cards() -> CandidateSet {
    CandidateSet::of(
        "pet card",
        [
            ".pet-card",
            ".pet-item",
            ".pet",
            ".animal-card",
            "[data-testid*='pet']",
            ".card",
            ".listing",
            ".featured-pets .card",
            ".pets-grid > div",
            ".adoption-card",
            ".pet-profile",
        ],
    )
}

fn featured_section() -> CandidateSet {
    CandidateSet::of(
        "featured pets section",
        [
            ".featured",
            ".featured-pets",
            ".available-pets",
            "[data-testid*='featured']",
            ".pets-section",
        ],
    )
}

fn filters() -> CandidateSet {
    CandidateSet::of(
        "pet filter",
        [
            "select[name*='animal']",
            "select[name*='breed']",
            "select[name*='age']",
            ".filter",
            ".filter-select",
            "[data-testid*='filter']",
            "select[name*='type']",
            "select[name*='size']",
            ".pet-filters select",
            ".search-filters select",
            "button[data-filter]",
            ".filter-button",
            ".filter-chip",
            "input[type='checkbox'][name*='animal']",
            "input[type='radio'][name*='pet']",
        ],
    )
}

fn favorites() -> CandidateSet {
    CandidateSet::of(
        "favorite button",
        [
            ".favorite",
            ".heart",
            ".love",
            ".save",
            "[data-testid*='favorite']",
            "[data-testid*='heart']",
            "button[aria-label*='favorite']",
            ".wishlist",
            ".fa-heart",
            ".heart-icon",
            "//button[contains(@aria-label, 'favorite') or contains(text(), '♥') or contains(text(), '🤍') or contains(text(), '❤')]",
        ],
    )
}

fn notifications() -> CandidateSet {
    CandidateSet::of(
        "notification",
        [
            ".notification",
            ".toast",
            ".alert",
            ".message",
            "[data-testid*='notification']",
        ],
    )
}

async fn search<D: ProbeDriver>(driver: &mut D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    open(driver, config, "/").await?;
    let driver = &*driver;
    let Some(input) = resolve(driver, &search_input(), Requirement::VisibleEnabled).await else {
        return Ok(Verdict::inconclusive("no search input on the homepage"));
    };

    for term in SEARCH_TERMS {
        let submitted = observe(driver, &Watch::Url, config.timing.settle(), async {
            driver.clear(&input.element).await?;
            driver.send_keys(&input.element, term).await?;
            driver.press_enter(&input.element).await
        })
        .await;
        match submitted {
            Ok(effect) if effect.is_observed() => {
                let url = driver.current_url().await?;
                return Ok(Verdict::pass(format!("searching {term:?} navigated to {url}")));
            }
            Ok(_) => {
                if let Some(results) =
                    resolve(driver, &search_results(), Requirement::PresentOnly).await
                {
                    return Ok(Verdict::pass(format!(
                        "results for {term:?} shown in {}",
                        results.selector
                    )));
                }
            }
            Err(e) => tracing::warn!(term, error = %e, "search attempt failed"),
        }
    }
    Ok(Verdict::inconclusive("search behavior unclear"))
}

async fn find_pets_navigation<D: ProbeDriver>(
    driver: &mut D,
    config: &ProbeConfig,
) -> ProbeResult<Verdict> {
    open(driver, config, "/").await?;
    let driver = &*driver;
    let links = resolve_all(driver, &pet_navigation(), Requirement::Visible).await;
    if links.is_empty() {
        return Ok(Verdict::inconclusive("no pet navigation found"));
    }

    for link in links.iter().take(3) {
        let label = describe(driver, link).await;
        let clicked = observe(driver, &Watch::Url, config.timing.settle(), async {
            driver.js_click(link).await
        })
        .await;
        match clicked {
            Ok(effect) if effect.is_observed() => {
                let url = driver.current_url().await?;
                let lowered = url.to_lowercase();
                if ["pet", "adopt", "find"].iter().any(|k| lowered.contains(k)) {
                    return Ok(Verdict::pass(format!("{label:?} led to {url}")));
                }
                tracing::debug!(%label, %url, "navigation left for an unrelated page");
            }
            Ok(_) => tracing::debug!(%label, "click did not navigate"),
            Err(e) => tracing::debug!(%label, error = %e, "navigation click failed"),
        }
    }
    Ok(Verdict::inconclusive(format!(
        "{} navigation element(s) found, none reached a pet page",
        links.len()
    )))
}

async fn cards<D: ProbeDriver>(driver: &mut D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let home = config.url("/");
    if driver.current_url().await? != home {
        open(driver, config, "/").await?;
    }
    let driver = &*driver;

    let criteria = Criteria::from(Requirement::Visible).filtered(
        ContentFilter::keywords(PET_CARD_KEYWORDS).min_height(PET_CARD_MIN_HEIGHT),
    );
    let found = resolve_all(driver, &pet_cards(), criteria).await;
    if let Some(first) = found.first() {
        let images = driver
            .find_within(first, &Selector::css("img"))
            .await
            .map(|imgs| imgs.len())
            .unwrap_or(0);
        return Ok(Verdict::pass(format!(
            "{} pet card(s), first: {:?} with {images} image(s)",
            found.len(),
            describe(driver, first).await
        )));
    }

    Ok(
        match resolve(driver, &featured_section(), Requirement::Visible).await {
            Some(section) => Verdict::pass(format!("pets section {}", section.selector)),
            None => Verdict::inconclusive("no pet cards on the homepage"),
        },
    )
}

async fn filtering<D: ProbeDriver>(driver: &D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let found = resolve_all(driver, &filters(), Requirement::Visible).await;
    let Some(first) = found.first() else {
        return Ok(Verdict::inconclusive("no pet filters found"));
    };

    let settle = config.timing.short_settle();
    let effect = if first.is_tag("select") {
        if driver.option_count(first).await? < 2 {
            return Ok(Verdict::inconclusive(format!("{first} has a single option")));
        }
        observe(driver, &Watch::PageSource, settle, driver.select_index(first, 1)).await?
    } else if first.is_tag("button") {
        observe(driver, &Watch::PageSource, settle, driver.js_click(first)).await?
    } else {
        return Ok(Verdict::inconclusive(format!(
            "{} filter(s) found, {first} is not testable",
            found.len()
        )));
    };
    Ok(Verdict::pass_or_inconclusive(
        effect.is_observed(),
        format!("{first} updated the content"),
        format!("{first} did not visibly change the content"),
    ))
}

async fn favorite<D: ProbeDriver>(driver: &D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let found = resolve_all(driver, &favorites(), Requirement::Visible).await;
    let Some(first) = found.first() else {
        return Ok(Verdict::inconclusive("no favorite buttons found"));
    };

    let watch = Watch::attributes(first, ["class", "aria-label"]);
    let effect = observe(driver, &watch, config.timing.short_settle(), driver.js_click(first)).await?;
    if effect.is_observed() {
        return Ok(Verdict::pass(format!("{first} changed state")));
    }
    Ok(
        match resolve(driver, &notifications(), Requirement::Visible).await {
            Some(toast) => Verdict::pass(format!("feedback shown in {}", toast.selector)),
            None => Verdict::inconclusive(format!("{first} gave no visible feedback")),
        },
    )
}

#[async_trait]
impl<D: ProbeDriver> Scenario<D> for HomePets {
    fn name(&self) -> &'static str {
        "home-pets"
    }

    fn description(&self) -> &'static str {
        "Homepage search, pet navigation, cards, filters and favorites"
    }

    async fn run(
        &self,
        driver: &mut D,
        config: &ProbeConfig,
        report: &mut ScenarioReport,
    ) -> ProbeResult<()> {
        report.check("pet search", search(driver, config)).await;
        report
            .check("find pets navigation", find_pets_navigation(driver, config))
            .await;
        report.check("pet cards", cards(driver, config)).await;
        report.check("pet filters", filtering(&*driver, config)).await;
        report.check("favorites", favorite(&*driver, config)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockEffect, MockElement};
    use crate::scenario::CheckStatus;
    use crate::scenarios::testing::fast_config;

    fn homepage() -> MockDriver {
        let driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.add(
                MockElement::new("q", "input").attr("placeholder", "Search pets"),
                &["input[placeholder*='search' i]"],
            )
            .on_enter("q", MockEffect::Navigate("http://app/search?q=dog".into()))
            .add(
                MockElement::new("adopt", "a").text("Adopt").attr("href", "/pets"),
                &["a[href*='adopt']"],
            )
            .on_click("adopt", MockEffect::Navigate("http://app/pets".into()))
            .add(
                MockElement::new("card", "div")
                    .text("Buddy\nGolden Retriever, 2 years")
                    .height(240.0),
                &[".pet-card", ".card"],
            )
            .add(MockElement::new("badge", "div").text("New").height(20.0), &[".card"])
            .add(MockElement::new("photo", "img"), &[])
            .within("card", "img", &["photo"])
            .add(MockElement::new("kind", "select").options(3), &["select[name*='animal']"])
            .on_select("kind", MockEffect::SetSource("<div>Only cats</div>".into()))
            .add(
                MockElement::new("fav", "button").attr("class", "favorite"),
                &[".favorite"],
            )
            .on_click(
                "fav",
                MockEffect::SetAttribute {
                    element: "fav".into(),
                    name: "class".into(),
                    value: "favorite active".into(),
                },
            );
        });
        driver.page("http://app/search?q=dog", |_| {});
        driver.page("http://app/pets", |_| {});
        driver
    }

    #[tokio::test]
    async fn test_every_feature_verified() {
        let mut driver = homepage();
        let observer = driver.clone();
        let mut report = ScenarioReport::new("home-pets");
        HomePets
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.passed(), 5, "{report}");
        assert!(report.checks[0].note.contains("search?q=dog"));
        assert!(report.checks[2].note.starts_with("1 pet card(s)"));
        assert!(report.checks[2].note.contains("1 image(s)"));
        assert!(observer.was_called("select:kind:1"));
        assert!(observer.was_called("js_click:fav"));
    }

    #[tokio::test]
    async fn test_bare_homepage_is_inconclusive() {
        let mut driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.title("PawFinder");
        });
        let mut report = ScenarioReport::new("home-pets");
        HomePets
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.inconclusive(), 5);
        assert_eq!(report.verdict(), CheckStatus::Inconclusive);
    }

    #[tokio::test]
    async fn test_search_results_in_place() {
        let mut driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.add(MockElement::new("q", "input"), &["#search"])
                .add(MockElement::new("results", "div"), &[".results"]);
        });
        let verdict = search(&mut driver, &fast_config()).await.unwrap();
        assert_eq!(verdict.status, CheckStatus::Passed);
        assert!(verdict.note.contains("css:.results"));
    }

    #[tokio::test]
    async fn test_unchanged_favorite_falls_back_to_toast() {
        let driver = MockDriver::new();
        driver.page("http://app/", |p| {
            p.add(MockElement::new("fav", "button").text("♥"), &[".heart"])
                .add(MockElement::new("toast", "div"), &[".toast"]);
        });
        let mut nav = driver.clone();
        nav.navigate("http://app/").await.unwrap();
        let verdict = favorite(&driver, &fast_config()).await.unwrap();
        assert_eq!(verdict.status, CheckStatus::Passed);
        assert!(verdict.note.contains("css:.toast"));
    }
}
