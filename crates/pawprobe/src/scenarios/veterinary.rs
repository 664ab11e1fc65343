//! Veterinary directory page.

use super::{describe, open, pause};
use crate::config::ProbeConfig;
use crate::driver::ProbeDriver;
use crate::locator::{CandidateSet, Selector};
use crate::resolver::{resolve, resolve_all, ContentFilter, Criteria, Requirement};
use crate::result::ProbeResult;
use crate::scenario::{Scenario, ScenarioReport, Verdict};
use crate::wait::{wait_for, Condition};
use async_trait::async_trait;
use std::time::{Duration, Instant};

const ROUTE: &str = "/veterinary";

const PAGE_KEYWORDS: [&str; 5] = ["veterinary", "vet", "doctor", "clinic", "appointment"];

const SEARCH_TERMS: [&str; 4] = ["Dr", "Animal", "Pet", "Emergency"];

const VET_CARD_KEYWORDS: [&str; 5] = ["dr", "doctor", "vet", "dvm", "clinic"];

const FILTER_KEYWORDS: [&str; 5] = ["specialty", "location", "emergency", "filter", "category"];

const NAV_KEYWORDS: [&str; 5] = ["vet", "doctor", "appointment", "book", "emergency"];

/// Width at or below which a mobile menu is looked for
const MOBILE_BREAKPOINT: u32 = 768;

const VIEWPORTS: [(u32, u32, &str); 3] = [
    (1920, 1080, "desktop"),
    (768, 1024, "tablet"),
    (375, 667, "mobile"),
];

const GOOD_LOAD: Duration = Duration::from_secs(5);
const ACCEPTABLE_LOAD: Duration = Duration::from_secs(10);

/// Listing, search, filters, viewports and load time of `/veterinary`
#[derive(Debug, Clone, Copy, Default)]
pub struct Veterinary;

fn main_content() -> CandidateSet {
    CandidateSet::of(
        "main content",
        ["main", "section", ".container", "[data-testid]", ".veterinary", ".vet"],
    )
}

fn search_input() -> CandidateSet {
    CandidateSet::of(
        "vet search",
        [
            "input[type='search']",
            "input[placeholder*='search' i]",
            "input[placeholder*='vet' i]",
            "input[placeholder*='doctor' i]",
            "input[name*='search']",
            "[data-testid*='search']",
            ".search-input",
            "#search",
        ],
    )
}

fn vet_cards() -> CandidateSet {
    CandidateSet::of(
        "vet card",
        [
            ".vet-card",
            ".veterinarian-card",
            ".doctor-card",
            "[data-testid*='vet']",
            "[data-testid*='doctor']",
            ".card",
            ".listing",
            ".profile-card",
            ".grid > div",
            ".list-item",
        ],
    )
}

fn booking_button() -> Selector {
    Selector::xpath(
        ".//button[contains(text(), 'Book') or contains(text(), 'Contact') or contains(text(), 'Schedule')]",
    )
}

fn listing_states() -> CandidateSet {
    CandidateSet::of(
        "listing state",
        [
            ".no-results",
            ".empty-state",
            "[data-testid*='empty']",
            ".loading",
            ".spinner",
            "[data-testid*='loading']",
        ],
    )
}

fn navigation() -> CandidateSet {
    CandidateSet::of(
        "navigation",
        ["nav", ".navigation", ".navbar", ".header", "[data-testid*='nav']"],
    )
}

fn filter_controls() -> CandidateSet {
    CandidateSet::of(
        "filter",
        [
            "select",
            ".filter",
            ".category",
            "[data-testid*='filter']",
            "button[role='button']",
            ".dropdown",
        ],
    )
}

fn mobile_menu() -> CandidateSet {
    CandidateSet::of(
        "mobile menu",
        [".mobile-menu", "[data-testid*='mobile']", ".hamburger", ".menu-toggle"],
    )
}

async fn accessibility<D: ProbeDriver>(driver: &mut D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    open(driver, config, ROUTE).await?;
    let url = driver.current_url().await?;
    let source = driver.page_source().await?.to_lowercase();
    let keywords: Vec<&str> = PAGE_KEYWORDS
        .into_iter()
        .filter(|k| source.contains(k))
        .collect();
    let content = resolve(&*driver, &main_content(), Requirement::PresentOnly).await;

    if !url.to_lowercase().contains("veterinary") {
        return Ok(Verdict::fail(format!("landed on {url}")));
    }
    Ok(match (keywords.is_empty(), content) {
        (false, _) => Verdict::pass(format!("keywords: {}", keywords.join(", "))),
        (true, Some(content)) => Verdict::pass(format!("content in {}", content.selector)),
        (true, None) => Verdict::fail("no veterinary keywords or main content"),
    })
}

async fn search<D: ProbeDriver>(driver: &D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let Some(input) = resolve(driver, &search_input(), Requirement::Visible).await else {
        return Ok(Verdict::inconclusive("no search input, search may not be implemented"));
    };
    for term in SEARCH_TERMS {
        driver.clear(&input.element).await?;
        driver.send_keys(&input.element, term).await?;
        driver.press_enter(&input.element).await?;
        pause(config.timing.settle()).await;
        let source = driver.page_source().await?.to_lowercase();
        if source.contains(&term.to_lowercase()) {
            return Ok(Verdict::pass(format!("search for {term:?} shows matches")));
        }
    }
    Ok(Verdict::inconclusive("search exists but results unclear"))
}

async fn listings<D: ProbeDriver>(driver: &D) -> ProbeResult<Verdict> {
    let criteria = Criteria::from(Requirement::Visible)
        .filtered(ContentFilter::keywords(VET_CARD_KEYWORDS));
    let cards = resolve_all(driver, &vet_cards(), criteria).await;
    if let Some(first) = cards.first() {
        let buttons = driver
            .find_within(first, &booking_button())
            .await
            .map(|b| b.len())
            .unwrap_or(0);
        return Ok(Verdict::pass(format!(
            "{} listing(s), first {:?} with {buttons} booking button(s)",
            cards.len(),
            describe(driver, first).await
        )));
    }
    Ok(
        match resolve(driver, &listing_states(), Requirement::Visible).await {
            Some(state) => Verdict::inconclusive(format!("no listings, page shows {}", state.selector)),
            None => Verdict::inconclusive("no listings, data may be loading or empty"),
        },
    )
}

async fn navigation_and_filters<D: ProbeDriver>(driver: &D) -> ProbeResult<Verdict> {
    let mut notes = Vec::new();
    if let Some(nav) = resolve(driver, &navigation(), Requirement::Visible).await {
        let text = driver.text(&nav.element).await.unwrap_or_default().to_lowercase();
        let items: Vec<&str> = NAV_KEYWORDS.into_iter().filter(|k| text.contains(k)).collect();
        if items.is_empty() {
            notes.push(format!("navigation {}", nav.selector));
        } else {
            notes.push(format!("navigation {} ({})", nav.selector, items.join(", ")));
        }
    }

    let criteria = Criteria::from(Requirement::Visible)
        .filtered(ContentFilter::keywords(FILTER_KEYWORDS).in_attribute("placeholder"));
    let filters = resolve_all(driver, &filter_controls(), criteria).await;
    if !filters.is_empty() {
        notes.push(format!("{} filter(s)", filters.len()));
    }

    Ok(Verdict::pass_or_inconclusive(
        !notes.is_empty(),
        notes.join(", "),
        "no navigation or filters found",
    ))
}

async fn viewports<D: ProbeDriver>(driver: &mut D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let mut checked = Vec::with_capacity(VIEWPORTS.len());
    let mut broken = Vec::new();
    for (width, height, device) in VIEWPORTS {
        if let Err(e) = driver.set_window_size(width, height).await {
            tracing::warn!(device, error = %e, "resize failed");
            broken.push(device);
            continue;
        }
        pause(config.timing.settle()).await;
        match driver.find(&Selector::css("body")).await {
            Ok(body) if !body.is_empty() => {}
            _ => {
                broken.push(device);
                continue;
            }
        }
        if width <= MOBILE_BREAKPOINT {
            match resolve(&*driver, &mobile_menu(), Requirement::Visible).await {
                Some(menu) => checked.push(format!("{device} (menu {})", menu.selector)),
                None => checked.push(device.to_string()),
            }
        } else {
            checked.push(device.to_string());
        }
    }
    driver
        .set_window_size(config.window_width, config.window_height)
        .await?;

    Ok(Verdict::pass_or_fail(
        broken.is_empty(),
        format!("laid out at {}", checked.join(", ")),
        format!("no layout at {}", broken.join(", ")),
    ))
}

async fn load_time<D: ProbeDriver>(driver: &mut D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let options = config.timing.page_load_options();
    let start = Instant::now();
    driver.refresh().await?;
    match wait_for(&*driver, &Condition::DocumentReady, &options).await {
        Ok(_) => {}
        Err(e) if e.is_timeout() => {
            return Ok(Verdict::fail(format!(
                "page took longer than {}s to load",
                options.timeout().as_secs()
            )));
        }
        Err(e) => return Err(e),
    }
    let elapsed = start.elapsed();
    let seconds = elapsed.as_secs_f64();
    Ok(if elapsed < GOOD_LOAD {
        Verdict::pass(format!("good load time {seconds:.2}s"))
    } else if elapsed < ACCEPTABLE_LOAD {
        Verdict::pass(format!("acceptable load time {seconds:.2}s"))
    } else {
        Verdict::fail(format!("slow load time {seconds:.2}s"))
    })
}

#[async_trait]
impl<D: ProbeDriver> Scenario<D> for Veterinary {
    fn name(&self) -> &'static str {
        "veterinary"
    }

    fn description(&self) -> &'static str {
        "Veterinary page listings, search, filters, viewports and load time"
    }

    async fn run(
        &self,
        driver: &mut D,
        config: &ProbeConfig,
        report: &mut ScenarioReport,
    ) -> ProbeResult<()> {
        report
            .check("page accessibility", accessibility(driver, config))
            .await;
        report.check("vet search", search(&*driver, config)).await;
        report.check("vet listings", listings(&*driver)).await;
        report
            .check("navigation and filters", navigation_and_filters(&*driver))
            .await;
        report
            .check("responsive viewports", viewports(driver, config))
            .await;
        report.check("load performance", load_time(driver, config)).await;
        Ok(())
    }
}
