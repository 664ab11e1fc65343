//! Sign-in page checks.
//!
//! The sign-in page is located first, by probing the usual routes and then
//! by following a homepage link. Every later check starts from a fresh load
//! of that page so a submitted form does not leak into the next check.

use super::{describe, open, pause, visit};
use crate::config::ProbeConfig;
use crate::driver::{ElementHandle, ProbeDriver};
use crate::locator::{css_string, CandidateSet, Selector};
use crate::resolver::{resolve, resolve_all, Requirement};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Scenario, ScenarioReport, Verdict};
use crate::verify::{observe, Effect, Watch};
use async_trait::async_trait;
use std::time::Duration;

/// Routes probed, in order, before falling back to a homepage link
pub const SIGN_IN_ROUTES: [&str; 5] = [
    "/sign-in",
    "/signin",
    "/login",
    "/auth/signin",
    "/auth/login",
];

const SIGN_IN_INDICATORS: [&str; 5] = ["sign in", "login", "email", "password", "authenticate"];

const MALFORMED_EMAIL: &str = "notanemail";

const SOCIAL_PROVIDERS: [&str; 5] = ["google", "facebook", "twitter", "github", "apple"];

/// Sign-in form, validation, login and auxiliary controls
#[derive(Debug, Clone, Copy, Default)]
pub struct SignIn;

fn sign_in_links() -> CandidateSet {
    CandidateSet::of(
        "sign in link",
        [
            "a[href*='sign-in']",
            "a[href*='signin']",
            "a[href*='login']",
            "xpath://a[contains(text(), 'Sign In') or contains(text(), 'Login') or contains(text(), 'Sign in')]",
            "[data-testid*='signin']",
            "[data-testid*='login']",
            ".signin-link",
            ".login-link",
        ],
    )
}

fn email_field() -> CandidateSet {
    CandidateSet::of(
        "email field",
        [
            "input[type='email']",
            "input[name='email']",
            "input[id='email']",
            "input[name='username']",
            "input[id='username']",
            "input[placeholder*='email' i]",
            "input[placeholder*='username' i]",
            "[data-testid*='email']",
            "[data-testid*='username']",
        ],
    )
}

fn password_field() -> CandidateSet {
    CandidateSet::of(
        "password field",
        [
            "input[type='password']",
            "input[name='password']",
            "input[id='password']",
            "[data-testid*='password']",
            ".password-input",
        ],
    )
}

fn submit_button() -> CandidateSet {
    CandidateSet::of(
        "submit button",
        [
            "button[type='submit']",
            "input[type='submit']",
            "xpath://button[contains(text(), 'Sign In') or contains(text(), 'Login') or contains(text(), 'Submit')]",
            "[data-testid*='submit']",
            "[data-testid*='signin']",
            ".signin-btn",
            ".login-btn",
            ".submit-btn",
        ],
    )
}

fn validation_errors() -> CandidateSet {
    CandidateSet::of(
        "validation error",
        [
            ".error",
            ".error-message",
            ".field-error",
            ".validation-error",
            "[data-testid*='error']",
            ".invalid-feedback",
            ".form-error",
            ".text-red",
            ".text-danger",
            ".error-text",
        ],
    )
}

fn login_errors() -> CandidateSet {
    CandidateSet::of(
        "login error",
        [
            ".error",
            ".alert-danger",
            ".login-error",
            "[data-testid*='error']",
            ".auth-error",
        ],
    )
}

fn password_toggles() -> CandidateSet {
    CandidateSet::of(
        "password toggle",
        [
            ".password-toggle",
            ".show-password",
            ".toggle-password",
            "[data-testid*='toggle']",
            "[data-testid*='show']",
            "button[aria-label*='password']",
            ".eye-icon",
            ".fa-eye",
            ".password-reveal",
        ],
    )
}

fn remember_checkboxes() -> CandidateSet {
    CandidateSet::of(
        "remember me",
        [
            "input[name*='remember']",
            "input[id*='remember']",
            "[data-testid*='remember']",
            ".remember-me",
            "input[type='checkbox']",
        ],
    )
}

fn forgot_links() -> CandidateSet {
    CandidateSet::of(
        "forgot password",
        [
            "a[href*='forgot']",
            "a[href*='reset']",
            "a[href*='password']",
            "[data-testid*='forgot']",
            ".forgot-password",
            ".reset-password",
            "xpath://a[contains(text(), 'Forgot') or contains(text(), 'Reset') or contains(text(), 'password')]",
        ],
    )
}

fn social_buttons(provider: &str) -> CandidateSet {
    CandidateSet::new(format!("{provider} login"))
        .css(format!("[data-testid*='{provider}']"))
        .css(format!(".{provider}-login"))
        .css(format!(".signin-{provider}"))
        .css(format!("button[class*='{provider}']"))
        .css(format!("a[href*='{provider}']"))
}

fn generic_social_buttons() -> CandidateSet {
    CandidateSet::of(
        "social login",
        [
            ".social-login",
            ".oauth-button",
            ".third-party-login",
            "[data-testid*='social']",
            ".external-auth",
        ],
    )
}

/// Located form controls; any may be missing
#[derive(Debug, Default)]
struct Form {
    email: Option<ElementHandle>,
    password: Option<ElementHandle>,
    submit: Option<ElementHandle>,
}

impl Form {
    async fn locate<D: ProbeDriver>(driver: &D) -> Self {
        let usable = Requirement::VisibleEnabled;
        Self {
            email: resolve(driver, &email_field(), usable).await.map(|r| r.element),
            password: resolve(driver, &password_field(), usable)
                .await
                .map(|r| r.element),
            submit: resolve(driver, &submit_button(), usable).await.map(|r| r.element),
        }
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.email.is_none() {
            missing.push("email");
        }
        if self.password.is_none() {
            missing.push("password");
        }
        if self.submit.is_none() {
            missing.push("submit");
        }
        missing
    }
}

/// First visible element of `set` with non-empty text
async fn visible_message<D: ProbeDriver>(driver: &D, set: &CandidateSet) -> Option<String> {
    for element in resolve_all(driver, set, Requirement::Visible).await {
        if let Ok(text) = driver.text(&element).await {
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

async fn replace_value<D: ProbeDriver>(
    driver: &D,
    field: &ElementHandle,
    value: &str,
) -> ProbeResult<()> {
    driver.clear(field).await?;
    driver.send_keys(field, value).await
}

async fn looks_like_sign_in<D: ProbeDriver>(driver: &D, route: &str) -> ProbeResult<bool> {
    let title = driver.title().await?.to_lowercase();
    let source = driver.page_source().await?.to_lowercase();
    let url = driver.current_url().await?.to_lowercase();
    let indicated = SIGN_IN_INDICATORS
        .iter()
        .any(|i| title.contains(i) || source.contains(i))
        || url.contains(&route.to_lowercase());
    Ok(indicated && !title.contains("404"))
}

/// Probe the known routes, then try a homepage link
async fn locate_page<D: ProbeDriver>(driver: &mut D, config: &ProbeConfig) -> Option<String> {
    for route in SIGN_IN_ROUTES {
        if let Err(e) = open(driver, config, route).await {
            tracing::debug!(route, error = %e, "sign-in route unreachable");
            continue;
        }
        match looks_like_sign_in(driver, route).await {
            Ok(true) => return driver.current_url().await.ok(),
            Ok(false) => {}
            Err(e) => tracing::debug!(route, error = %e, "could not inspect page"),
        }
    }

    open(driver, config, "/").await.ok()?;
    let link = resolve(driver, &sign_in_links(), Requirement::Visible).await?;
    tracing::info!(locator = %link.selector, "following sign-in link from homepage");
    driver.click(&link.element).await.ok()?;
    pause(config.timing.settle()).await;
    driver.current_url().await.ok()
}

async fn form_elements<D: ProbeDriver>(driver: &D) -> ProbeResult<Verdict> {
    let form = Form::locate(driver).await;
    let missing = form.missing();
    if missing.is_empty() {
        let title = driver.title().await?;
        Ok(Verdict::pass(format!("email, password and submit found ({title})")))
    } else {
        Ok(Verdict::inconclusive(format!("missing: {}", missing.join(", "))))
    }
}

async fn form_validation<D: ProbeDriver>(driver: &D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let form = Form::locate(driver).await;
    if form.email.is_none() || form.submit.is_none() {
        return Ok(Verdict::inconclusive("email field or submit button not available"));
    }

    let mut notes = Vec::new();
    let mut evidence = false;
    for (step, outcome) in [
        ("empty submit", empty_submit(driver, config).await),
        ("malformed email", malformed_submit(driver, config).await),
    ] {
        match outcome {
            Ok(Some(note)) => {
                evidence = true;
                notes.push(note);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(step, error = %e, "validation step failed");
                notes.push(format!("{step} step failed: {e}"));
            }
        }
    }

    let detail = notes.join("; ");
    let missing = if detail.is_empty() {
        "no validation feedback observed".to_string()
    } else {
        format!("no validation feedback observed ({detail})")
    };
    Ok(Verdict::pass_or_inconclusive(evidence, detail, missing))
}

async fn empty_submit<D: ProbeDriver>(
    driver: &D,
    config: &ProbeConfig,
) -> ProbeResult<Option<String>> {
    let form = Form::locate(driver).await;
    let (Some(email), Some(submit)) = (&form.email, &form.submit) else {
        return Ok(None);
    };
    driver.click(submit).await?;
    pause(config.timing.settle()).await;
    if let Some(message) = visible_message(driver, &validation_errors()).await {
        return Ok(Some(format!("empty submit shows {message:?}")));
    }
    Ok(driver
        .get_attribute(email, "required")
        .await?
        .map(|_| "email field is required".to_string()))
}

/// Runs against a fresh lookup, the empty submit may have re-rendered the form
async fn malformed_submit<D: ProbeDriver>(
    driver: &D,
    config: &ProbeConfig,
) -> ProbeResult<Option<String>> {
    let form = Form::locate(driver).await;
    let (Some(email), Some(submit)) = (&form.email, &form.submit) else {
        return Err(ProbeError::query(
            "sign-in form",
            "form not available after empty submit",
        ));
    };
    replace_value(driver, email, MALFORMED_EMAIL).await?;
    if let Some(password) = &form.password {
        replace_value(driver, password, "somepassword").await?;
    }
    driver.click(submit).await?;
    pause(config.timing.settle()).await;
    let url = driver.current_url().await?.to_lowercase();
    let stayed = url.contains("sign") || url.contains("login");
    Ok(stayed.then(|| "malformed email rejected".to_string()))
}

async fn login_attempt<D: ProbeDriver>(driver: &D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let form = Form::locate(driver).await;
    let (Some(email), Some(password), Some(submit)) = (&form.email, &form.password, &form.submit)
    else {
        return Ok(Verdict::inconclusive("login form not available"));
    };

    replace_value(driver, email, &config.sign_in.email).await?;
    replace_value(driver, password, &config.sign_in.password).await?;
    let initial = driver.current_url().await?;
    driver.click(submit).await?;
    pause(config.timing.settle()).await;
    let landed = driver.current_url().await?;

    if landed != initial {
        let lower = landed.to_lowercase();
        let reading = if ["dashboard", "profile", "home", "account"]
            .iter()
            .any(|d| lower.contains(d))
        {
            "likely logged in"
        } else if lower.contains("sign") || lower.contains("login") {
            "returned to login, auth likely failed"
        } else {
            "redirected elsewhere"
        };
        return Ok(Verdict::pass(format!("submitted, now at {landed} ({reading})")));
    }
    Ok(match visible_message(driver, &login_errors()).await {
        Some(message) => Verdict::pass(format!("login rejected: {message}")),
        None => Verdict::inconclusive("form submitted but no clear feedback"),
    })
}

async fn password_toggle<D: ProbeDriver>(driver: &D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let Some(password) = resolve(driver, &password_field(), Requirement::VisibleEnabled)
        .await
        .map(|r| r.element)
    else {
        return Ok(Verdict::inconclusive("password field not available"));
    };

    let mut toggles = resolve_all(driver, &password_toggles(), Requirement::Visible).await;
    if let Some(parent) = driver
        .find_within(&password, &Selector::xpath(".."))
        .await
        .ok()
        .and_then(|parents| parents.into_iter().next())
    {
        for toggle in driver
            .find_within(&parent, &Selector::css("button, .toggle, .icon"))
            .await
            .unwrap_or_default()
        {
            if driver.is_displayed(&toggle).await.unwrap_or(false) {
                toggles.push(toggle);
            }
        }
    }
    let Some(toggle) = toggles.first() else {
        return Ok(Verdict::inconclusive("no password visibility toggle found"));
    };

    driver.send_keys(&password, "testpassword").await?;
    let before = driver.get_attribute(&password, "type").await?;
    let effect = observe(
        driver,
        &Watch::attributes(&password, ["type"]),
        config.timing.short_settle(),
        driver.click(toggle),
    )
    .await?;
    let after = driver.get_attribute(&password, "type").await?;
    driver.clear(&password).await?;
    Ok(Verdict::pass_or_inconclusive(
        effect.is_observed(),
        format!(
            "type {} -> {}",
            before.as_deref().unwrap_or("?"),
            after.as_deref().unwrap_or("?")
        ),
        "toggle clicked but type did not change",
    ))
}

async fn label_text<D: ProbeDriver>(driver: &D, element: &ElementHandle) -> String {
    if let Ok(Some(id)) = driver.get_attribute(element, "id").await {
        let for_label = Selector::css(format!("label[for={}]", css_string(&id)));
        if let Ok(Some(label)) = driver.find(&for_label).await.map(|l| l.into_iter().next()) {
            return driver.text(&label).await.unwrap_or_default().to_lowercase();
        }
    }
    match driver.find_within(element, &Selector::xpath("..")).await {
        Ok(parents) => match parents.first() {
            Some(parent) => driver.text(parent).await.unwrap_or_default().to_lowercase(),
            None => String::new(),
        },
        Err(_) => String::new(),
    }
}

async fn remember_me<D: ProbeDriver>(driver: &D, config: &ProbeConfig) -> ProbeResult<Verdict> {
    let mut checkbox = None;
    for candidate in resolve_all(driver, &remember_checkboxes(), Requirement::Visible).await {
        let label = label_text(driver, &candidate).await;
        if label.contains("remember") || label.contains("keep") {
            checkbox = Some(candidate);
            break;
        }
    }
    let Some(checkbox) = checkbox else {
        return Ok(Verdict::inconclusive("no remember-me checkbox found"));
    };

    let before = driver.is_selected(&checkbox).await?;
    driver.click(&checkbox).await?;
    pause(config.timing.short_settle()).await;
    let after = driver.is_selected(&checkbox).await?;
    Ok(Verdict::pass_or_inconclusive(
        before != after,
        format!("checkbox {before} -> {after}"),
        "checkbox state did not change",
    ))
}

async fn forgot_password<D: ProbeDriver>(
    driver: &mut D,
    config: &ProbeConfig,
) -> ProbeResult<Verdict> {
    let Some(link) = resolve(driver, &forgot_links(), Requirement::Visible).await else {
        return Ok(Verdict::inconclusive("no forgot-password link found"));
    };
    let effect = observe(
        &*driver,
        &Watch::Url,
        config.timing.settle(),
        driver.click(&link.element),
    )
    .await?;
    if effect == Effect::Unclear {
        return Ok(Verdict::inconclusive("link clicked but no navigation"));
    }
    let target = driver.current_url().await?;
    driver.back().await?;
    pause(config.timing.short_settle()).await;
    Ok(Verdict::pass(format!("navigated to {target}")))
}

async fn social_login<D: ProbeDriver>(
    driver: &mut D,
    config: &ProbeConfig,
) -> ProbeResult<Verdict> {
    let mut found: Vec<(String, ElementHandle)> = Vec::new();
    for provider in SOCIAL_PROVIDERS {
        if let Some(button) = resolve(&*driver, &social_buttons(provider), Requirement::Visible).await
        {
            found.push((provider.to_string(), button.element));
        }
    }
    for button in resolve_all(&*driver, &generic_social_buttons(), Requirement::Visible).await {
        let label = describe(&*driver, &button).await;
        found.push((label, button));
    }
    let Some((first, button)) = found.first().cloned() else {
        return Ok(Verdict::inconclusive("no social login options found"));
    };

    let providers: Vec<&str> = found.iter().map(|(p, _)| p.as_str()).collect();
    let effect = observe(
        &*driver,
        &Watch::Url,
        config.timing.settle(),
        driver.click(&button),
    )
    .await?;
    let outcome = if effect.is_observed() {
        let target = driver.current_url().await?;
        driver.back().await?;
        pause(config.timing.short_settle()).await;
        format!("{first} redirected to {target}")
    } else {
        format!("{first} clicked, no redirect")
    };
    Ok(Verdict::pass(format!(
        "{} option(s): {}; {outcome}",
        found.len(),
        providers.join(", ")
    )))
}

async fn accessibility<D: ProbeDriver>(driver: &D) -> ProbeResult<Verdict> {
    let form = Form::locate(driver).await;
    let fields = [("email", &form.email), ("password", &form.password)];
    if fields.iter().all(|(_, f)| f.is_none()) {
        return Ok(Verdict::inconclusive("no form fields to inspect"));
    }

    let mut score = 0;
    let mut notes = Vec::new();
    for (name, field) in fields {
        let Some(field) = field else { continue };
        if driver.get_attribute(field, "aria-label").await?.is_some() {
            score += 1;
            notes.push(format!("{name} aria-label"));
        }
        if let Some(id) = driver.get_attribute(field, "id").await? {
            let label = Selector::css(format!("label[for={}]", css_string(&id)));
            if !driver.find(&label).await.unwrap_or_default().is_empty() {
                score += 1;
                notes.push(format!("{name} label"));
            }
        }
        if driver.get_attribute(field, "placeholder").await?.is_some() {
            score += 1;
            notes.push(format!("{name} placeholder"));
        }
    }
    Ok(Verdict::pass_or_inconclusive(
        score > 0,
        format!("score {score}/6: {}", notes.join(", ")),
        "fields have no aria-label, label or placeholder",
    ))
}

#[async_trait]
impl<D: ProbeDriver> Scenario<D> for SignIn {
    fn name(&self) -> &'static str {
        "sign-in"
    }

    fn description(&self) -> &'static str {
        "Sign-in form, validation, login attempt, toggles, links and accessibility"
    }

    async fn run(
        &self,
        driver: &mut D,
        config: &ProbeConfig,
        report: &mut ScenarioReport,
    ) -> ProbeResult<()> {
        let located = locate_page(driver, config).await;
        let page = match &located {
            Some(url) => {
                report.record(
                    "locate sign-in page",
                    Verdict::pass(url.clone()),
                    Duration::ZERO,
                );
                url.clone()
            }
            None => {
                report.record(
                    "locate sign-in page",
                    Verdict::fail("could not find a sign-in page"),
                    Duration::ZERO,
                );
                return Ok(());
            }
        };

        report.check("form elements", form_elements(driver)).await;

        visit(driver, config, &page).await?;
        report
            .check("form validation", form_validation(driver, config))
            .await;

        visit(driver, config, &page).await?;
        report
            .check("login attempt", login_attempt(driver, config))
            .await;

        visit(driver, config, &page).await?;
        report
            .check("password toggle", password_toggle(driver, config))
            .await;
        report.check("remember me", remember_me(driver, config)).await;
        report
            .check("forgot password", forgot_password(driver, config))
            .await;

        visit(driver, config, &page).await?;
        report
            .check("social login", social_login(driver, config))
            .await;
        report.check("accessibility", accessibility(driver)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockEffect, MockElement};
    use crate::scenario::CheckStatus;
    use crate::scenarios::testing::fast_config;

    fn sign_in_site() -> MockDriver {
        let driver = MockDriver::new();
        driver.page("http://app/sign-in", |p| {
            p.title("Sign In | PawFinder")
                .add(
                    MockElement::new("email", "input")
                        .attr("id", "email")
                        .attr("placeholder", "Email")
                        .attr("required", "true"),
                    &["input[type='email']"],
                )
                .add(
                    MockElement::new("pw", "input").attr("type", "password"),
                    &["input[type='password']"],
                )
                .add(MockElement::new("pw-wrap", "div"), &[])
                .add(MockElement::new("eye", "button"), &[])
                .add(MockElement::new("email-label", "label").text("Email"), &[r#"label[for="email"]"#])
                .add(MockElement::new("go", "button").text("Sign In"), &["button[type='submit']"])
                .add(
                    MockElement::new("err", "p").text("Invalid email or password"),
                    &[".error"],
                )
                .add(
                    MockElement::new("remember", "input").attr("id", "remember"),
                    &["input[name*='remember']"],
                )
                .add(
                    MockElement::new("remember-label", "label").text("Remember me"),
                    &[r#"label[for="remember"]"#],
                )
                .add(MockElement::new("forgot", "a").text("Forgot password?"), &["a[href*='forgot']"])
                .add(MockElement::new("g", "button").text("Continue with Google"), &["[data-testid*='google']"])
                .within("pw", "xpath:..", &["pw-wrap"])
                .within("pw-wrap", "button, .toggle, .icon", &["eye"])
                .on_click(
                    "eye",
                    MockEffect::SetAttribute {
                        element: "pw".into(),
                        name: "type".into(),
                        value: "text".into(),
                    },
                )
                .on_click("remember", MockEffect::ToggleSelected("remember".into()))
                .on_click("forgot", MockEffect::Navigate("http://app/forgot-password".into()));
        });
        driver
    }

    #[tokio::test]
    async fn test_full_sign_in_page() {
        let mut driver = sign_in_site();
        let observer = driver.clone();
        let mut report = ScenarioReport::new("sign-in");
        SignIn
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();

        let status = |name: &str| {
            report
                .checks
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.status)
        };
        assert_eq!(status("locate sign-in page"), Some(CheckStatus::Passed));
        assert_eq!(status("form elements"), Some(CheckStatus::Passed));
        assert_eq!(status("form validation"), Some(CheckStatus::Passed));
        assert_eq!(status("login attempt"), Some(CheckStatus::Passed));
        assert_eq!(status("password toggle"), Some(CheckStatus::Passed));
        assert_eq!(status("remember me"), Some(CheckStatus::Passed));
        assert_eq!(status("forgot password"), Some(CheckStatus::Passed));
        assert_eq!(status("social login"), Some(CheckStatus::Passed));
        assert_eq!(status("accessibility"), Some(CheckStatus::Passed));
        assert_eq!(report.verdict(), CheckStatus::Passed, "{report}");
        assert!(observer.was_called("send_keys:email:testuser@pawfinder.com"));
        assert!(observer.was_called("back"));
    }

    #[tokio::test]
    async fn test_validation_survives_untypeable_email() {
        let mut driver = sign_in_site();
        driver.page("http://app/sign-in", |p| {
            p.fail_actions("email");
        });
        driver.navigate("http://app/sign-in").await.unwrap();

        let verdict = form_validation(&driver, &fast_config()).await.unwrap();
        assert_eq!(verdict.status, CheckStatus::Passed, "{}", verdict.note);
        assert!(verdict.note.contains("Invalid email"), "{}", verdict.note);
        assert!(verdict.note.contains("malformed email step failed"), "{}", verdict.note);
    }

    #[tokio::test]
    async fn test_validation_errors_without_feedback_are_inconclusive() {
        let mut driver = sign_in_site();
        driver.page("http://app/sign-in", |p| {
            p.fail_actions("email").fail_actions("go");
        });
        driver.navigate("http://app/sign-in").await.unwrap();

        let verdict = form_validation(&driver, &fast_config()).await.unwrap();
        assert_eq!(verdict.status, CheckStatus::Inconclusive, "{}", verdict.note);
        assert!(verdict.note.contains("empty submit step failed"), "{}", verdict.note);
        assert!(verdict.note.contains("not interactable"), "{}", verdict.note);
    }

    #[tokio::test]
    async fn test_label_lookup_quotes_the_id() {
        let mut driver = MockDriver::new();
        driver.page("http://app/adopt", |p| {
            p.add(
                MockElement::new("name", "input").attr("id", r#"pet"name"#),
                &["input"],
            )
            .add(
                MockElement::new("name-label", "label").text("Pet Name"),
                &[r#"label[for="pet\"name"]"#],
            );
        });
        driver.navigate("http://app/adopt").await.unwrap();

        let field = driver.find(&Selector::css("input")).await.unwrap().remove(0);
        assert_eq!(label_text(&driver, &field).await, "pet name");
    }

    #[tokio::test]
    async fn test_falls_back_to_homepage_link() {
        let mut driver = MockDriver::new();
        for route in SIGN_IN_ROUTES {
            driver.page(&format!("http://app{route}"), |p| {
                p.title("404 Not Found");
            });
        }
        driver.page("http://app/", |p| {
            p.add(
                MockElement::new("link", "a").text("Login"),
                &["a[href*='login']"],
            )
            .on_click("link", MockEffect::Navigate("http://app/account/enter".into()));
        });

        let located = locate_page(&mut driver, &fast_config()).await;
        assert_eq!(located.as_deref(), Some("http://app/account/enter"));
    }

    #[tokio::test]
    async fn test_no_page_found_fails_and_stops() {
        let mut driver = MockDriver::new();
        for route in SIGN_IN_ROUTES {
            driver.page(&format!("http://app{route}"), |p| {
                p.title("404");
            });
        }
        let mut report = ScenarioReport::new("sign-in");
        SignIn
            .run(&mut driver, &fast_config(), &mut report)
            .await
            .unwrap();
        assert_eq!(report.checks.len(), 1);
        assert_eq!(report.verdict(), CheckStatus::Failed);
    }
}
