//! Chromium over the Chrome DevTools Protocol.
//!
//! Element handles live in a page-side registry (`window.__pawprobe`) that
//! maps ids to DOM nodes. Every document gets its own random id prefix, so
//! a handle taken before a navigation never resolves in the new document
//! and surfaces as [`ProbeError::StaleElement`](crate::ProbeError::StaleElement).
//!
//! The script builders are plain functions so they can be checked without
//! a browser; the driver itself needs the `browser` feature.

use crate::locator::Query;
use crate::result::ProbeError;
use std::fmt;

/// Global that holds the element registry
const REGISTRY: &str = "window.__pawprobe";

fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn registry_init() -> String {
    format!(
        "const reg = ({REGISTRY} ??= {{ prefix: Math.random().toString(36).slice(2, 8), next: 0, nodes: new Map(), ids: new WeakMap() }});\n\
         const register = (el) => {{\n\
           let id = reg.ids.get(el);\n\
           if (id === undefined) {{ id = reg.prefix + '-' + (reg.next++); reg.ids.set(el, id); reg.nodes.set(id, el); }}\n\
           return {{ id, tag: el.tagName.toLowerCase() }};\n\
         }};"
    )
}

fn collect(query: &Query, scope: &str) -> String {
    match query {
        Query::Css(css) => format!("Array.from({scope}.querySelectorAll({}))", js_string(css)),
        Query::XPath(expr) => format!(
            "(() => {{ const snap = document.evaluate({}, {scope}, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);\n\
               const out = []; for (let i = 0; i < snap.snapshotLength; i++) {{ const n = snap.snapshotItem(i); if (n instanceof Element) out.push(n); }}\n\
               return out; }})()",
            js_string(expr)
        ),
        Query::CssFilteredByText { css, text } => format!(
            "Array.from({scope}.querySelectorAll({})).filter((el) => (el.textContent || '').includes({}))",
            js_string(css),
            js_string(text)
        ),
    }
}

/// Script returning `{ matches: [{id, tag}] }`, or `{ stale: true }` when
/// the scope element is gone
pub(crate) fn find_script(query: &Query, parent: Option<&str>) -> String {
    let scope = match parent {
        Some(id) => format!(
            "const scope = reg.nodes.get({});\n\
             if (!scope || !scope.isConnected) return {{ stale: true }};",
            js_string(id)
        ),
        None => "const scope = document;".to_string(),
    };
    format!(
        "(() => {{\n{}\n{scope}\nreturn {{ matches: {}.map(register) }};\n}})()",
        registry_init(),
        collect(query, "scope")
    )
}

/// Script running `body` with `el` bound to the registered element,
/// returning `{ value }` or `{ stale: true }`
pub(crate) fn element_script(id: &str, body: &str) -> String {
    format!(
        "(() => {{\n\
           const el = {REGISTRY} && {REGISTRY}.nodes.get({});\n\
           if (!el || !el.isConnected) return {{ stale: true }};\n\
           return {{ value: (() => {{ {body} }})() }};\n\
         }})()",
        js_string(id)
    )
}

pub(crate) const IS_DISPLAYED: &str = "const style = getComputedStyle(el);\n\
    return style.visibility !== 'hidden' && style.display !== 'none' && \
    !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);";

pub(crate) const IS_ENABLED: &str = "return !el.disabled;";

pub(crate) const IS_SELECTED: &str = "return !!(el.checked || el.selected);";

pub(crate) const TEXT: &str = "return el.innerText ?? el.textContent ?? '';";

pub(crate) const HEIGHT: &str = "return el.getBoundingClientRect().height;";

pub(crate) const OPTION_COUNT: &str = "return el.options ? el.options.length : 0;";

pub(crate) const JS_CLICK: &str = "el.click(); return true;";

pub(crate) const FOCUS: &str = "el.focus(); return true;";

pub(crate) const CENTER: &str = "el.scrollIntoView({ block: 'center', inline: 'center' });\n\
    const r = el.getBoundingClientRect();\n\
    return { x: r.left + r.width / 2, y: r.top + r.height / 2 };";

pub(crate) const CLEAR: &str = "el.focus();\n\
    const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value');\n\
    if (setter && setter.set) { setter.set.call(el, ''); } else { el.value = ''; }\n\
    el.dispatchEvent(new Event('input', { bubbles: true }));\n\
    el.dispatchEvent(new Event('change', { bubbles: true }));\n\
    return true;";

pub(crate) fn attribute_body(name: &str) -> String {
    format!(
        "const name = {};\n\
         const prop = el[name];\n\
         if (typeof prop === 'string' || typeof prop === 'number') return String(prop);\n\
         if (typeof prop === 'boolean') return prop ? 'true' : null;\n\
         return el.getAttribute(name);",
        js_string(name)
    )
}

pub(crate) fn select_body(index: usize) -> String {
    format!(
        "if (!el.options || el.options.length <= {index}) return false;\n\
         el.selectedIndex = {index};\n\
         el.dispatchEvent(new Event('input', {{ bubbles: true }}));\n\
         el.dispatchEvent(new Event('change', {{ bubbles: true }}));\n\
         return true;"
    )
}

/// Error for a browser that would not close
pub(crate) fn close_error(e: impl fmt::Display) -> ProbeError {
    ProbeError::action("quit", e)
}

#[cfg(feature = "browser")]
mod cdp {
    use super::{
        attribute_body, element_script, find_script, select_body, CENTER, CLEAR, FOCUS, HEIGHT,
        IS_DISPLAYED, IS_ENABLED, IS_SELECTED, JS_CLICK, OPTION_COUNT, TEXT,
    };
    use crate::config::ProbeConfig;
    use crate::driver::{DriverFactory, ElementHandle, ProbeDriver};
    use crate::locator::Selector;
    use crate::result::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
    };
    use chromiumoxide::layout::Point;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Found {
        id: String,
        tag: String,
    }

    #[derive(Debug, Deserialize)]
    struct FindReply {
        #[serde(default)]
        stale: bool,
        #[serde(default)]
        matches: Vec<Found>,
    }

    #[derive(Debug, Deserialize)]
    struct ElementReply {
        #[serde(default)]
        stale: bool,
        #[serde(default)]
        value: serde_json::Value,
    }

    #[derive(Debug, Deserialize)]
    struct Center {
        x: f64,
        y: f64,
    }

    /// Chromium session driven over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: CdpBrowser,
        page: CdpPage,
        handler: tokio::task::JoinHandle<()>,
    }

    impl ChromiumDriver {
        /// Launch Chromium configured from `config` and open a blank page
        pub async fn launch(config: &ProbeConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.window_width, config.window_height)
                .arg("--disable-dev-shm-usage");
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                if !path.exists() {
                    return Err(ProbeError::BrowserNotFound);
                }
                builder = builder.chrome_executable(path);
            }
            let cdp_config = builder.build().map_err(|message| {
                if config.chromium_path.is_none() {
                    tracing::error!(%message, "no chromium executable detected");
                    ProbeError::BrowserNotFound
                } else {
                    ProbeError::BrowserLaunch { message }
                }
            })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ProbeError::BrowserLaunch {
                        message: e.to_string(),
                    })?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;
            let mut driver = Self {
                browser,
                page,
                handler,
            };
            driver
                .set_window_size(config.window_width, config.window_height)
                .await?;
            tracing::info!(headless = config.headless, "chromium launched");
            Ok(driver)
        }

        async fn eval<T: DeserializeOwned>(&self, script: String) -> ProbeResult<T> {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| ProbeError::script(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| ProbeError::script(e.to_string()))
        }

        async fn on_element<T: DeserializeOwned>(
            &self,
            element: &ElementHandle,
            body: &str,
        ) -> ProbeResult<T> {
            let reply: ElementReply = self.eval(element_script(&element.id, body)).await?;
            if reply.stale {
                return Err(ProbeError::StaleElement {
                    id: element.id.clone(),
                });
            }
            Ok(serde_json::from_value(reply.value)?)
        }

        async fn query(
            &self,
            selector: &Selector,
            parent: Option<&ElementHandle>,
        ) -> ProbeResult<Vec<ElementHandle>> {
            let script = find_script(&selector.to_query(), parent.map(|p| p.id.as_str()));
            let reply: FindReply = self
                .eval(script)
                .await
                .map_err(|e| ProbeError::query(selector.to_string(), e.to_string()))?;
            if reply.stale {
                return Err(ProbeError::StaleElement {
                    id: parent.map(|p| p.id.clone()).unwrap_or_default(),
                });
            }
            Ok(reply
                .matches
                .into_iter()
                .map(|m| ElementHandle::new(m.id, m.tag))
                .collect())
        }

        async fn enter_key(&self, down: bool) -> ProbeResult<()> {
            let kind = if down {
                DispatchKeyEventType::KeyDown
            } else {
                DispatchKeyEventType::KeyUp
            };
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key("Enter")
                .code("Enter")
                .windows_virtual_key_code(13);
            if down {
                builder = builder.text("\r");
            }
            let params = builder
                .build()
                .map_err(|message| ProbeError::action("press_enter", message))?;
            self.page
                .execute(params)
                .await
                .map_err(|e| ProbeError::action("press_enter", e.to_string()))?;
            Ok(())
        }
    }

    #[async_trait]
    impl ProbeDriver for ChromiumDriver {
        async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| ProbeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn back(&mut self) -> ProbeResult<()> {
            let _: bool = self
                .eval("(() => { history.back(); return true; })()".to_string())
                .await?;
            Ok(())
        }

        async fn refresh(&mut self) -> ProbeResult<()> {
            self.page
                .reload()
                .await
                .map_err(|e| ProbeError::Navigation {
                    url: "(reload)".to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn set_window_size(&mut self, width: u32, height: u32) -> ProbeResult<()> {
            let params =
                SetDeviceMetricsOverrideParams::new(i64::from(width), i64::from(height), 1.0, false);
            self.page
                .execute(params)
                .await
                .map_err(|e| ProbeError::action("set_window_size", e.to_string()))?;
            Ok(())
        }

        async fn current_url(&self) -> ProbeResult<String> {
            let url = self
                .page
                .url()
                .await
                .map_err(|e| ProbeError::script(e.to_string()))?;
            Ok(url.unwrap_or_default())
        }

        async fn title(&self) -> ProbeResult<String> {
            self.eval("document.title".to_string()).await
        }

        async fn page_source(&self) -> ProbeResult<String> {
            self.page
                .content()
                .await
                .map_err(|e| ProbeError::script(e.to_string()))
        }

        async fn ready_state(&self) -> ProbeResult<String> {
            self.eval("document.readyState".to_string()).await
        }

        async fn find(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
            self.query(selector, None).await
        }

        async fn find_within(
            &self,
            parent: &ElementHandle,
            selector: &Selector,
        ) -> ProbeResult<Vec<ElementHandle>> {
            self.query(selector, Some(parent)).await
        }

        async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
            let center: Center = self.on_element(element, CENTER).await?;
            self.page
                .click(Point {
                    x: center.x,
                    y: center.y,
                })
                .await
                .map_err(|e| ProbeError::action("click", e.to_string()))?;
            Ok(())
        }

        async fn js_click(&self, element: &ElementHandle) -> ProbeResult<()> {
            let _: bool = self.on_element(element, JS_CLICK).await?;
            Ok(())
        }

        async fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
            let _: bool = self.on_element(element, FOCUS).await?;
            self.page
                .execute(InsertTextParams::new(text))
                .await
                .map_err(|e| ProbeError::action("send_keys", e.to_string()))?;
            Ok(())
        }

        async fn press_enter(&self, element: &ElementHandle) -> ProbeResult<()> {
            let _: bool = self.on_element(element, FOCUS).await?;
            self.enter_key(true).await?;
            self.enter_key(false).await
        }

        async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
            let _: bool = self.on_element(element, CLEAR).await?;
            Ok(())
        }

        async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
            self.on_element(element, IS_DISPLAYED).await
        }

        async fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool> {
            self.on_element(element, IS_ENABLED).await
        }

        async fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool> {
            self.on_element(element, IS_SELECTED).await
        }

        async fn get_attribute(
            &self,
            element: &ElementHandle,
            name: &str,
        ) -> ProbeResult<Option<String>> {
            self.on_element(element, &attribute_body(name)).await
        }

        async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
            self.on_element(element, TEXT).await
        }

        async fn height(&self, element: &ElementHandle) -> ProbeResult<f64> {
            self.on_element(element, HEIGHT).await
        }

        async fn option_count(&self, element: &ElementHandle) -> ProbeResult<usize> {
            self.on_element(element, OPTION_COUNT).await
        }

        async fn select_index(&self, element: &ElementHandle, index: usize) -> ProbeResult<()> {
            let selected: bool = self.on_element(element, &select_body(index)).await?;
            if !selected {
                return Err(ProbeError::action(
                    "select",
                    format!("{element} has no option at index {index}"),
                ));
            }
            Ok(())
        }

        async fn quit(&mut self) -> ProbeResult<()> {
            let closed = self.browser.close().await;
            self.handler.abort();
            closed.map_err(super::close_error)?;
            tracing::debug!("chromium closed");
            Ok(())
        }
    }

    /// Launches one [`ChromiumDriver`] per scenario
    #[derive(Debug, Clone)]
    pub struct ChromiumFactory {
        config: ProbeConfig,
    }

    impl ChromiumFactory {
        /// Create a factory for `config`
        #[must_use]
        pub const fn new(config: ProbeConfig) -> Self {
            Self { config }
        }
    }

    #[async_trait]
    impl DriverFactory for ChromiumFactory {
        type Driver = ChromiumDriver;

        async fn launch(&self) -> ProbeResult<ChromiumDriver> {
            ChromiumDriver::launch(&self.config).await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, ChromiumFactory};
