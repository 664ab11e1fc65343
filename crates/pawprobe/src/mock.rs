//! Scripted in-memory driver.
//!
//! [`MockDriver`] serves pages registered ahead of time. Each page is a flat
//! list of elements plus a query table mapping locator strings to the ids
//! they match, so tests state exactly which locator finds what instead of
//! relying on a selector engine. Clicks, Enter presses and option
//! selections can be scripted to navigate or mutate the page.
//!
//! The driver is cheaply cloneable and every clone shares state, which lets
//! a test keep a handle for inspection after giving the driver away.

use crate::driver::{ElementHandle, ProbeDriver};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Scripted element
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Element id, unique within its page
    pub id: String,
    /// Tag name
    pub tag: String,
    /// Visible text
    pub text: String,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Rendered and visible
    pub displayed: bool,
    /// Not disabled
    pub enabled: bool,
    /// Checked / selected
    pub selected: bool,
    /// Rendered height in pixels
    pub height: f64,
    /// Option count, for `<select>`
    pub options: usize,
}

impl MockElement {
    /// Visible, enabled element with no text
    #[must_use]
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            text: String::new(),
            attributes: BTreeMap::new(),
            displayed: true,
            enabled: true,
            selected: false,
            height: 20.0,
            options: 0,
        }
    }

    /// Set visible text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mark checked / selected
    #[must_use]
    pub fn checked(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Set rendered height
    #[must_use]
    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Give a `<select>` this many options
    #[must_use]
    pub fn options(mut self, count: usize) -> Self {
        self.options = count;
        self
    }

    fn handle(&self) -> ElementHandle {
        ElementHandle::new(&self.id, &self.tag)
    }
}

/// Scripted reaction to an interaction
#[derive(Debug, Clone, PartialEq)]
pub enum MockEffect {
    /// Go to another registered page
    Navigate(String),
    /// Change an attribute of an element on the current page
    SetAttribute {
        /// Element id
        element: String,
        /// Attribute name
        name: String,
        /// New value
        value: String,
    },
    /// Replace the current page's markup
    SetSource(String),
    /// Flip the selected state of an element
    ToggleSelected(String),
}

/// Scripted page
#[derive(Debug, Clone)]
pub struct MockPage {
    title: String,
    source: String,
    ready_state: String,
    redirect: Option<String>,
    elements: Vec<MockElement>,
    queries: HashMap<String, Vec<String>>,
    children: HashMap<(String, String), Vec<String>>,
    failing_queries: HashSet<String>,
    failing_actions: HashSet<String>,
    failing_probes: HashSet<String>,
    on_click: HashMap<String, Vec<MockEffect>>,
    on_enter: HashMap<String, Vec<MockEffect>>,
    on_select: HashMap<String, Vec<MockEffect>>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self {
            title: String::new(),
            source: "<html><body></body></html>".to_string(),
            ready_state: "complete".to_string(),
            redirect: None,
            elements: Vec::new(),
            queries: HashMap::new(),
            children: HashMap::new(),
            failing_queries: HashSet::new(),
            failing_actions: HashSet::new(),
            failing_probes: HashSet::new(),
            on_click: HashMap::new(),
            on_enter: HashMap::new(),
            on_select: HashMap::new(),
        }
    }
}

fn query_key(raw: &str) -> String {
    Selector::parse(raw).to_string()
}

impl MockPage {
    /// Set document title
    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    /// Set page markup
    pub fn source(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = source.into();
        self
    }

    /// Set `document.readyState`
    pub fn ready_state(&mut self, state: impl Into<String>) -> &mut Self {
        self.ready_state = state.into();
        self
    }

    /// Visiting this page lands on `url` instead
    pub fn redirect(&mut self, url: impl Into<String>) -> &mut Self {
        self.redirect = Some(url.into());
        self
    }

    /// Add an element, matched by each of `locators`, in document order
    pub fn add(&mut self, element: MockElement, locators: &[&str]) -> &mut Self {
        for raw in locators {
            self.queries
                .entry(query_key(raw))
                .or_default()
                .push(element.id.clone());
        }
        self.elements.push(element);
        self
    }

    /// Make `locator` evaluated inside `parent` match `ids`
    pub fn within(&mut self, parent: &str, locator: &str, ids: &[&str]) -> &mut Self {
        self.children
            .entry((parent.to_string(), query_key(locator)))
            .or_default()
            .extend(ids.iter().map(|id| (*id).to_string()));
        self
    }

    /// Evaluating `locator` raises a query error
    pub fn fail_query(&mut self, locator: &str) -> &mut Self {
        self.failing_queries.insert(query_key(locator));
        self
    }

    /// Interactions with `id` raise an action error
    pub fn fail_actions(&mut self, id: &str) -> &mut Self {
        self.failing_actions.insert(id.to_string());
        self
    }

    /// Visibility/enablement probes on `id` raise
    pub fn fail_probes(&mut self, id: &str) -> &mut Self {
        self.failing_probes.insert(id.to_string());
        self
    }

    /// Script a reaction to clicking `id`
    pub fn on_click(&mut self, id: &str, effect: MockEffect) -> &mut Self {
        self.on_click.entry(id.to_string()).or_default().push(effect);
        self
    }

    /// Script a reaction to pressing Enter in `id`
    pub fn on_enter(&mut self, id: &str, effect: MockEffect) -> &mut Self {
        self.on_enter.entry(id.to_string()).or_default().push(effect);
        self
    }

    /// Script a reaction to selecting an option of `id`
    pub fn on_select(&mut self, id: &str, effect: MockEffect) -> &mut Self {
        self.on_select.entry(id.to_string()).or_default().push(effect);
        self
    }

    fn element(&self, id: &str) -> Option<&MockElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    fn handles(&self, ids: Option<&Vec<String>>) -> Vec<ElementHandle> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.element(id))
            .map(MockElement::handle)
            .collect()
    }
}

#[derive(Debug, Default)]
struct MockState {
    pages: HashMap<String, MockPage>,
    current: String,
    back_stack: Vec<String>,
    call_history: Vec<String>,
    quit_count: usize,
    window: Option<(u32, u32)>,
}

impl MockState {
    fn page(&self) -> Option<&MockPage> {
        self.pages.get(&self.current)
    }

    fn page_mut(&mut self) -> &mut MockPage {
        self.pages.entry(self.current.clone()).or_default()
    }

    fn go(&mut self, url: &str) {
        let target = self
            .pages
            .get(url)
            .and_then(|p| p.redirect.clone())
            .unwrap_or_else(|| url.to_string());
        if !self.current.is_empty() {
            self.back_stack.push(std::mem::take(&mut self.current));
        }
        self.current = target;
    }

    fn element(&self, handle: &ElementHandle) -> ProbeResult<&MockElement> {
        self.page()
            .and_then(|p| p.element(&handle.id))
            .ok_or_else(|| ProbeError::StaleElement {
                id: handle.id.clone(),
            })
    }

    fn check_action(&self, action: &str, handle: &ElementHandle) -> ProbeResult<&MockElement> {
        let element = self.element(handle)?;
        if self
            .page()
            .is_some_and(|p| p.failing_actions.contains(&handle.id))
        {
            return Err(ProbeError::action(
                action,
                format!("element {handle} is not interactable"),
            ));
        }
        Ok(element)
    }

    fn check_probe(&self, handle: &ElementHandle) -> ProbeResult<&MockElement> {
        let element = self.element(handle)?;
        if self
            .page()
            .is_some_and(|p| p.failing_probes.contains(&handle.id))
        {
            return Err(ProbeError::script(format!("probe on {handle} threw")));
        }
        Ok(element)
    }

    fn apply(&mut self, effects: Vec<MockEffect>) {
        for effect in effects {
            match effect {
                MockEffect::Navigate(url) => self.go(&url),
                MockEffect::SetAttribute {
                    element,
                    name,
                    value,
                } => {
                    if let Some(el) = self.page_mut().element_mut(&element) {
                        el.attributes.insert(name, value);
                    }
                }
                MockEffect::SetSource(source) => self.page_mut().source = source,
                MockEffect::ToggleSelected(element) => {
                    if let Some(el) = self.page_mut().element_mut(&element) {
                        el.selected = !el.selected;
                    }
                }
            }
        }
    }

    fn scripted(&self, trigger: Trigger, id: &str) -> Vec<MockEffect> {
        let Some(page) = self.page() else {
            return Vec::new();
        };
        let table = match trigger {
            Trigger::Click => &page.on_click,
            Trigger::Enter => &page.on_enter,
            Trigger::Select => &page.on_select,
        };
        table.get(id).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Click,
    Enter,
    Select,
}

/// Mock driver for unit testing
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(state: &mut MockState, call: String) {
        state.call_history.push(call);
    }

    /// Register or edit the page served at `url`
    pub fn page(&self, url: &str, build: impl FnOnce(&mut MockPage)) -> &Self {
        let mut state = self.state();
        build(state.pages.entry(url.to_string()).or_default());
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// How many times `quit` ran
    #[must_use]
    pub fn quit_count(&self) -> usize {
        self.state().quit_count
    }

    /// Last viewport size set
    #[must_use]
    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.state().window
    }
}

#[async_trait]
impl ProbeDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        let mut state = self.state();
        Self::record(&mut state, format!("navigate:{url}"));
        state.go(url);
        Ok(())
    }

    async fn back(&mut self) -> ProbeResult<()> {
        let mut state = self.state();
        Self::record(&mut state, "back".to_string());
        if let Some(previous) = state.back_stack.pop() {
            state.current = previous;
        }
        Ok(())
    }

    async fn refresh(&mut self) -> ProbeResult<()> {
        Self::record(&mut self.state(), "refresh".to_string());
        Ok(())
    }

    async fn set_window_size(&mut self, width: u32, height: u32) -> ProbeResult<()> {
        let mut state = self.state();
        Self::record(&mut state, format!("set_window_size:{width}x{height}"));
        state.window = Some((width, height));
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state().current.clone())
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(self
            .state()
            .page()
            .map(|p| p.title.clone())
            .unwrap_or_default())
    }

    async fn page_source(&self) -> ProbeResult<String> {
        Ok(self
            .state()
            .page()
            .map_or_else(|| MockPage::default().source, |p| p.source.clone()))
    }

    async fn ready_state(&self) -> ProbeResult<String> {
        Ok(self
            .state()
            .page()
            .map_or_else(|| "complete".to_string(), |p| p.ready_state.clone()))
    }

    async fn find(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        let mut state = self.state();
        let key = selector.to_string();
        Self::record(&mut state, format!("find:{key}"));
        let Some(page) = state.page() else {
            return Ok(Vec::new());
        };
        if page.failing_queries.contains(&key) {
            return Err(ProbeError::query(&key, "invalid selector"));
        }
        Ok(page.handles(page.queries.get(&key)))
    }

    async fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbeResult<Vec<ElementHandle>> {
        let state = self.state();
        state.element(parent)?;
        let key = selector.to_string();
        let Some(page) = state.page() else {
            return Ok(Vec::new());
        };
        if page.failing_queries.contains(&key) {
            return Err(ProbeError::query(&key, "invalid selector"));
        }
        Ok(page.handles(page.children.get(&(parent.id.clone(), key))))
    }

    async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut state = self.state();
        state.check_action("click", element)?;
        Self::record(&mut state, format!("click:{}", element.id));
        let effects = state.scripted(Trigger::Click, &element.id);
        state.apply(effects);
        Ok(())
    }

    async fn js_click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut state = self.state();
        state.element(element)?;
        Self::record(&mut state, format!("js_click:{}", element.id));
        let effects = state.scripted(Trigger::Click, &element.id);
        state.apply(effects);
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let mut state = self.state();
        state.check_action("send_keys", element)?;
        Self::record(&mut state, format!("send_keys:{}:{text}", element.id));
        if let Some(el) = state.page_mut().element_mut(&element.id) {
            el.attributes
                .entry("value".to_string())
                .or_default()
                .push_str(text);
        }
        Ok(())
    }

    async fn press_enter(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut state = self.state();
        state.check_action("press_enter", element)?;
        Self::record(&mut state, format!("press_enter:{}", element.id));
        let effects = state.scripted(Trigger::Enter, &element.id);
        state.apply(effects);
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut state = self.state();
        state.check_action("clear", element)?;
        Self::record(&mut state, format!("clear:{}", element.id));
        if let Some(el) = state.page_mut().element_mut(&element.id) {
            el.attributes.remove("value");
        }
        Ok(())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        Ok(self.state().check_probe(element)?.displayed)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool> {
        Ok(self.state().check_probe(element)?.enabled)
    }

    async fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool> {
        Ok(self.state().check_probe(element)?.selected)
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> ProbeResult<Option<String>> {
        Ok(self.state().element(element)?.attributes.get(name).cloned())
    }

    async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        Ok(self.state().element(element)?.text.clone())
    }

    async fn height(&self, element: &ElementHandle) -> ProbeResult<f64> {
        Ok(self.state().element(element)?.height)
    }

    async fn option_count(&self, element: &ElementHandle) -> ProbeResult<usize> {
        Ok(self.state().element(element)?.options)
    }

    async fn select_index(&self, element: &ElementHandle, index: usize) -> ProbeResult<()> {
        let mut state = self.state();
        let options = state.check_action("select", element)?.options;
        if index >= options {
            return Err(ProbeError::action(
                "select",
                format!("{element} has no option at index {index}"),
            ));
        }
        Self::record(&mut state, format!("select:{}:{index}", element.id));
        let effects = state.scripted(Trigger::Select, &element.id);
        state.apply(effects);
        Ok(())
    }

    async fn quit(&mut self) -> ProbeResult<()> {
        let mut state = self.state();
        Self::record(&mut state, "quit".to_string());
        state.quit_count += 1;
        Ok(())
    }
}
