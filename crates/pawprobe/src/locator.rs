//! Locators and candidate sets.
//!
//! A [`Locator`] is one speculative way of finding an element; a
//! [`CandidateSet`] is the ordered list of locators that all try to find the
//! element playing one functional role ("search input", "submit button").
//! Earlier entries are tried first. Sets are never deduplicated.
//!
//! Locators are usually written as strings:
//!
//! ```text
//! css:button[type=submit]          structural CSS selector
//! xpath://button[text()='Sign In'] XPath expression
//! text:View Details                any element whose own text contains this
//! attr:aria-label*=favorite        attribute substring (or `name=value`, or `name`)
//! button:contains('Sign In')       CSS with a text filter
//! //a[contains(., 'Adopt')]        unprefixed, starts with `/` -> XPath
//! .pet-card                        unprefixed -> CSS
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Kind tag of a locator, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorKind {
    /// Structural CSS query
    Css,
    /// XPath query
    XPath,
    /// Text-contains query
    Text,
    /// Attribute-based query
    Attribute,
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Text => "text",
            Self::Attribute => "attr",
        };
        f.write_str(name)
    }
}

/// How an attribute locator matches the attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    /// Attribute is present
    Present,
    /// Attribute value contains the needle
    Contains(String),
    /// Attribute value equals the value
    Equals(String),
}

/// Selector for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Any element whose own text contains the string
    Text(String),
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// Attribute selector
    Attribute {
        /// Attribute name
        name: String,
        /// Match mode
        matcher: AttrMatch,
    },
}

/// Query a driver can execute directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Run as CSS
    Css(String),
    /// Run as XPath
    XPath(String),
    /// Run as CSS, keep elements whose text contains `text`
    CssFilteredByText {
        /// CSS selector
        css: String,
        /// Required text
        text: String,
    },
}

fn contains_pseudo() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(?P<css>.*?):contains\(\s*['"](?P<text>.*)['"]\s*\)$"#)
            .expect("static pattern compiles")
    })
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Parse a locator string (see module docs for the accepted forms)
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("css:") {
            return Self::parse_css(rest.trim());
        }
        if let Some(rest) = raw.strip_prefix("xpath:") {
            return Self::XPath(rest.trim().to_string());
        }
        if let Some(rest) = raw.strip_prefix("text:") {
            return Self::Text(rest.trim().to_string());
        }
        if let Some(rest) = raw.strip_prefix("attr:") {
            return Self::parse_attr(rest.trim());
        }
        if raw.starts_with('/') || raw.starts_with("./") || raw.starts_with('(') {
            return Self::XPath(raw.to_string());
        }
        Self::parse_css(raw)
    }

    fn parse_css(raw: &str) -> Self {
        match contains_pseudo().captures(raw) {
            Some(caps) => {
                let css = caps.name("css").map_or("", |m| m.as_str()).trim();
                let text = caps.name("text").map_or("", |m| m.as_str());
                Self::CssWithText {
                    css: if css.is_empty() { "*" } else { css }.to_string(),
                    text: text.to_string(),
                }
            }
            None => Self::Css(raw.to_string()),
        }
    }

    fn parse_attr(raw: &str) -> Self {
        if let Some((name, needle)) = raw.split_once("*=") {
            Self::Attribute {
                name: name.trim().to_string(),
                matcher: AttrMatch::Contains(needle.trim().to_string()),
            }
        } else if let Some((name, value)) = raw.split_once('=') {
            Self::Attribute {
                name: name.trim().to_string(),
                matcher: AttrMatch::Equals(value.trim().to_string()),
            }
        } else {
            Self::Attribute {
                name: raw.to_string(),
                matcher: AttrMatch::Present,
            }
        }
    }

    /// Kind tag of this selector
    #[must_use]
    pub const fn kind(&self) -> LocatorKind {
        match self {
            Self::Css(_) | Self::CssWithText { .. } => LocatorKind::Css,
            Self::XPath(_) => LocatorKind::XPath,
            Self::Text(_) => LocatorKind::Text,
            Self::Attribute { .. } => LocatorKind::Attribute,
        }
    }

    /// Lower this selector into a query a driver can run
    #[must_use]
    pub fn to_query(&self) -> Query {
        match self {
            Self::Css(css) => Query::Css(css.clone()),
            Self::XPath(expr) => Query::XPath(expr.clone()),
            Self::Text(text) => Query::XPath(format!(
                "//*[contains(text(), {})]",
                xpath_literal(text)
            )),
            Self::CssWithText { css, text } => Query::CssFilteredByText {
                css: css.clone(),
                text: text.clone(),
            },
            Self::Attribute { name, matcher } => Query::Css(match matcher {
                AttrMatch::Present => format!("[{name}]"),
                AttrMatch::Contains(needle) => format!("[{name}*={}]", css_string(needle)),
                AttrMatch::Equals(value) => format!("[{name}={}]", css_string(value)),
            }),
        }
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css:{css}"),
            Self::XPath(expr) => write!(f, "xpath:{expr}"),
            Self::Text(text) => write!(f, "text:{text}"),
            Self::CssWithText { css, text } => write!(f, "css:{css}:contains('{text}')"),
            Self::Attribute { name, matcher } => match matcher {
                AttrMatch::Present => write!(f, "attr:{name}"),
                AttrMatch::Contains(needle) => write!(f, "attr:{name}*={needle}"),
                AttrMatch::Equals(value) => write!(f, "attr:{name}={value}"),
            },
        }
    }
}

/// Quote a string as an XPath 1.0 literal
#[must_use]
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{s}'")
    } else if !s.contains('"') {
        format!("\"{s}\"")
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Quote a string as a CSS attribute value
#[must_use]
pub fn css_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// One candidate in a [`CandidateSet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    /// What to query
    pub selector: Selector,
    /// Position in the candidate list, 0 is tried first
    pub rank: usize,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.rank, self.selector)
    }
}

/// Ordered locators sharing one functional role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    role: String,
    locators: Vec<Locator>,
}

impl CandidateSet {
    /// Create an empty candidate set for a role
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            locators: Vec::new(),
        }
    }

    /// Build a set from locator strings, in priority order
    #[must_use]
    pub fn of<'a>(role: impl Into<String>, raw: impl IntoIterator<Item = &'a str>) -> Self {
        raw.into_iter()
            .fold(Self::new(role), |set, r| set.with(Selector::parse(r)))
    }

    /// Append a locator with the next rank
    #[must_use]
    pub fn with(mut self, selector: impl Into<Selector>) -> Self {
        let rank = self.locators.len();
        self.locators.push(Locator {
            selector: selector.into(),
            rank,
        });
        self
    }

    /// Append a CSS locator
    #[must_use]
    pub fn css(self, css: impl Into<String>) -> Self {
        self.with(Selector::Css(css.into()))
    }

    /// Append an XPath locator
    #[must_use]
    pub fn xpath(self, expr: impl Into<String>) -> Self {
        self.with(Selector::XPath(expr.into()))
    }

    /// Append a text-contains locator
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.with(Selector::Text(text.into()))
    }

    /// Role name, for diagnostics only
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Locators in priority order
    #[must_use]
    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    /// Number of locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether the set has no locators
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}
