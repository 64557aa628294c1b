//! Browser seam used by the UI cases

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

/// Element lookup strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
    Tag(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Locator::Tag(name.into())
    }

    /// XPath matching any element whose text contains `text`
    pub fn containing_text(text: &str) -> Self {
        Locator::XPath(format!("//*[contains(text(), '{}')]", text))
    }

    /// W3C `using` strategy name
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css selector",
            Locator::XPath(_) => "xpath",
            Locator::Tag(_) => "tag name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Locator::Css(value) | Locator::XPath(value) | Locator::Tag(value) => value,
        }
    }
}

/// Plain strings are CSS selectors
impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.strategy(), self.value())
    }
}

/// Opaque element reference handed out by a [`Browser`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

/// One live browser session
///
/// `find` fails with [`WebUiError::NoSuchElement`](crate::WebUiError::NoSuchElement)
/// when nothing matches; `find_all` returns an empty list instead.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn refresh(&self) -> Result<()>;

    async fn title(&self) -> Result<String>;

    async fn current_url(&self) -> Result<String>;

    async fn page_source(&self) -> Result<String>;

    async fn find(&self, locator: &Locator) -> Result<ElementRef>;

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementRef>>;

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>>;

    async fn clear(&self, element: &ElementRef) -> Result<()>;

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()>;

    async fn click(&self, element: &ElementRef) -> Result<()>;

    async fn text(&self, element: &ElementRef) -> Result<String>;

    /// End the session; the browser must not be used afterwards
    async fn quit(&self) -> Result<()>;
}

/// Opens a fresh browser session per case
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Browser>>;
}
