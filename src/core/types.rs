use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::core::error::Result;

/// How the pipeline asks a rendered page for something it can click.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Any CSS selector understood by the provider.
    Css(String),
    /// A `<span>` whose trimmed text equals the given string.
    SpanText(String),
    /// An `<a>` whose `href` attribute equals the given URL.
    LinkHref(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "css `{}`", css),
            Locator::SpanText(text) => write!(f, "span with text {:?}", text),
            Locator::LinkHref(href) => write!(f, "link to {}", href),
        }
    }
}

/// Opaque reference to an element previously returned by `find_clickable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub locator: Locator,
}

/// The rendered-page collaborator: a browser session or anything that can
/// stand in for one.
///
/// Implementations report a missing element as
/// [`HarvestError::ElementNotFound`](crate::HarvestError::ElementNotFound) and
/// reserve every other error for faults the run cannot continue past.
#[async_trait]
pub trait PageProvider: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn current_html(&mut self) -> Result<String>;

    /// Wait up to `timeout` for an element matching `locator` to become
    /// clickable.
    async fn find_clickable(&mut self, locator: &Locator, timeout: Duration)
        -> Result<ElementHandle>;

    async fn click(&mut self, element: &ElementHandle) -> Result<()>;

    /// Release the session. Called exactly once when a harvest run ends,
    /// successful or not.
    async fn close(&mut self) -> Result<()>;
}
