use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::utils::config::SessionConfig;

/// Element selector for DOM lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Select by tag name (`body`, `nav`, `a`)
    Tag(String),
    /// Select by element id
    Id(String),
    /// Raw CSS selector
    Css(String),
}

impl Selector {
    pub fn tag(name: &str) -> Self {
        Selector::Tag(name.to_string())
    }

    pub fn id(id: &str) -> Self {
        Selector::Id(id.to_string())
    }

    pub fn css(css: &str) -> Self {
        Selector::Css(css.to_string())
    }

    /// The form's submit control.
    pub fn submit_button() -> Self {
        Selector::css("button[type='submit']")
    }

    /// CSS form understood by the browser engine.
    pub fn to_css(&self) -> String {
        match self {
            Selector::Tag(tag) => tag.clone(),
            Selector::Id(id) => format!("#{}", id),
            Selector::Css(css) => css.clone(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(tag) => write!(f, "<{}>", tag),
            Selector::Id(id) => write!(f, "#{}", id),
            Selector::Css(css) => write!(f, "{}", css),
        }
    }
}

/// One browser instance under automated control.
///
/// Lookups that act on a single element (`text`, `attribute`, `fill`, ...)
/// wait up to the session's implicit wait for the element to show up.
/// `text`, `attribute` and `value` report a missing element as `Ok(None)`;
/// `fill` and `click` report it as an error.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate and wait for the load event
    async fn goto(&self, url: &str) -> Result<()>;

    /// Location of the main frame. Must not run page script, so it stays
    /// readable while a navigation is committing.
    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// `document.readyState` of the current page
    async fn ready_state(&self) -> Result<String>;

    /// Wait until an element matching `selector` is present.
    ///
    /// # Returns
    /// True if the element appeared, false on timeout
    async fn wait_for_element(&self, selector: &Selector, timeout: Duration) -> Result<bool>;

    /// Number of matching elements, after waiting up to the implicit wait for the first one
    async fn count(&self, selector: &Selector) -> Result<usize>;

    /// Rendered text of the first match
    async fn text(&self, selector: &Selector) -> Result<Option<String>>;

    async fn attribute(&self, selector: &Selector, name: &str) -> Result<Option<String>>;

    /// Current `value` property of a form control
    async fn value(&self, selector: &Selector) -> Result<Option<String>>;

    async fn is_visible(&self, selector: &Selector) -> Result<bool>;

    /// Replace the content of a form control with `text`
    async fn fill(&self, selector: &Selector, text: &str) -> Result<()>;

    async fn click(&self, selector: &Selector) -> Result<()>;

    async fn set_window_size(&self, width: u32, height: u32) -> Result<()>;

    /// Browser back button
    async fn back(&self) -> Result<()>;

    async fn history_length(&self) -> Result<u32>;

    async fn cookie_count(&self) -> Result<usize>;

    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Shut down the page, the browser process and the driver process.
    async fn close(&self) -> Result<()>;
}

/// Produces a fresh, exclusive [`BrowserSession`] for each scenario.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn acquire(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>>;
}

#[async_trait]
impl<T: SessionFactory + ?Sized> SessionFactory for Arc<T> {
    async fn acquire(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>> {
        (**self).acquire(config).await
    }
}
