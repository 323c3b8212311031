//! Browser session backed by Playwright (Chromium)
//!
//! Every `WebSession` owns its own Playwright driver process, browser process
//! and browser context, so nothing (cookies, storage, history) leaks from one
//! scenario into the next.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use playwright::api::{Browser, BrowserContext, ElementHandle, Page, Viewport};
use playwright::Playwright;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::driver::traits::{BrowserSession, Selector, SessionFactory};
use crate::utils::config::SessionConfig;
use crate::utils::system::find_browser;

/// Browser session using Playwright
pub struct WebSession {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<Browser>,
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
    config: SessionConfig,
    closed: AtomicBool,
}

impl WebSession {
    /// Start a driver, launch Chromium and open a single page.
    pub async fn launch(config: SessionConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let executable = config.browser_executable.clone().or_else(find_browser);
        if executable.is_none() {
            info!("No system Chrome found, installing Playwright's Chromium");
            playwright
                .prepare()
                .context("Failed to install Playwright browsers")?;
        }

        let chromium = playwright.chromium();
        let browser = launch_chromium_browser(&chromium, &config, executable.as_deref()).await?;

        let context = browser
            .context_builder()
            .build()
            .await
            .context("Failed to create browser context")?;

        for script in init_scripts(&config) {
            context
                .add_init_script(script)
                .await
                .context("Failed to install page init script")?;
        }

        let page = context
            .new_page()
            .await
            .context("Failed to open a page")?;

        page.set_viewport_size(Viewport {
            width: config.window_width as i32,
            height: config.window_height as i32,
        })
        .await?;

        debug!(
            "Browser session ready (headless: {}, {}x{})",
            config.headless, config.window_width, config.window_height
        );

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
            config,
            closed: AtomicBool::new(false),
        })
    }

    /// Wait up to the implicit wait, then hand back the first match
    async fn find(&self, selector: &Selector) -> Result<Option<ElementHandle>> {
        let css = selector.to_css();
        let page = self.page.lock().await;

        let _ = page
            .wait_for_selector_builder(&css)
            .timeout(self.config.implicit_wait.as_millis() as f64)
            .wait_for_selector()
            .await;

        Ok(page.query_selector(&css).await?)
    }

    async fn require(&self, selector: &Selector) -> Result<ElementHandle> {
        self.find(selector)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Element not found: {}", selector))
    }
}

#[async_trait]
impl BrowserSession for WebSession {
    async fn goto(&self, url: &str) -> Result<()> {
        let page = self.page.lock().await;
        page.goto_builder(url)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    /// Main-frame URL as tracked by the driver; safe mid-navigation.
    async fn current_url(&self) -> Result<String> {
        let page = self.page.lock().await;
        Ok(page.url()?)
    }

    async fn title(&self) -> Result<String> {
        let page = self.page.lock().await;
        let title: String = page.evaluate("() => document.title", ()).await?;
        Ok(title)
    }

    async fn ready_state(&self) -> Result<String> {
        let page = self.page.lock().await;
        let state: String = page.evaluate("() => document.readyState", ()).await?;
        Ok(state)
    }

    async fn wait_for_element(&self, selector: &Selector, timeout: Duration) -> Result<bool> {
        let page = self.page.lock().await;
        let css = selector.to_css();

        let result = page
            .wait_for_selector_builder(&css)
            .timeout(timeout.as_millis() as f64)
            .wait_for_selector()
            .await;

        Ok(result.is_ok())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        if self.find(selector).await?.is_none() {
            return Ok(0);
        }
        let page = self.page.lock().await;
        let elements = page.query_selector_all(&selector.to_css()).await?;
        Ok(elements.len())
    }

    async fn text(&self, selector: &Selector) -> Result<Option<String>> {
        if self.find(selector).await?.is_none() {
            return Ok(None);
        }
        let page = self.page.lock().await;
        let js = "el => el.innerText || el.textContent || ''";
        let text: String = page
            .evaluate_on_selector::<String, _>(&selector.to_css(), js, None::<String>)
            .await?;
        Ok(Some(text))
    }

    async fn attribute(&self, selector: &Selector, name: &str) -> Result<Option<String>> {
        if self.find(selector).await?.is_none() {
            return Ok(None);
        }
        let page = self.page.lock().await;
        let js = "(el, name) => el.getAttribute(name)";
        let value: Option<String> = page
            .evaluate_on_selector::<String, _>(&selector.to_css(), js, Some(name.to_string()))
            .await?;
        Ok(value)
    }

    async fn value(&self, selector: &Selector) -> Result<Option<String>> {
        if self.find(selector).await?.is_none() {
            return Ok(None);
        }
        let page = self.page.lock().await;
        let js = "el => (el.value === undefined || el.value === null) ? null : String(el.value)";
        let value: Option<String> = page
            .evaluate_on_selector::<String, _>(&selector.to_css(), js, None::<String>)
            .await?;
        Ok(value)
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        match self.find(selector).await? {
            Some(el) => Ok(el.is_visible().await?),
            None => Ok(false),
        }
    }

    async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        let el = self.require(selector).await?;
        el.fill_builder(text)
            .fill()
            .await
            .with_context(|| format!("Failed to type into {}", selector))?;
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let el = self.require(selector).await?;
        el.click_builder()
            .click()
            .await
            .with_context(|| format!("Failed to click {}", selector))?;
        Ok(())
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        let page = self.page.lock().await;
        page.set_viewport_size(Viewport {
            width: width as i32,
            height: height as i32,
        })
        .await?;
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        let page = self.page.lock().await;
        page.evaluate::<(), ()>("() => window.history.back()", ())
            .await?;
        Ok(())
    }

    async fn history_length(&self) -> Result<u32> {
        let page = self.page.lock().await;
        let len: f64 = page.evaluate("() => window.history.length", ()).await?;
        Ok(len as u32)
    }

    async fn cookie_count(&self) -> Result<usize> {
        let cookies = self.context.cookies(&[]).await?;
        Ok(cookies.len())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let page = self.page.lock().await;
        page.screenshot_builder()
            .path(path.to_path_buf())
            .screenshot()
            .await
            .with_context(|| format!("Failed to save screenshot to {}", path.display()))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.browser
            .close()
            .await
            .context("Failed to close the browser")?;
        debug!("Browser session closed");
        Ok(())
    }
}

impl Drop for WebSession {
    fn drop(&mut self) {
        // Dropping the last Arc tears down the browser and the driver process anyway
        if !self.closed.load(Ordering::SeqCst) {
            warn!("Browser session dropped without close(), relying on process teardown");
        }
    }
}

/// Native dialogs block every later call into the page until answered, and
/// this Playwright client never answers them. Answer them inside the page.
const DIALOG_SHIM: &str =
    "window.alert = () => {}; window.confirm = () => true; window.prompt = () => null;";

const WEBDRIVER_SHIM: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

/// Scripts run in every document before the page's own scripts
fn init_scripts(config: &SessionConfig) -> Vec<&'static str> {
    let mut scripts = vec![DIALOG_SHIM];
    if config.hide_automation {
        scripts.push(WEBDRIVER_SHIM);
    }
    scripts
}

/// Launches one Playwright/Chromium pair per scenario
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSessionFactory;

#[async_trait]
impl SessionFactory for WebSessionFactory {
    async fn acquire(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>> {
        let session = WebSession::launch(config.clone()).await?;
        Ok(Box::new(session))
    }
}

/// Launch a new Chromium browser configured for unattended runs
async fn launch_chromium_browser(
    chromium: &playwright::api::BrowserType,
    config: &SessionConfig,
    executable: Option<&Path>,
) -> Result<Browser> {
    let mut launcher = chromium.launcher();
    launcher = launcher.headless(config.headless);

    if let Some(path) = executable {
        debug!("Using browser executable: {}", path.display());
        launcher = launcher.executable(path);
    }

    let args = config.launch_args();
    launcher = launcher.args(&args);

    launcher
        .launch()
        .await
        .context("Failed to launch Chromium")
}
