use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{HarnessError, HarnessResult};

pub const BASE_URL_VAR: &str = "BASE_URL";
pub const API_URL_VAR: &str = "API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Target URLs for one run. Resolved once, then shared read-only by every scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Front-end application root, without trailing slash
    pub base_url: String,
    /// Backend API root, without trailing slash
    pub api_url: String,
}

impl SuiteConfig {
    /// Resolve from the process environment, falling back to the local dev defaults.
    pub fn from_env() -> HarnessResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api = lookup(API_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            base_url: normalize_url(BASE_URL_VAR, &base)?,
            api_url: normalize_url(API_URL_VAR, &api)?,
        })
    }

    /// Apply CLI overrides on top of the environment values.
    pub fn with_overrides(
        mut self,
        base_url: Option<&str>,
        api_url: Option<&str>,
    ) -> HarnessResult<Self> {
        if let Some(base) = base_url {
            self.base_url = normalize_url(BASE_URL_VAR, base)?;
        }
        if let Some(api) = api_url {
            self.api_url = normalize_url(API_URL_VAR, api)?;
        }
        Ok(self)
    }

    /// Absolute URL of an application route, e.g. `page_url("/trips")`.
    pub fn page_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub fn api_endpoint(&self, path: &str) -> String {
        join_url(&self.api_url, path)
    }
}

fn normalize_url(name: &'static str, raw: &str) -> HarnessResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| HarnessError::InvalidUrl {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(HarnessError::InvalidUrl {
            name,
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    // Canonical form, so it matches what the browser reports back
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn join_url(root: &str, path: &str) -> String {
    if path.is_empty() || path == "/" {
        return format!("{}/", root);
    }
    format!("{}/{}", root, path.trim_start_matches('/'))
}

/// Browser session settings, handed explicitly to session creation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub headless: bool,
    /// Chromium's sandbox does not work inside most CI containers
    pub sandbox: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Applied to every element lookup that does not pass its own timeout
    pub implicit_wait: Duration,
    /// Strip the `navigator.webdriver` / AutomationControlled signals
    pub hide_automation: bool,
    pub browser_executable: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let headed = std::env::var("E2E_HEADED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            headless: !headed,
            sandbox: false,
            window_width: 1920,
            window_height: 1080,
            implicit_wait: Duration::from_secs(10),
            hide_automation: true,
            browser_executable: std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
                .ok()
                .map(PathBuf::from),
            extra_args: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Chromium command-line switches for this configuration.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        if !self.sandbox {
            args.push("--no-sandbox".to_string());
            args.push("--disable-setuid-sandbox".to_string());
        }
        args.extend(
            ["--disable-dev-shm-usage", "--disable-gpu", "--disable-extensions"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(format!(
            "--window-size={},{}",
            self.window_width, self.window_height
        ));
        if self.hide_automation {
            args.push("--disable-blink-features=AutomationControlled".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Wait bounds used by the scenario vocabulary
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Bound for explicit "wait until element is present" checks
    pub explicit_wait: Duration,
    /// Bound for the page to settle after a navigation
    pub settle: Duration,
    /// Bound for the page to settle after a form submission
    pub submit_settle: Duration,
    pub http: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            explicit_wait: Duration::from_secs(10),
            settle: Duration::from_secs(2),
            submit_settle: Duration::from_secs(3),
            http: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
        }
    }
}
