use std::time::{Duration, Instant};

use super::check::Probe;
use super::events::{EventEmitter, TestEvent};
use super::state::{StepState, StepStatus};
use crate::driver::{BrowserSession, Selector};
use crate::error::{ensure, HarnessError, HarnessResult};
use crate::utils::config::{SuiteConfig, Timeouts};

/// Runtime handed to a scenario body.
///
/// Wraps the scenario's exclusive browser session with the navigation and
/// assertion vocabulary scenarios are written in. Every action is recorded as
/// a step and streamed to the console listener.
pub struct ScenarioContext<'a> {
    pub config: &'a SuiteConfig,
    pub timeouts: &'a Timeouts,
    pub http: &'a reqwest::Client,
    session: Option<&'a dyn BrowserSession>,
    emitter: Option<&'a EventEmitter>,
    scenario: String,
    steps: Vec<StepState>,
    notes: Vec<String>,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(
        scenario: &str,
        config: &'a SuiteConfig,
        timeouts: &'a Timeouts,
        http: &'a reqwest::Client,
        session: Option<&'a dyn BrowserSession>,
    ) -> Self {
        Self {
            config,
            timeouts,
            http,
            session,
            emitter: None,
            scenario: scenario.to_string(),
            steps: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_emitter(mut self, emitter: &'a EventEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn session(&self) -> HarnessResult<&'a dyn BrowserSession> {
        self.session.ok_or(HarnessError::NoSession)
    }

    /// Consume the context, returning the recorded steps and notes.
    pub fn into_parts(self) -> (Vec<StepState>, Vec<String>) {
        (self.steps, self.notes)
    }

    /// Attach a free-text diagnostic to the scenario result.
    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("[{}] {}", self.scenario, message);
        if let Some(emitter) = self.emitter {
            emitter.emit(TestEvent::Log {
                message: message.clone(),
            });
        }
        self.notes.push(message);
    }

    fn record<T>(&mut self, description: String, started: Instant, result: &HarnessResult<T>) {
        let index = self.steps.len();
        let duration_ms = started.elapsed().as_millis() as u64;
        let error = result.as_ref().err().map(|e| e.to_string());

        if let Some(emitter) = self.emitter {
            emitter.emit(TestEvent::StepFinished {
                scenario: self.scenario.clone(),
                index,
                description: description.clone(),
                error: error.clone(),
                duration_ms,
            });
        }

        self.steps.push(StepState {
            index,
            description,
            status: match error {
                None => StepStatus::Passed,
                Some(error) => StepStatus::Failed { error },
            },
            duration_ms,
        });
    }

    // ---- navigation ----

    /// Open an application route and let the page settle.
    ///
    /// # Returns
    /// The location the browser ended up at
    pub async fn visit(&mut self, path: &str) -> HarnessResult<String> {
        let url = self.config.page_url(path);
        let started = Instant::now();
        let result = self.visit_url(&url).await;
        self.record(format!("Navigate to {}", url), started, &result);
        result
    }

    async fn visit_url(&self, url: &str) -> HarnessResult<String> {
        let session = self.session()?;
        session.goto(url).await?;
        self.settle(self.timeouts.settle).await?;
        Ok(session.current_url().await?)
    }

    /// Poll until the document reports `complete`, for at most `bound`.
    ///
    /// Reaching the bound is not an error; later assertions decide.
    pub async fn settle(&self, bound: Duration) -> HarnessResult<()> {
        let session = self.session()?;
        let deadline = Instant::now() + bound;
        loop {
            if session.ready_state().await? == "complete" {
                return Ok(());
            }
            if Instant::now() >= deadline {
                log::debug!("[{}] page still loading after {:?}", self.scenario, bound);
                return Ok(());
            }
            tokio::time::sleep(self.timeouts.poll_interval).await;
        }
    }

    /// Poll until the location differs from `from`, for at most `bound`.
    ///
    /// # Returns
    /// The location when polling stopped
    async fn settle_location(&self, from: &str, bound: Duration) -> HarnessResult<String> {
        let session = self.session()?;
        let deadline = Instant::now() + bound;
        loop {
            let url = session.current_url().await?;
            if url != from || Instant::now() >= deadline {
                self.settle(self.timeouts.settle).await?;
                return Ok(url);
            }
            tokio::time::sleep(self.timeouts.poll_interval).await;
        }
    }

    pub async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.session()?.current_url().await?)
    }

    pub async fn title(&mut self) -> HarnessResult<String> {
        let started = Instant::now();
        let result = match self.session() {
            Ok(session) => session.title().await.map_err(HarnessError::from),
            Err(e) => Err(e),
        };
        self.record("Read page title".to_string(), started, &result);
        result
    }

    /// Browser back button; waits for the location to change.
    pub async fn back(&mut self) -> HarnessResult<String> {
        let started = Instant::now();
        let result = self.back_inner().await;
        self.record("Go back".to_string(), started, &result);
        result
    }

    async fn back_inner(&self) -> HarnessResult<String> {
        let session = self.session()?;
        let before = session.current_url().await?;
        session.back().await?;
        self.settle_location(&before, self.timeouts.settle).await
    }

    pub async fn resize(&mut self, width: u32, height: u32) -> HarnessResult<()> {
        let started = Instant::now();
        let result = self.resize_inner(width, height).await;
        self.record(format!("Resize window to {}x{}", width, height), started, &result);
        result
    }

    async fn resize_inner(&self, width: u32, height: u32) -> HarnessResult<()> {
        self.session()?.set_window_size(width, height).await?;
        self.settle(self.timeouts.settle).await
    }

    // ---- assertions ----

    pub async fn expect_url_contains(&mut self, fragment: &str) -> HarnessResult<String> {
        let started = Instant::now();
        let result = match self.current_url().await {
            Ok(url) => ensure(
                url.contains(fragment),
                format!("URL should contain {} (was {})", fragment, url),
            )
            .map(|_| url),
            Err(e) => Err(e),
        };
        self.record(format!("URL contains {}", fragment), started, &result);
        result
    }

    pub async fn expect_url_excludes(&mut self, fragment: &str) -> HarnessResult<String> {
        let started = Instant::now();
        let result = match self.current_url().await {
            Ok(url) => ensure(
                !url.contains(fragment),
                format!("URL should not contain {} (was {})", fragment, url),
            )
            .map(|_| url),
            Err(e) => Err(e),
        };
        self.record(format!("URL does not contain {}", fragment), started, &result);
        result
    }

    /// Hard check that `body` renders some text within the settle bound.
    pub async fn expect_body_text(&mut self, what: &str) -> HarnessResult<String> {
        let started = Instant::now();
        let result = match self.body_text_until(|text| !text.trim().is_empty()).await {
            Ok((text, rendered)) => {
                ensure(rendered, format!("{} should have content", what)).map(|_| text)
            }
            Err(e) => Err(e),
        };
        self.record(format!("{} has content", what), started, &result);
        result
    }

    pub async fn body_text(&self) -> HarnessResult<String> {
        let text = self.session()?.text(&Selector::tag("body")).await?;
        Ok(text.unwrap_or_default())
    }

    /// Re-read the body until `accept` holds, for at most the settle bound.
    ///
    /// # Returns
    /// The last text read and whether it was accepted
    async fn body_text_until<F>(&self, accept: F) -> HarnessResult<(String, bool)>
    where
        F: Fn(&str) -> bool,
    {
        let deadline = Instant::now() + self.timeouts.settle;
        loop {
            let text = self.body_text().await?;
            if accept(&text) {
                return Ok((text, true));
            }
            if Instant::now() >= deadline {
                return Ok((text, false));
            }
            tokio::time::sleep(self.timeouts.poll_interval).await;
        }
    }

    /// Explicit wait for an element, bounded by the explicit-wait timeout.
    pub async fn wait_for(&mut self, selector: &Selector) -> HarnessResult<Probe> {
        let bound = self.timeouts.explicit_wait;
        let started = Instant::now();
        let result = match self.session() {
            Ok(session) => session
                .wait_for_element(selector, bound)
                .await
                .map_err(HarnessError::from)
                .map(|found| {
                    if found {
                        Probe::Confirmed
                    } else {
                        Probe::Missing(format!(
                            "{} not present within {}s",
                            selector,
                            bound.as_secs()
                        ))
                    }
                }),
            Err(e) => Err(e),
        };
        self.record(format!("Wait for {}", selector), started, &result);
        self.log_probe(&result);
        result
    }

    /// Immediate lookup (implicit wait only) for every selector.
    pub async fn probe_all_present(&mut self, selectors: &[Selector]) -> HarnessResult<Probe> {
        let started = Instant::now();
        let result = self.probe_all_inner(selectors).await;
        let names: Vec<String> = selectors.iter().map(|s| s.to_string()).collect();
        self.record(format!("Find {}", names.join(", ")), started, &result);
        self.log_probe(&result);
        result
    }

    async fn probe_all_inner(&self, selectors: &[Selector]) -> HarnessResult<Probe> {
        let session = self.session()?;
        for selector in selectors {
            if session.count(selector).await? == 0 {
                return Ok(Probe::Missing(format!("{} not found", selector)));
            }
        }
        Ok(Probe::Confirmed)
    }

    pub async fn probe_present(&mut self, selector: &Selector) -> HarnessResult<Probe> {
        self.probe_all_present(std::slice::from_ref(selector)).await
    }

    /// Coarse check: body text is non-empty and mentions one of `keywords`
    /// (case-insensitive).
    pub async fn probe_body_mentions(&mut self, keywords: &[&str]) -> HarnessResult<Probe> {
        let started = Instant::now();
        let mentions = |text: &str| {
            let lower = text.to_lowercase();
            !lower.trim().is_empty() && keywords.iter().any(|k| lower.contains(k))
        };
        let result = self.body_text_until(mentions).await.map(|(_, found)| {
            if found {
                Probe::Confirmed
            } else {
                Probe::Refuted(format!(
                    "page should mention {}",
                    keywords
                        .iter()
                        .map(|k| format!("'{}'", k))
                        .collect::<Vec<_>>()
                        .join(" or ")
                ))
            }
        });
        self.record(
            format!("Body mentions {}", keywords.join("/")),
            started,
            &result,
        );
        result
    }

    fn log_probe(&self, result: &HarnessResult<Probe>) {
        if let Ok(Probe::Missing(reason)) = result {
            log::debug!("[{}] {}", self.scenario, reason);
        }
    }

    // ---- interaction ----

    pub async fn fill(&mut self, selector: &Selector, text: &str) -> HarnessResult<()> {
        let started = Instant::now();
        let result = match self.session() {
            Ok(session) => session.fill(selector, text).await.map_err(HarnessError::from),
            Err(e) => Err(e),
        };
        self.record(format!("Type '{}' into {}", text, selector), started, &result);
        result
    }

    pub async fn click(&mut self, selector: &Selector) -> HarnessResult<()> {
        let started = Instant::now();
        let result = match self.session() {
            Ok(session) => session.click(selector).await.map_err(HarnessError::from),
            Err(e) => Err(e),
        };
        self.record(format!("Click {}", selector), started, &result);
        result
    }

    /// Click the form's submit button and wait, bounded by the submit settle
    /// timeout, for any resulting navigation.
    ///
    /// # Returns
    /// The location after the form had time to react
    pub async fn submit(&mut self) -> HarnessResult<String> {
        let started = Instant::now();
        let result = self.submit_inner().await;
        self.record("Submit form".to_string(), started, &result);
        result
    }

    async fn submit_inner(&self) -> HarnessResult<String> {
        let session = self.session()?;
        let before = session.current_url().await?;
        session.click(&Selector::submit_button()).await?;
        self.settle_location(&before, self.timeouts.submit_settle).await
    }

    // ---- element properties ----

    pub async fn value(&self, selector: &Selector) -> HarnessResult<Option<String>> {
        Ok(self.session()?.value(selector).await?)
    }

    pub async fn attribute(&self, selector: &Selector, name: &str) -> HarnessResult<Option<String>> {
        Ok(self.session()?.attribute(selector, name).await?)
    }

    pub async fn expect_visible(&mut self, selector: &Selector, what: &str) -> HarnessResult<()> {
        let started = Instant::now();
        let result = match self.session() {
            Ok(session) => match session.is_visible(selector).await {
                Ok(visible) => ensure(visible, format!("{} should be displayed", what)),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };
        self.record(format!("{} is displayed", what), started, &result);
        result
    }
}
