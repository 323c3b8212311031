use colored::Colorize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::context::ScenarioContext;
use super::events::{EventEmitter, TestEvent};
use super::state::{ScenarioState, SuiteState, TestSummary};
use crate::driver::{BrowserSession, SessionFactory};
use crate::error::{HarnessError, HarnessResult};
use crate::scenarios::Scenario;
use crate::utils::config::{SessionConfig, SuiteConfig, Timeouts};
use crate::utils::system::RuntimeDiagnostics;

/// Knobs for one suite run
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Directory for reports and failure screenshots
    pub output_dir: PathBuf,
    pub report: bool,
    /// Capture a screenshot when a browser scenario fails
    pub snapshot: bool,
    /// Skip the remaining scenarios after the first failure
    pub fail_fast: bool,
    pub session: SessionConfig,
    pub timeouts: Timeouts,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            report: true,
            snapshot: true,
            fail_fast: false,
            session: SessionConfig::default(),
            timeouts: Timeouts::default(),
        }
    }
}

/// Runs scenarios one after another, each with its own browser session.
pub struct SuiteExecutor {
    factory: Box<dyn SessionFactory>,
    config: SuiteConfig,
    options: ExecutorOptions,
    http: reqwest::Client,
    state: SuiteState,
    emitter: EventEmitter,
}

impl SuiteExecutor {
    pub fn new(
        factory: Box<dyn SessionFactory>,
        config: SuiteConfig,
        options: ExecutorOptions,
    ) -> HarnessResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeouts.http)
            .build()?;
        let state = SuiteState::new(&Uuid::new_v4().to_string(), &config.base_url, &config.api_url);

        Ok(Self {
            factory,
            config,
            options,
            http,
            state,
            emitter: EventEmitter::default(),
        })
    }

    /// Subscribe to test execution events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TestEvent> {
        self.emitter.subscribe()
    }

    pub fn state(&self) -> &SuiteState {
        &self.state
    }

    /// Run `scenarios` in order and return the run summary.
    pub async fn run(&mut self, scenarios: &[Box<dyn Scenario>]) -> HarnessResult<TestSummary> {
        self.state.start();
        self.emitter.emit(TestEvent::SuiteStarted {
            session_id: self.state.session_id.clone(),
            scenario_count: scenarios.len(),
            base_url: self.config.base_url.clone(),
            api_url: self.config.api_url.clone(),
        });

        let total = scenarios.len();
        let mut halted = false;

        for (index, scenario) in scenarios.iter().enumerate() {
            let scenario = scenario.as_ref();

            if halted {
                let mut state =
                    ScenarioState::new(scenario.name(), scenario.summary(), scenario.categories());
                state.skip("not run: an earlier scenario failed (--fail-fast)");
                self.emit_finished(&state);
                self.state.add_scenario(state);
                continue;
            }

            let state = self.run_scenario(scenario, index, total).await;
            if state.is_failed() && self.options.fail_fast {
                halted = true;
            }
            self.state.add_scenario(state);
        }

        self.finish().await
    }

    async fn run_scenario(&self, scenario: &dyn Scenario, index: usize, total: usize) -> ScenarioState {
        let mut state = ScenarioState::new(scenario.name(), scenario.summary(), scenario.categories());
        state.start();
        self.emitter.emit(TestEvent::ScenarioStarted {
            name: scenario.name().to_string(),
            index,
            total,
        });

        let session = if scenario.needs_browser() {
            match self.acquire().await {
                Ok(session) => Some(session),
                Err(e) => {
                    log::error!("[{}] {}", scenario.name(), e);
                    state.finish(Err(e));
                    self.emit_finished(&state);
                    return state;
                }
            }
        } else {
            None
        };

        let mut cx = ScenarioContext::new(
            scenario.name(),
            &self.config,
            &self.options.timeouts,
            &self.http,
            session.as_deref(),
        )
        .with_emitter(&self.emitter);

        let result = scenario.run(&mut cx).await;
        let (steps, notes) = cx.into_parts();
        state.steps = steps;
        state.notes = notes;

        if let (Err(e), Some(session)) = (&result, session.as_deref()) {
            log::debug!("[{}] failed: {}", scenario.name(), e);
            if self.options.snapshot {
                state.screenshot_path = self.handle_failure(scenario.name(), session).await;
            }
        }

        state.finish(result);

        // The session goes away on every path, pass or fail
        if let Some(session) = session {
            if let Err(e) = session.close().await {
                log::warn!("[{}] failed to close browser session: {:#}", scenario.name(), e);
            }
        }

        self.emit_finished(&state);
        state
    }

    /// Acquire a fresh session and check nothing leaked into it.
    async fn acquire(&self) -> HarnessResult<Box<dyn BrowserSession>> {
        let setup_error = |source: anyhow::Error| HarnessError::SessionSetup {
            source,
            diagnostics: RuntimeDiagnostics::collect(
                self.options.session.browser_executable.as_deref(),
            ),
        };

        let session = self
            .factory
            .acquire(&self.options.session)
            .await
            .map_err(setup_error)?;

        let pristine = ensure_fresh(session.as_ref()).await;

        if let Err(e) = pristine {
            if let Err(close_err) = session.close().await {
                log::warn!("failed to close rejected session: {:#}", close_err);
            }
            return Err(setup_error(e));
        }

        Ok(session)
    }

    /// Save a screenshot of the failing page into the output directory.
    async fn handle_failure(&self, name: &str, session: &dyn BrowserSession) -> Option<String> {
        if let Err(e) = std::fs::create_dir_all(&self.options.output_dir) {
            log::warn!("cannot create {}: {}", self.options.output_dir.display(), e);
            return None;
        }

        let timestamp = chrono::Local::now().format("%H%M%S");
        let uuid = Uuid::new_v4().to_string();
        let filename = format!("fail_{}_{}_{}.png", name, timestamp, &uuid[..8]);
        let path = self.options.output_dir.join(&filename);

        match session.screenshot(&path).await {
            Ok(()) => {
                log::info!("Saved failure screenshot: {}", path.display());
                Some(path.display().to_string())
            }
            Err(e) => {
                log::warn!("[{}] failed to take screenshot: {:#}", name, e);
                None
            }
        }
    }

    fn emit_finished(&self, state: &ScenarioState) {
        self.emitter.emit(TestEvent::ScenarioFinished {
            name: state.name.clone(),
            status: state.status.clone(),
            duration_ms: state.duration_ms,
        });
    }

    /// Close the run and write the reports
    async fn finish(&mut self) -> HarnessResult<TestSummary> {
        self.state.finish();
        let summary = self.state.summary();

        self.emitter.emit(TestEvent::SuiteFinished {
            summary: summary.clone(),
        });

        if self.options.report {
            self.write_reports()?;
        }
        Ok(summary)
    }

    fn write_reports(&self) -> HarnessResult<()> {
        let dir: &Path = &self.options.output_dir;
        std::fs::create_dir_all(dir)?;

        let results = crate::report::types::TestResults::from_suite(self.state.to_report());

        let json_path = dir.join("test-results.json");
        crate::report::json::write(&results, &json_path)?;
        println!(
            "\n{} JSON report saved to: {}",
            "📄".blue(),
            json_path.display().to_string().cyan()
        );

        let html_path = dir.join("report.html");
        crate::report::html::write(&results, &html_path)?;
        println!(
            "{} HTML report saved to: {}",
            "📊".blue(),
            html_path.display().to_string().cyan()
        );

        let junit_path = dir.join("junit.xml");
        crate::report::junit::write(&results, &junit_path)?;
        log::info!("JUnit report saved to {}", junit_path.display());

        Ok(())
    }
}

/// A new session must not carry cookies or history from anything before it.
async fn ensure_fresh(session: &dyn BrowserSession) -> anyhow::Result<()> {
    let history = session.history_length().await?;
    let cookies = session.cookie_count().await?;
    if history > 1 || cookies > 0 {
        anyhow::bail!(
            "session is not fresh: {} cookie(s), history length {}",
            cookies,
            history
        );
    }
    Ok(())
}
