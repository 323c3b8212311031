//! Error types for the harness and the scenario suite

use thiserror::Error;

use crate::utils::system::RuntimeDiagnostics;

#[derive(Error, Debug)]
pub enum HarnessError {
    /// The browser (or its driver) could not be brought up for a scenario.
    #[error("Browser session could not be acquired: {source:#}\n{diagnostics}")]
    SessionSetup {
        source: anyhow::Error,
        diagnostics: RuntimeDiagnostics,
    },

    /// A condition that was observable on the page did not hold.
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// The browser misbehaved mid-scenario (navigation failed, page crashed...).
    #[error("Browser error: {0:#}")]
    Browser(#[from] anyhow::Error),

    #[error("Scenario needs a browser session but none was provided")]
    NoSession,

    #[error("Unknown category: {0} (known: smoke, regression, critical)")]
    UnknownCategory(String),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Invalid URL in {name}: {value} ({reason})")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl HarnessError {
    /// Short label used in reports (`type` attribute in JUnit, badge in HTML).
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::SessionSetup { .. } | HarnessError::NoSession => "SetupError",
            HarnessError::Assertion(_) => "AssertionError",
            HarnessError::Browser(_) => "BrowserError",
            _ => "HarnessError",
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Fail with an [`HarnessError::Assertion`] unless `cond` holds.
pub fn ensure(cond: bool, message: impl Into<String>) -> HarnessResult<()> {
    if cond {
        Ok(())
    } else {
        Err(HarnessError::Assertion(message.into()))
    }
}
