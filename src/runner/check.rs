//! Two-tier checks: try the precise assertion first, fall back to a coarse one
//! when the page does not have the expected structure.

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// What a single look at the page found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The expected thing is there and satisfies the expectation
    Confirmed,
    /// The thing is there but contradicts the expectation
    Refuted(String),
    /// The thing could not be located in time
    Missing(String),
}

impl Probe {
    /// Whether a coarser fallback check should be consulted
    pub fn is_missing(&self) -> bool {
        matches!(self, Probe::Missing(_))
    }
}

/// Tri-state result of a two-tier check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Strong,
    Weak { degraded: String },
    Fail(String),
}

/// How strongly a passing scenario was verified
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum Verification {
    Strong,
    Weak { reason: String },
}

/// Terminal, non-failing result of a scenario body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed(Verification),
    Skipped(String),
}

impl Verdict {
    pub fn strong() -> Self {
        Verdict::Passed(Verification::Strong)
    }

    pub fn weak(reason: impl Into<String>) -> Self {
        Verdict::Passed(Verification::Weak {
            reason: reason.into(),
        })
    }
}

impl CheckOutcome {
    pub fn into_verification(self) -> HarnessResult<Verification> {
        match self {
            CheckOutcome::Strong => Ok(Verification::Strong),
            CheckOutcome::Weak { degraded } => Ok(Verification::Weak { reason: degraded }),
            CheckOutcome::Fail(message) => Err(HarnessError::Assertion(message)),
        }
    }

    pub fn into_verdict(self) -> HarnessResult<Verdict> {
        self.into_verification().map(Verdict::Passed)
    }
}

/// Resolve a primary probe and, when the primary target was missing, the fallback probe.
pub fn resolve(primary: Probe, fallback: Option<Probe>) -> CheckOutcome {
    match primary {
        Probe::Confirmed => CheckOutcome::Strong,
        Probe::Refuted(message) => CheckOutcome::Fail(message),
        Probe::Missing(missing) => match fallback {
            Some(Probe::Confirmed) => CheckOutcome::Weak { degraded: missing },
            Some(Probe::Refuted(message)) | Some(Probe::Missing(message)) => {
                CheckOutcome::Fail(format!("{} and fallback check failed: {}", missing, message))
            }
            None => CheckOutcome::Fail(missing),
        },
    }
}
