use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::check::{Verdict, Verification};
use crate::error::HarnessError;
use crate::scenarios::Category;

/// Step execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed { error: String },
}

/// One recorded action inside a scenario (navigate, fill, assert...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub index: usize,
    pub description: String,
    pub status: StepStatus,
    pub duration_ms: u64,
}

/// Scenario execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Passed { verification: Verification },
    Failed { kind: String, error: String },
    Skipped { reason: String },
}

/// State for a single scenario execution
#[derive(Debug, Clone)]
pub struct ScenarioState {
    pub name: String,
    pub summary: String,
    pub categories: Vec<Category>,
    pub status: ScenarioStatus,
    pub steps: Vec<StepState>,
    pub notes: Vec<String>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    pub screenshot_path: Option<String>,
}

impl ScenarioState {
    pub fn new(name: &str, summary: &str, categories: &[Category]) -> Self {
        Self {
            name: name.to_string(),
            summary: summary.to_string(),
            categories: categories.to_vec(),
            status: ScenarioStatus::Pending,
            steps: Vec::new(),
            notes: Vec::new(),
            started_at: None,
            finished_at: None,
            duration_ms: None,
            screenshot_path: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ScenarioStatus::Running;
        self.started_at = Some(Instant::now());
    }

    /// Record the terminal outcome of the scenario body.
    pub fn finish(&mut self, result: Result<Verdict, HarnessError>) {
        let status = match result {
            Ok(Verdict::Passed(verification)) => ScenarioStatus::Passed { verification },
            Ok(Verdict::Skipped(reason)) => ScenarioStatus::Skipped { reason },
            Err(e) => ScenarioStatus::Failed {
                kind: e.kind().to_string(),
                error: e.to_string(),
            },
        };
        self.complete(status);
    }

    /// Mark as skipped without running (tag filter, fail-fast).
    pub fn skip(&mut self, reason: &str) {
        self.status = ScenarioStatus::Skipped {
            reason: reason.to_string(),
        };
    }

    fn complete(&mut self, status: ScenarioStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ScenarioStatus::Failed { .. })
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> ScenarioReport {
        ScenarioReport {
            name: self.name.clone(),
            summary: self.summary.clone(),
            categories: self.categories.clone(),
            status: self.status.clone(),
            steps: self.steps.clone(),
            notes: self.notes.clone(),
            duration_ms: self.duration_ms,
            screenshot_path: self.screenshot_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub summary: String,
    pub categories: Vec<Category>,
    pub status: ScenarioStatus,
    pub steps: Vec<StepState>,
    pub notes: Vec<String>,
    pub duration_ms: Option<u64>,
    pub screenshot_path: Option<String>,
}

/// Whole-run state
#[derive(Debug, Clone)]
pub struct SuiteState {
    pub session_id: String,
    pub base_url: String,
    pub api_url: String,
    pub scenarios: Vec<ScenarioState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SuiteState {
    pub fn new(session_id: &str, base_url: &str, api_url: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            base_url: base_url.to_string(),
            api_url: api_url.to_string(),
            scenarios: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_scenario(&mut self, scenario: ScenarioState) {
        self.scenarios.push(scenario);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> TestSummary {
        let mut passed = 0;
        let mut weak = 0;
        let mut failed = 0;
        let mut skipped = 0;
        let mut total_steps = 0;

        for scenario in &self.scenarios {
            total_steps += scenario.steps.len() as u32;
            match scenario.status {
                ScenarioStatus::Passed { ref verification } => {
                    passed += 1;
                    if matches!(verification, Verification::Weak { .. }) {
                        weak += 1;
                    }
                }
                ScenarioStatus::Failed { .. } => failed += 1,
                ScenarioStatus::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        TestSummary {
            session_id: self.session_id.clone(),
            total_scenarios: self.scenarios.len() as u32,
            total_steps,
            passed,
            weak_passed: weak,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> SuiteReport {
        SuiteReport {
            session_id: self.session_id.clone(),
            base_url: self.base_url.clone(),
            api_url: self.api_url.clone(),
            scenarios: self.scenarios.iter().map(|s| s.to_report()).collect(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub session_id: String,
    pub total_scenarios: u32,
    pub total_steps: u32,
    /// Includes weak passes
    pub passed: u32,
    pub weak_passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

impl TestSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub session_id: String,
    pub base_url: String,
    pub api_url: String,
    pub scenarios: Vec<ScenarioReport>,
    pub summary: TestSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(name: &str, result: Result<Verdict, HarnessError>) -> ScenarioState {
        let mut state = ScenarioState::new(name, "", &[Category::Smoke]);
        state.start();
        state.finish(result);
        state
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut suite = SuiteState::new("run-1", "http://localhost:5173", "http://localhost:3000");
        suite.start();
        suite.add_scenario(finished("a", Ok(Verdict::strong())));
        suite.add_scenario(finished("b", Ok(Verdict::weak("no nav element"))));
        suite.add_scenario(finished("c", Ok(Verdict::Skipped("API not accessible".into()))));
        suite.add_scenario(finished(
            "d",
            Err(HarnessError::Assertion("URL should contain /about".into())),
        ));
        suite.finish();

        let summary = suite.summary();
        assert_eq!(summary.total_scenarios, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.weak_passed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_passed());
        assert!(summary.total_duration_ms.is_some());
    }

    #[test]
    fn skips_alone_do_not_fail_the_run() {
        let mut suite = SuiteState::new("run-2", "b", "a");
        suite.add_scenario(finished("api", Ok(Verdict::Skipped("unreachable".into()))));
        assert!(suite.summary().all_passed());
    }

    #[test]
    fn failure_keeps_error_kind() {
        let state = finished("x", Err(HarnessError::NoSession));
        match state.status {
            ScenarioStatus::Failed { ref kind, .. } => assert_eq!(kind, "SetupError"),
            ref other => panic!("unexpected status {:?}", other),
        }
        assert!(state.is_failed());
        assert!(state.duration_ms.is_some());
    }

    #[test]
    fn report_serializes_with_tagged_status() {
        let state = finished("homepage_loads", Ok(Verdict::strong()));
        let json = serde_json::to_value(state.to_report()).unwrap();
        assert_eq!(json["status"]["type"], "passed");
        assert_eq!(json["status"]["verification"]["level"], "strong");
        assert_eq!(json["categories"][0], "smoke");
    }
}
