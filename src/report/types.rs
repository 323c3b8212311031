use crate::runner::state::{ScenarioReport, SuiteReport, TestSummary};
use serde::{Deserialize, Serialize};

/// Test results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub session_id: String,
    pub base_url: String,
    pub api_url: String,
    pub scenarios: Vec<ScenarioReport>,
    pub summary: TestSummary,
    pub generated_at: String,
}

impl TestResults {
    /// Stamp a finished run with the generation time.
    pub fn from_suite(report: SuiteReport) -> Self {
        Self {
            session_id: report.session_id,
            base_url: report.base_url,
            api_url: report.api_url,
            scenarios: report.scenarios,
            summary: report.summary,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::runner::check::Verification;
    use crate::runner::state::{ScenarioStatus, StepState, StepStatus};
    use crate::scenarios::Category;

    fn scenario(name: &str, status: ScenarioStatus, duration_ms: u64) -> ScenarioReport {
        ScenarioReport {
            name: name.to_string(),
            summary: format!("{} summary", name),
            categories: vec![Category::Smoke],
            status,
            steps: vec![StepState {
                index: 0,
                description: "Navigate to http://localhost:5173/".to_string(),
                status: StepStatus::Passed,
                duration_ms: 12,
            }],
            notes: Vec::new(),
            duration_ms: Some(duration_ms),
            screenshot_path: None,
        }
    }

    /// One scenario of every outcome.
    pub fn mixed_results() -> TestResults {
        let mut weak = scenario(
            "navigation_menu_exists",
            ScenarioStatus::Passed {
                verification: Verification::Weak {
                    reason: "<nav> not present within 10s".to_string(),
                },
            },
            900,
        );
        weak.notes.push("fell back to links".to_string());

        TestResults {
            session_id: "test-session".to_string(),
            base_url: "http://localhost:5173".to_string(),
            api_url: "http://localhost:3000".to_string(),
            scenarios: vec![
                scenario(
                    "homepage_loads",
                    ScenarioStatus::Passed {
                        verification: Verification::Strong,
                    },
                    1500,
                ),
                weak,
                scenario(
                    "navigate_to_about_page",
                    ScenarioStatus::Failed {
                        kind: "AssertionError".to_string(),
                        error: "Assertion failed: URL should contain /about <& friends>".to_string(),
                    },
                    2000,
                ),
                scenario(
                    "api_health_check",
                    ScenarioStatus::Skipped {
                        reason: "API not accessible: connection refused".to_string(),
                    },
                    5,
                ),
            ],
            summary: TestSummary {
                session_id: "test-session".to_string(),
                total_scenarios: 4,
                total_steps: 4,
                passed: 2,
                weak_passed: 1,
                failed: 1,
                skipped: 1,
                total_duration_ms: Some(4405),
            },
            generated_at: "2024-01-01 12:00:00".to_string(),
        }
    }
}
