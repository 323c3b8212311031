pub mod html;
pub mod json;
pub mod junit;
pub mod types;

use crate::error::HarnessResult;
use std::path::Path;

/// Output formats the `report` command can regenerate from a results file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Html,
    Json,
    Junit,
}

/// Generate report from test results
pub fn generate_report(
    results_path: &Path,
    format: ReportFormat,
    output: Option<&Path>,
) -> HarnessResult<()> {
    let results = std::fs::read_to_string(results_path)?;
    let test_results: types::TestResults = serde_json::from_str(&results)?;

    match format {
        ReportFormat::Json => json::generate(&test_results, output),
        ReportFormat::Html => html::generate(&test_results, output),
        ReportFormat::Junit => junit::generate(&test_results, output),
    }
}
