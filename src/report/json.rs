use super::types::TestResults;
use crate::error::HarnessResult;
use std::path::Path;

pub fn write(results: &TestResults, path: &Path) -> HarnessResult<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Generate JSON report
pub fn generate(results: &TestResults, output: Option<&Path>) -> HarnessResult<()> {
    match output {
        Some(path) => {
            write(results, path)?;
            println!("JSON report saved to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(results)?),
    }
    Ok(())
}
