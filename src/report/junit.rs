use super::types::TestResults;
use crate::error::HarnessResult;
use crate::runner::check::Verification;
use crate::runner::state::{ScenarioReport, ScenarioStatus};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

const CLASSNAME: &str = "opalumpus_e2e.TestOpalumpusApplication";

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> HarnessResult<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total_tests = results.scenarios.len().to_string();
    let failures = results
        .scenarios
        .iter()
        .filter(|s| matches!(s.status, ScenarioStatus::Failed { .. }))
        .count()
        .to_string();
    let skipped = results
        .scenarios
        .iter()
        .filter(|s| matches!(s.status, ScenarioStatus::Skipped { .. }))
        .count()
        .to_string();
    let total_duration = seconds(
        results
            .scenarios
            .iter()
            .map(|s| s.duration_ms.unwrap_or(0))
            .sum(),
    );

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "opalumpus-e2e"));
    suites_start.push_attribute(("tests", total_tests.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("skipped", skipped.as_str()));
    suites_start.push_attribute(("time", total_duration.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "opalumpus"));
    suite_start.push_attribute(("tests", total_tests.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("errors", "0"));
    suite_start.push_attribute(("skipped", skipped.as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("time", total_duration.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for scenario in &results.scenarios {
        write_test_case(&mut writer, scenario)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    scenario: &ScenarioReport,
) -> HarnessResult<()> {
    let mut case_start = BytesStart::new("testcase");
    let time = seconds(scenario.duration_ms.unwrap_or(0));
    case_start.push_attribute(("name", scenario.name.as_str()));
    case_start.push_attribute(("classname", CLASSNAME));
    case_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(case_start))?;

    match &scenario.status {
        ScenarioStatus::Failed { kind, error } => {
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", first_line(error)));
            fail_start.push_attribute(("type", kind.as_str()));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(BytesText::new(error)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        ScenarioStatus::Skipped { reason } => {
            let mut skip = BytesStart::new("skipped");
            skip.push_attribute(("message", reason.as_str()));
            writer.write_event(Event::Empty(skip))?;
        }
        _ => {}
    }

    // Weak passes and scenario notes go to system-out so CI still shows them
    let mut out: Vec<String> = Vec::new();
    if let ScenarioStatus::Passed {
        verification: Verification::Weak { reason },
    } = &scenario.status
    {
        out.push(format!("weak pass: {}", reason));
    }
    out.extend(scenario.notes.iter().cloned());
    if let Some(path) = &scenario.screenshot_path {
        out.push(format!("screenshot: {}", path));
    }
    if !out.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("system-out")))?;
        writer.write_event(Event::Text(BytesText::new(&out.join("\n"))))?;
        writer.write_event(Event::End(BytesEnd::new("system-out")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("Unknown error")
}

/// Write report to file
pub fn write(results: &TestResults, path: &Path) -> HarnessResult<()> {
    let xml = generate_junit_xml(results)?;
    std::fs::write(path, xml)?;
    Ok(())
}

/// Generate JUnit report, to `output` or stdout
pub fn generate(results: &TestResults, output: Option<&Path>) -> HarnessResult<()> {
    match output {
        Some(path) => {
            write(results, path)?;
            println!("JUnit report saved to: {}", path.display());
        }
        None => println!("{}", generate_junit_xml(results)?),
    }
    Ok(())
}
