//! Self-contained HTML report: inline CSS, no external fonts or scripts,
//! failure screenshots embedded as data URIs.

use super::types::TestResults;
use crate::error::HarnessResult;
use crate::runner::check::Verification;
use crate::runner::state::{ScenarioReport, ScenarioStatus, StepStatus};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;

pub fn write(results: &TestResults, path: &Path) -> HarnessResult<()> {
    std::fs::write(path, generate_html(results))?;
    Ok(())
}

/// Generate HTML report
pub fn generate(results: &TestResults, output: Option<&Path>) -> HarnessResult<()> {
    match output {
        Some(path) => {
            write(results, path)?;
            println!("HTML report saved to: {}", path.display());
        }
        None => println!("{}", generate_html(results)),
    }
    Ok(())
}

fn status_badge(status: &ScenarioStatus) -> (&'static str, &'static str) {
    match status {
        ScenarioStatus::Passed {
            verification: Verification::Strong,
        } => ("Passed", "passed"),
        ScenarioStatus::Passed {
            verification: Verification::Weak { .. },
        } => ("Passed (weak)", "weak"),
        ScenarioStatus::Failed { .. } => ("Failed", "failed"),
        ScenarioStatus::Skipped { .. } => ("Skipped", "skipped"),
        ScenarioStatus::Pending | ScenarioStatus::Running => ("Not run", "skipped"),
    }
}

/// Inline the screenshot so the report survives being copied around alone.
fn screenshot_html(path: &str) -> String {
    match std::fs::read(path) {
        Ok(bytes) => format!(
            r#"<details class="screenshot"><summary>📸 Failure screenshot</summary><img src="data:image/png;base64,{}" alt="Screenshot"></details>"#,
            STANDARD.encode(bytes)
        ),
        Err(e) => {
            log::warn!("screenshot {} not embedded: {}", path, e);
            format!(
                r#"<div class="screenshot missing">📸 {}</div>"#,
                html_escape(path)
            )
        }
    }
}

fn scenario_html(scenario: &ScenarioReport) -> String {
    let (status_text, status_class) = status_badge(&scenario.status);

    let mut steps_html = String::new();
    for step in &scenario.steps {
        let (icon, class, error_html) = match &step.status {
            StepStatus::Passed => ("✓", "passed", String::new()),
            StepStatus::Failed { error } => (
                "✗",
                "failed",
                format!(r#"<div class="error-message">{}</div>"#, html_escape(error)),
            ),
        };
        steps_html.push_str(&format!(
            r#"
                <div class="step {class}">
                    <div class="step-icon">{icon}</div>
                    <div class="step-content">
                        <div class="step-name">{}</div>
                        <span class="duration">{}ms</span>
                        {error_html}
                    </div>
                </div>"#,
            html_escape(&step.description),
            step.duration_ms,
        ));
    }

    let outcome_html = match &scenario.status {
        ScenarioStatus::Failed { kind, error } => format!(
            r#"<div class="error-message"><strong>{}</strong>: {}</div>"#,
            kind,
            html_escape(error)
        ),
        ScenarioStatus::Passed {
            verification: Verification::Weak { reason },
        } => format!(
            r#"<div class="outcome weak">Verified by fallback check: {}</div>"#,
            html_escape(reason)
        ),
        ScenarioStatus::Skipped { reason } => {
            format!(r#"<div class="outcome skipped">{}</div>"#, html_escape(reason))
        }
        _ => String::new(),
    };

    let notes_html: String = scenario
        .notes
        .iter()
        .map(|n| format!(r#"<li>{}</li>"#, html_escape(n)))
        .collect();
    let notes_html = if notes_html.is_empty() {
        notes_html
    } else {
        format!(r#"<ul class="notes">{}</ul>"#, notes_html)
    };

    let tags: String = scenario
        .categories
        .iter()
        .map(|c| format!(r#"<span class="tag">{}</span>"#, c))
        .collect();

    let duration_html = scenario
        .duration_ms
        .map(|d| format!(r#"<span class="duration">{}</span>"#, format_duration(d)))
        .unwrap_or_default();

    let screenshot = scenario
        .screenshot_path
        .as_deref()
        .map(screenshot_html)
        .unwrap_or_default();

    format!(
        r#"
            <div class="scenario {status_class}">
                <div class="scenario-header">
                    <div>
                        <h3>{} <span class="status-badge">{status_text}</span></h3>
                        <div class="summary-line">{} {tags}</div>
                    </div>
                    {duration_html}
                </div>
                <div class="steps">{steps_html}
                    {outcome_html}
                    {notes_html}
                    {screenshot}
                </div>
            </div>"#,
        html_escape(&scenario.name),
        html_escape(&scenario.summary),
    )
}

fn generate_html(results: &TestResults) -> String {
    let summary = &results.summary;
    let ran = summary.total_scenarios.saturating_sub(summary.skipped);
    let pass_rate = if ran > 0 {
        (summary.passed as f64 / ran as f64 * 100.0) as u32
    } else {
        0
    };

    let scenarios_html: String = results.scenarios.iter().map(scenario_html).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Opalumpus E2E Report - {session}</title>
    <style>
        :root {{
            --bg-primary: #0a0f1d;
            --bg-secondary: #141b2d;
            --bg-tertiary: #1f2937;
            --border: #374151;
            --text-primary: #f9fafb;
            --text-secondary: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --yellow: #f59e0b;
            --blue: #3b82f6;
            --purple: #8b5cf6;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
            padding: 3rem 1rem;
        }}
        .container {{ max-width: 1100px; margin: 0 auto; }}
        header {{ margin-bottom: 2.5rem; display: flex; justify-content: space-between; align-items: flex-end; }}
        h1 {{ font-size: 2.25rem; font-weight: 800; letter-spacing: -0.025em; }}
        .eyebrow {{ font-size: 0.875rem; font-weight: 600; color: var(--purple); text-transform: uppercase; letter-spacing: 0.1em; margin-bottom: 0.5rem; }}
        .targets {{ color: var(--text-secondary); font-size: 0.875rem; margin-top: 0.5rem; }}
        .summary {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 1.25rem; margin-bottom: 2.5rem; }}
        .stat {{ background: var(--bg-secondary); border: 1px solid var(--border); padding: 1.25rem; border-radius: 1rem; }}
        .stat-value {{ font-size: 2.25rem; font-weight: 800; }}
        .stat-label {{ color: var(--text-secondary); font-size: 0.8rem; font-weight: 500; text-transform: uppercase; letter-spacing: 0.05em; }}
        .stat.passed .stat-value {{ color: var(--green); }}
        .stat.weak .stat-value {{ color: var(--yellow); }}
        .stat.failed .stat-value {{ color: var(--red); }}
        .stat.skipped .stat-value {{ color: var(--text-secondary); }}
        .progress-container {{ margin-bottom: 3rem; }}
        .progress-bar {{ background: var(--bg-secondary); height: 12px; border-radius: 6px; overflow: hidden; border: 1px solid var(--border); }}
        .progress-fill {{ height: 100%; background: var(--green); }}
        .scenario {{ background: var(--bg-secondary); border: 1px solid var(--border); border-radius: 1.25rem; margin-bottom: 1.5rem; overflow: hidden; }}
        .scenario-header {{ padding: 1.25rem 1.5rem; display: flex; justify-content: space-between; align-items: center; border-bottom: 1px solid var(--border); }}
        .scenario-header h3 {{ font-size: 1.15rem; font-weight: 700; display: flex; align-items: center; gap: 0.75rem; font-family: ui-monospace, monospace; }}
        .summary-line {{ color: var(--text-secondary); font-size: 0.875rem; margin-top: 0.25rem; }}
        .tag {{ background: var(--bg-tertiary); border-radius: 9999px; padding: 0.05rem 0.6rem; font-size: 0.7rem; margin-left: 0.35rem; }}
        .status-badge {{ padding: 0.2rem 0.75rem; border-radius: 9999px; font-size: 0.7rem; font-weight: 600; text-transform: uppercase; font-family: system-ui, sans-serif; }}
        .scenario.passed .status-badge {{ background: rgba(16, 185, 129, 0.1); color: var(--green); }}
        .scenario.weak .status-badge {{ background: rgba(245, 158, 11, 0.1); color: var(--yellow); }}
        .scenario.failed .status-badge {{ background: rgba(239, 68, 68, 0.1); color: var(--red); }}
        .scenario.skipped .status-badge {{ background: rgba(156, 163, 175, 0.1); color: var(--text-secondary); }}
        .steps {{ padding: 1rem 1.5rem; }}
        .step {{ padding: 0.5rem; border-radius: 0.75rem; display: flex; align-items: flex-start; gap: 1rem; }}
        .step-icon {{ width: 1.75rem; height: 1.75rem; display: flex; align-items: center; justify-content: center; border-radius: 0.5rem; flex-shrink: 0; }}
        .step.passed .step-icon {{ background: rgba(16, 185, 129, 0.1); color: var(--green); }}
        .step.failed .step-icon {{ background: rgba(239, 68, 68, 0.1); color: var(--red); }}
        .step-content {{ flex: 1; }}
        .step-name {{ font-family: ui-monospace, monospace; font-size: 0.9rem; }}
        .duration {{ color: var(--text-secondary); font-size: 0.75rem; font-weight: 500; }}
        .error-message {{ background: rgba(239, 68, 68, 0.1); border-radius: 0.5rem; padding: 0.75rem; margin-top: 0.75rem; color: #fca5a5; font-size: 0.8rem; font-family: ui-monospace, monospace; border: 1px solid rgba(239, 68, 68, 0.2); white-space: pre-wrap; }}
        .outcome {{ border-radius: 0.5rem; padding: 0.75rem; margin-top: 0.75rem; font-size: 0.85rem; }}
        .outcome.weak {{ background: rgba(245, 158, 11, 0.1); color: #fcd34d; }}
        .outcome.skipped {{ background: var(--bg-tertiary); color: var(--text-secondary); }}
        .notes {{ margin: 0.75rem 0 0 1.5rem; color: var(--text-secondary); font-size: 0.85rem; }}
        .screenshot {{ margin-top: 1rem; }}
        .screenshot summary {{ cursor: pointer; color: var(--blue); font-weight: 600; }}
        .screenshot img {{ margin-top: 0.75rem; max-width: 100%; border-radius: 0.5rem; }}
        .meta {{ margin-top: 3rem; padding-top: 2rem; border-top: 1px solid var(--border); color: var(--text-secondary); font-size: 0.875rem; display: flex; justify-content: center; gap: 2rem; }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <div>
                <div class="eyebrow">Opalumpus</div>
                <h1>End-to-End Test Report</h1>
                <div class="targets">App: {base_url} &middot; API: {api_url}</div>
            </div>
            <div style="text-align: right;">
                <div style="font-size: 0.875rem; color: var(--text-secondary);">Run Duration</div>
                <div style="font-size: 1.25rem; font-weight: 700;">{duration}</div>
            </div>
        </header>

        <div class="summary">
            <div class="stat"><div class="stat-value">{total}</div><div class="stat-label">Scenarios</div></div>
            <div class="stat passed"><div class="stat-value">{passed}</div><div class="stat-label">Passed</div></div>
            <div class="stat weak"><div class="stat-value">{weak}</div><div class="stat-label">Weak passes</div></div>
            <div class="stat failed"><div class="stat-value">{failed}</div><div class="stat-label">Failed</div></div>
            <div class="stat skipped"><div class="stat-value">{skipped}</div><div class="stat-label">Skipped</div></div>
        </div>

        <div class="progress-container">
            <div style="display: flex; justify-content: space-between; margin-bottom: 0.75rem;">
                <span style="font-weight: 600; font-size: 0.875rem;">Success Rate</span>
                <span style="font-weight: 700; color: var(--green);">{pass_rate}%</span>
            </div>
            <div class="progress-bar"><div class="progress-fill" style="width: {pass_rate}%"></div></div>
        </div>

        {scenarios_html}

        <div class="meta">
            <span>Session: {session}</span>
            <span>Generated: {generated}</span>
        </div>
    </div>
</body>
</html>"#,
        session = html_escape(&results.session_id),
        base_url = html_escape(&results.base_url),
        api_url = html_escape(&results.api_url),
        duration = format_duration(summary.total_duration_ms.unwrap_or(0)),
        total = summary.total_scenarios,
        passed = summary.passed,
        weak = summary.weak_passed,
        failed = summary.failed,
        skipped = summary.skipped,
        pass_rate = pass_rate,
        scenarios_html = scenarios_html,
        generated = html_escape(&results.generated_at),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60000;
        let seconds = (ms % 60000) as f64 / 1000.0;
        format!("{}m {:.0}s", minutes, seconds)
    }
}
