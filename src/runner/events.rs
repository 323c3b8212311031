use super::check::Verification;
use super::state::{ScenarioStatus, TestSummary};
use tokio::sync::broadcast;

/// Test execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Suite events
    SuiteStarted {
        session_id: String,
        scenario_count: usize,
        base_url: String,
        api_url: String,
    },
    SuiteFinished {
        summary: TestSummary,
    },

    // Scenario events
    ScenarioStarted {
        name: String,
        index: usize,
        total: usize,
    },
    ScenarioFinished {
        name: String,
        status: ScenarioStatus,
        duration_ms: Option<u64>,
    },

    // Step events
    StepFinished {
        scenario: String,
        index: usize,
        description: String,
        error: Option<String>,
        duration_ms: u64,
    },

    // Log event for coordinated output
    Log {
        message: String,
    },
}

/// Event emitter for broadcasting test events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(256);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }
}

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use indicatif::ProgressDrawTarget;
        use std::io::IsTerminal;

        // Plain output when piped (CI logs)
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut spinner: Option<ProgressBar> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                TestEvent::SuiteStarted {
                    session_id,
                    scenario_count,
                    base_url,
                    api_url,
                } => {
                    println!(
                        "\n{} Opalumpus E2E suite {} ({} scenarios)",
                        "▶".green().bold(),
                        session_id.cyan(),
                        scenario_count
                    );
                    println!("  BASE_URL: {}", base_url.cyan());
                    println!("  API_URL:  {}", api_url.cyan());
                }

                TestEvent::SuiteFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }

                    println!("\n{} Suite finished", "■".blue().bold());
                    println!("  Total scenarios: {}", summary.total_scenarios);
                    println!(
                        "  {} passed ({} weak), {} failed, {} skipped",
                        summary.passed.to_string().green(),
                        summary.weak_passed.to_string().yellow(),
                        summary.failed.to_string().red(),
                        summary.skipped.to_string().yellow()
                    );
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }
                    if summary.all_passed() {
                        println!("{}", "✓ All tests passed!".green().bold());
                    } else {
                        println!(
                            "{}",
                            "✗ Some tests failed. Check the output above.".red().bold()
                        );
                    }
                }

                TestEvent::ScenarioStarted { name, index, total } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    let style = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("  {spinner} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner());
                    pb.set_style(style);
                    pb.set_message(format!("[{}/{}] {}...", index + 1, total, name.white().bold()));
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinner = Some(pb);
                }

                TestEvent::StepFinished {
                    description,
                    error,
                    duration_ms,
                    ..
                } => {
                    let line = match error {
                        None => format!(
                            "      {} {} ({}ms)",
                            "·".dimmed(),
                            description.dimmed(),
                            duration_ms
                        ),
                        Some(error) => format!(
                            "      {} {} ({})",
                            "✗".red(),
                            description,
                            error.red()
                        ),
                    };
                    multi.println(line).ok();
                }

                TestEvent::ScenarioFinished {
                    name,
                    status,
                    duration_ms,
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }

                    let duration = duration_ms
                        .map(|d| format!(" ({}ms)", d))
                        .unwrap_or_default();

                    match status {
                        ScenarioStatus::Passed {
                            verification: Verification::Strong,
                        } => println!("  {} {}{}", "✓".green(), name, duration),
                        ScenarioStatus::Passed {
                            verification: Verification::Weak { reason },
                        } => println!(
                            "  {} {}{} {}",
                            "✓".yellow(),
                            name,
                            duration,
                            format!("[weak: {}]", reason).dimmed()
                        ),
                        ScenarioStatus::Skipped { reason } => println!(
                            "  {} {} {}",
                            "○".yellow(),
                            name,
                            format!("[skipped: {}]", reason).dimmed()
                        ),
                        ScenarioStatus::Failed { error, .. } => {
                            println!("  {} {}{}", "✗".red(), name.red().bold(), duration);
                            for line in error.lines() {
                                println!("      {}", line.red());
                            }
                        }
                        _ => println!("  {} {}", "?".white(), name),
                    }
                }

                TestEvent::Log { message } => {
                    multi.println(format!("    {}", message)).ok();
                }
            }
        }
    }
}
