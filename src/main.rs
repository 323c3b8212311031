use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use opalumpus_e2e::error::HarnessResult;
use opalumpus_e2e::report::{self, ReportFormat};
use opalumpus_e2e::runner::{self, ExecutorOptions, RunOptions};
use opalumpus_e2e::scenarios::{self, Category, Scenario};
use opalumpus_e2e::utils::config::{SessionConfig, SuiteConfig};
use opalumpus_e2e::utils::system;

#[derive(Parser)]
#[command(name = "opalumpus-e2e")]
#[command(version)]
#[command(about = "Browser-driven end-to-end tests for the Opalumpus app", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the suite (the default when no subcommand is given)
    Run(RunArgs),

    /// List registered scenarios and their categories
    List {
        /// Only scenarios carrying all of these tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Generate report from test results
    Report {
        /// Path to test-results.json
        results: PathBuf,

        #[arg(short, long, value_enum, default_value = "html")]
        format: ReportFormat,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show runtime diagnostics and the resolved configuration
    Doctor,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Only scenarios carrying all of these tags (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Run only this scenario. Can be specified multiple times.
    #[arg(long = "scenario")]
    scenarios: Vec<String>,

    /// Output directory for reports and artifacts
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Front-end URL (overrides BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Backend API URL (overrides API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Do not write JSON, HTML and JUnit reports
    #[arg(long)]
    no_report: bool,

    /// Capture a screenshot when a scenario fails (default)
    #[arg(long, overrides_with = "no_snapshot")]
    snapshot: bool,

    #[arg(long, overrides_with = "snapshot")]
    no_snapshot: bool,

    /// Stop running scenarios after the first failure
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let (loaded, logger) = startup(None);
    log::set_max_level(logger.filter());
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        if let Some(path) = loaded {
            log::debug!("loaded environment from {}", path.display());
        }
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Run(args)) => run(args).await,
        None => run(cli.run).await,
        Some(Commands::List { tags }) => list(&tags).map(|_| ExitCode::SUCCESS),
        Some(Commands::Report {
            results,
            format,
            output,
        }) => {
            println!(
                "{} Generating {:?} report from: {}",
                "📊".to_string().blue(),
                format,
                results.display()
            );
            report::generate_report(&results, format, output.as_deref()).map(|_| ExitCode::SUCCESS)
        }
        Some(Commands::Doctor) => doctor(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

/// Load `.env` (the working directory's unless `env_file` is given), then
/// build the logger, so a RUST_LOG set in the file takes effect.
fn startup(env_file: Option<&Path>) -> (Option<PathBuf>, env_logger::Logger) {
    let loaded = match env_file {
        Some(path) => dotenvy::from_path(path).ok().map(|_| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    };
    let logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).build();
    (loaded, logger)
}

async fn run(args: RunArgs) -> HarnessResult<ExitCode> {
    let tags = Category::parse_list(&args.tags)?;
    let config = SuiteConfig::from_env()?
        .with_overrides(args.base_url.as_deref(), args.api_url.as_deref())?;

    let mut session = SessionConfig::default();
    if args.headed {
        session.headless = false;
    }

    let options = RunOptions {
        tags,
        scenarios: args.scenarios,
        executor: ExecutorOptions {
            output_dir: args.output,
            report: !args.no_report,
            snapshot: args.snapshot || !args.no_snapshot,
            fail_fast: args.fail_fast,
            session,
            ..ExecutorOptions::default()
        },
    };

    let summary = runner::run_suite(config, options).await?;
    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn list(tags: &[String]) -> HarnessResult<()> {
    let tags = Category::parse_list(tags)?;
    let selected = scenarios::select(&tags, &[])?;

    println!("{}", "Scenarios".blue().bold());
    for scenario in &selected {
        let categories: Vec<&str> = scenario.categories().iter().map(|c| c.as_str()).collect();
        println!(
            "  {:<36} {:<22} {}",
            scenario.name().cyan(),
            categories.join(",").yellow(),
            scenario.summary().dimmed()
        );
    }

    println!("\n{}", "Categories".blue().bold());
    for category in Category::ALL {
        println!("  {:<12} {}", category.as_str().yellow(), category.description());
    }
    Ok(())
}

fn doctor() -> HarnessResult<ExitCode> {
    let config = SuiteConfig::from_env()?;
    system::print_doctor(&config, &SessionConfig::default());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn log_level_from_env_file_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "RUST_LOG=trace\n").unwrap();
        std::env::remove_var("RUST_LOG");

        let (loaded, logger) = startup(Some(&env_file));
        assert_eq!(loaded.as_deref(), Some(env_file.as_path()));
        assert_eq!(logger.filter(), LevelFilter::Trace);
        std::env::remove_var("RUST_LOG");
    }
}
