pub mod check;
pub mod context;
pub mod events;
pub mod executor;
pub mod state;

use colored::Colorize;

use crate::driver::web::WebSessionFactory;
use crate::driver::SessionFactory;
use crate::error::HarnessResult;
use crate::scenarios::{self, Category};
use crate::utils::config::SuiteConfig;

pub use events::*;
pub use executor::{ExecutorOptions, SuiteExecutor};
pub use state::*;

/// What to run and how
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only scenarios carrying every one of these tags
    pub tags: Vec<Category>,
    /// Only these scenarios, by name
    pub scenarios: Vec<String>,
    pub executor: ExecutorOptions,
}

/// Run the selected scenarios against real Chromium sessions.
pub async fn run_suite(config: SuiteConfig, options: RunOptions) -> HarnessResult<TestSummary> {
    run_with_factory(Box::new(WebSessionFactory), config, options).await
}

async fn run_with_factory(
    factory: Box<dyn SessionFactory>,
    config: SuiteConfig,
    options: RunOptions,
) -> HarnessResult<TestSummary> {
    let selected = scenarios::select(&options.tags, &options.scenarios)?;
    if selected.is_empty() {
        println!("{} No scenarios match the given filters.", "ℹ".blue());
    }

    let mut executor = SuiteExecutor::new(factory, config, options.executor)?;
    let listener = tokio::spawn(ConsoleEventListener::listen(executor.subscribe()));

    let summary = executor.run(&selected).await;

    // Closing the channel lets the listener drain and exit
    drop(executor);
    if let Err(e) = listener.await {
        log::warn!("console listener stopped abnormally: {}", e);
    }

    summary
}
