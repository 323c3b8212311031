pub mod driver;
pub mod error;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod utils;

// Re-export common items
pub use report::generate_report;
pub use runner::run_suite;
