//! The Opalumpus scenario suite.
//!
//! Scenarios are independent and run in catalogue order. Each one receives
//! its own browser session through [`ScenarioContext`].

mod admin;
mod api;
mod booking;
pub mod category;
mod navigation;

use async_trait::async_trait;

pub use category::Category;

use crate::error::{HarnessError, HarnessResult};
use crate::runner::check::Verdict;
use crate::runner::context::ScenarioContext;

#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-line description shown by `list` and in reports
    fn summary(&self) -> &'static str;

    fn categories(&self) -> &'static [Category];

    /// API-only scenarios run without a browser session
    fn needs_browser(&self) -> bool {
        true
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict>;

    /// True when the scenario carries every one of `tags`.
    fn matches(&self, tags: &[Category]) -> bool {
        tags.iter().all(|t| self.categories().contains(t))
    }
}

/// Every registered scenario, in run order.
pub fn all() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(navigation::HomepageLoads),
        Box::new(navigation::NavigationMenuExists),
        Box::new(navigation::PageLoads::TRIPS),
        Box::new(navigation::PageLoads::ABOUT),
        Box::new(navigation::PageLoads::CONTACT),
        Box::new(admin::AdminSigninPageLoads),
        Box::new(admin::InvalidAdminLogin),
        Box::new(booking::BookingPageLoads),
        Box::new(booking::BookingFormValidation),
        Box::new(booking::BookingFormSubmission),
        Box::new(api::ApiHealthCheck),
        Box::new(navigation::NavigationFlow),
        Box::new(navigation::PageResponsiveness),
        Box::new(booking::FormFieldTypes),
        Box::new(navigation::BrowserBackNavigation),
    ]
}

/// Narrow the catalogue by tags (all must match) and, if given, by name.
///
/// Unknown scenario names are rejected rather than silently ignored.
pub fn select(tags: &[Category], names: &[String]) -> HarnessResult<Vec<Box<dyn Scenario>>> {
    let catalogue = all();

    for name in names {
        if !catalogue.iter().any(|s| s.name() == name) {
            return Err(HarnessError::UnknownScenario(name.clone()));
        }
    }

    Ok(catalogue
        .into_iter()
        .filter(|s| s.matches(tags))
        .filter(|s| names.is_empty() || names.iter().any(|n| n == s.name()))
        .collect())
}
