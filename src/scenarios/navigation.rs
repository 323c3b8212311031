use async_trait::async_trait;

use super::{Category, Scenario};
use crate::driver::Selector;
use crate::error::{ensure, HarnessError, HarnessResult};
use crate::runner::check::{resolve, Probe, Verdict};
use crate::runner::context::ScenarioContext;

pub struct HomepageLoads;

#[async_trait]
impl Scenario for HomepageLoads {
    fn name(&self) -> &'static str {
        "homepage_loads"
    }

    fn summary(&self) -> &'static str {
        "Homepage loads with a title and a body"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Smoke, Category::Critical]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit("/").await?;

        let title = cx.title().await?;
        ensure(!title.trim().is_empty(), "Page title should not be empty")?;

        if let Probe::Missing(reason) = cx.wait_for(&Selector::tag("body")).await? {
            return Err(HarnessError::Assertion(reason));
        }

        let base = cx.config.base_url.clone();
        cx.expect_url_contains(&base).await?;
        Ok(Verdict::strong())
    }
}

pub struct NavigationMenuExists;

#[async_trait]
impl Scenario for NavigationMenuExists {
    fn name(&self) -> &'static str {
        "navigation_menu_exists"
    }

    fn summary(&self) -> &'static str {
        "Homepage has a navigation menu, or at least some links"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Smoke]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit("/").await?;

        let primary = cx.wait_for(&Selector::tag("nav")).await?;
        let fallback = if primary.is_missing() {
            Some(cx.probe_present(&Selector::tag("a")).await?)
        } else {
            None
        };
        resolve(primary, fallback).into_verdict()
    }
}

/// Direct navigation to a content route: the location must follow and the
/// page must render something.
pub struct PageLoads {
    name: &'static str,
    summary: &'static str,
    path: &'static str,
    label: &'static str,
    categories: &'static [Category],
}

impl PageLoads {
    pub const TRIPS: PageLoads = PageLoads {
        name: "navigate_to_trips_page",
        summary: "Trips page is reachable and has content",
        path: "/trips",
        label: "Trips page",
        categories: &[Category::Smoke, Category::Critical],
    };

    pub const ABOUT: PageLoads = PageLoads {
        name: "navigate_to_about_page",
        summary: "About page is reachable and has content",
        path: "/about",
        label: "About page",
        categories: &[Category::Regression],
    };

    pub const CONTACT: PageLoads = PageLoads {
        name: "navigate_to_contact_page",
        summary: "Contact Us page is reachable and has content",
        path: "/contactus",
        label: "Contact page",
        categories: &[Category::Regression],
    };
}

#[async_trait]
impl Scenario for PageLoads {
    fn name(&self) -> &'static str {
        self.name
    }

    fn summary(&self) -> &'static str {
        self.summary
    }

    fn categories(&self) -> &'static [Category] {
        self.categories
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit(self.path).await?;
        cx.expect_url_contains(self.path).await?;
        cx.expect_body_text(self.label).await?;
        Ok(Verdict::strong())
    }
}

pub struct NavigationFlow;

#[async_trait]
impl Scenario for NavigationFlow {
    fn name(&self) -> &'static str {
        "navigation_flow"
    }

    fn summary(&self) -> &'static str {
        "Home, Trips, About and Contact visited in sequence"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Regression]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit("/").await?;
        let base = cx.config.base_url.clone();
        cx.expect_url_contains(&base).await?;

        for path in ["/trips", "/about", "/contactus"] {
            cx.visit(path).await?;
            cx.expect_url_contains(path).await?;
        }
        Ok(Verdict::strong())
    }
}

/// Desktop, tablet and phone viewports
const VIEWPORTS: [(u32, u32, &str); 3] = [
    (1920, 1080, "desktop"),
    (768, 1024, "tablet"),
    (375, 667, "mobile"),
];

pub struct PageResponsiveness;

#[async_trait]
impl Scenario for PageResponsiveness {
    fn name(&self) -> &'static str {
        "page_responsiveness"
    }

    fn summary(&self) -> &'static str {
        "Homepage body stays visible at desktop, tablet and mobile sizes"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Regression]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit("/").await?;

        for (width, height, label) in VIEWPORTS {
            cx.resize(width, height).await?;
            cx.expect_visible(&Selector::tag("body"), &format!("Page at {} size", label))
                .await?;
        }
        Ok(Verdict::strong())
    }
}

pub struct BrowserBackNavigation;

#[async_trait]
impl Scenario for BrowserBackNavigation {
    fn name(&self) -> &'static str {
        "browser_back_navigation"
    }

    fn summary(&self) -> &'static str {
        "Back button returns from Trips to the homepage"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Regression]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit("/").await?;
        cx.visit("/trips").await?;
        cx.expect_url_contains("/trips").await?;

        cx.back().await?;
        cx.expect_url_excludes("/trips").await?;
        Ok(Verdict::strong())
    }
}
