use async_trait::async_trait;
use reqwest::StatusCode;

use super::{Category, Scenario};
use crate::error::{ensure, HarnessResult};
use crate::runner::check::Verdict;
use crate::runner::context::ScenarioContext;

/// Body the backend answers with on its root route
const HEALTH_INDICATOR: &str = "API Working";

pub struct ApiHealthCheck;

#[async_trait]
impl Scenario for ApiHealthCheck {
    fn name(&self) -> &'static str {
        "api_health_check"
    }

    fn summary(&self) -> &'static str {
        "Backend API answers 200 with its health message"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Smoke]
    }

    fn needs_browser(&self) -> bool {
        false
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        let url = cx.config.api_endpoint("/");
        log::debug!("GET {}", url);

        let response = match cx.http.get(&url).timeout(cx.timeouts.http).send().await {
            Ok(response) => response,
            Err(e) => return Ok(Verdict::Skipped(format!("API not accessible: {}", e))),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Ok(Verdict::Skipped(format!("API not accessible: {}", e))),
        };
        cx.note(format!("GET {} -> {}", url, status));

        ensure(
            status == StatusCode::OK,
            format!("API should return 200, got {}", status.as_u16()),
        )?;

        if body.contains(HEALTH_INDICATOR) {
            Ok(Verdict::strong())
        } else {
            Ok(Verdict::weak(format!(
                "API answered 200 without '{}'",
                HEALTH_INDICATOR
            )))
        }
    }
}
