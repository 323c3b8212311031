use async_trait::async_trait;

use super::{Category, Scenario};
use crate::driver::Selector;
use crate::error::{ensure, HarnessResult};
use crate::runner::check::{resolve, Probe, Verdict};
use crate::runner::context::ScenarioContext;

const SIGNIN_PATH: &str = "/admin-signin";
/// Where a successful admin login lands
const ADMIN_LANDING: &str = "/trip-form";

pub struct AdminSigninPageLoads;

#[async_trait]
impl Scenario for AdminSigninPageLoads {
    fn name(&self) -> &'static str {
        "admin_signin_page_loads"
    }

    fn summary(&self) -> &'static str {
        "Admin sign-in page shows username and password fields"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Critical]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit(SIGNIN_PATH).await?;
        cx.expect_url_contains(SIGNIN_PATH).await?;

        let mut primary = cx.wait_for(&Selector::id("username")).await?;
        if primary == Probe::Confirmed {
            primary = cx.probe_present(&Selector::id("password")).await?;
        }

        let fallback = if primary.is_missing() {
            Some(cx.probe_body_mentions(&["sign", "login"]).await?)
        } else {
            None
        };
        resolve(primary, fallback).into_verdict()
    }
}

pub struct InvalidAdminLogin;

#[async_trait]
impl Scenario for InvalidAdminLogin {
    fn name(&self) -> &'static str {
        "invalid_admin_login"
    }

    fn summary(&self) -> &'static str {
        "Invalid admin credentials keep the user on the sign-in page"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Critical]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit(SIGNIN_PATH).await?;

        if let Probe::Missing(reason) = cx.wait_for(&Selector::id("username")).await? {
            return Ok(Verdict::weak(format!("sign-in form not rendered: {}", reason)));
        }
        let form = [Selector::id("password"), Selector::submit_button()];
        if let Probe::Missing(reason) = cx.probe_all_present(&form).await? {
            return Ok(Verdict::weak(format!("sign-in form incomplete: {}", reason)));
        }

        cx.fill(&Selector::id("username"), "invaliduser").await?;
        cx.fill(&Selector::id("password"), "wrongpassword").await?;
        let landed = cx.submit().await?;

        ensure(
            !landed.contains(ADMIN_LANDING),
            format!(
                "Should not redirect to {} with invalid credentials (was {})",
                ADMIN_LANDING, landed
            ),
        )?;
        cx.expect_url_contains(SIGNIN_PATH).await?;
        Ok(Verdict::strong())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{session_for, MockApp, MockElement, MockPage, SubmitBehavior};
    use crate::error::HarnessError;
    use crate::runner::check::Verification;
    use crate::scenarios::testing::{fast_timeouts, patient_timeouts, run_against, run_in, BASE};

    fn signin_page(on_submit: SubmitBehavior) -> MockPage {
        MockPage::new("Opalumpus", "Admin Sign In")
            .with(MockElement::input("username", "text"))
            .with(MockElement::input("password", "password"))
            .with(MockElement {
                input_type: Some("submit".to_string()),
                ..MockElement::new("button")
            })
            .on_submit(on_submit)
    }

    #[tokio::test]
    async fn signin_form_present_is_strong() {
        let (result, _) = run_against(MockApp::opalumpus(BASE), &AdminSigninPageLoads).await;
        assert_eq!(result.unwrap(), Verdict::strong());
    }

    #[tokio::test]
    async fn signin_without_form_falls_back_to_wording() {
        let (result, _) = run_against(MockApp::skeleton(BASE), &AdminSigninPageLoads).await;
        assert!(matches!(
            result.unwrap(),
            Verdict::Passed(Verification::Weak { .. })
        ));

        let app = MockApp::new(BASE).page(SIGNIN_PATH, MockPage::new("Opalumpus", "Dashboard"));
        let (result, _) = run_against(app, &AdminSigninPageLoads).await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("'sign' or 'login'"), "{}", message);
    }

    #[tokio::test]
    async fn rejected_login_stays_on_signin() {
        let (result, state) = run_against(MockApp::opalumpus(BASE), &InvalidAdminLogin).await;
        assert_eq!(result.unwrap(), Verdict::strong());

        let state = state.lock().unwrap();
        assert_eq!(state.submits, 1);
        assert_eq!(state.values.get("username").map(String::as_str), Some("invaliduser"));
        assert_eq!(state.values.get("password").map(String::as_str), Some("wrongpassword"));
    }

    #[tokio::test]
    async fn redirect_to_trip_form_is_a_hard_failure() {
        let app = MockApp::new(BASE)
            .page(SIGNIN_PATH, signin_page(SubmitBehavior::NavigateTo("/trip-form".into())))
            .page("/trip-form", MockPage::new("Opalumpus", "New trip"));
        let (result, _) = run_against(app, &InvalidAdminLogin).await;
        let err = result.unwrap_err();
        assert!(matches!(err, HarnessError::Assertion(_)));
        assert!(err.to_string().contains("/trip-form"));
    }

    #[tokio::test]
    async fn leaving_signin_for_elsewhere_also_fails() {
        let app = MockApp::new(BASE)
            .page(SIGNIN_PATH, signin_page(SubmitBehavior::NavigateTo("/".into())))
            .page("/", MockPage::new("Opalumpus", "Home"));
        let (result, _) = run_against(app, &InvalidAdminLogin).await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("URL should contain /admin-signin"));
    }

    #[tokio::test]
    async fn rejection_alert_is_answered() {
        let (result, state) = run_against(MockApp::opalumpus(BASE), &InvalidAdminLogin).await;
        assert_eq!(result.unwrap(), Verdict::strong());

        let state = state.lock().unwrap();
        assert_eq!(state.dialogs, vec!["Invalid credentials".to_string()]);
        assert!(state.open_dialog.is_none());
    }

    #[tokio::test]
    async fn unanswered_alert_surfaces_as_an_error() {
        let (session, _) = session_for(MockApp::opalumpus(BASE));
        let session = session.without_dialog_handler();
        let err = run_in(&session, fast_timeouts(), &InvalidAdminLogin)
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Browser(_)));
        assert!(err.to_string().contains("blocked by an open alert"), "{}", err);
    }

    #[tokio::test]
    async fn slow_redirect_to_trip_form_is_still_caught() {
        let app = MockApp::new(BASE)
            .slow_navigation(3)
            .page(
                SIGNIN_PATH,
                signin_page(SubmitBehavior::alert(
                    "Welcome",
                    SubmitBehavior::NavigateTo("/trip-form".into()),
                )),
            )
            .page("/trip-form", MockPage::new("Opalumpus", "New trip"));
        let (session, state) = session_for(app);
        let err = run_in(&session, patient_timeouts(), &InvalidAdminLogin)
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Assertion(_)), "{}", err);
        assert!(err.to_string().contains("/trip-form"));
        assert!(state.lock().unwrap().pending.is_none());
    }

    #[tokio::test]
    async fn missing_form_is_a_weak_pass() {
        let (result, state) = run_against(MockApp::skeleton(BASE), &InvalidAdminLogin).await;
        assert!(matches!(
            result.unwrap(),
            Verdict::Passed(Verification::Weak { .. })
        ));
        assert_eq!(state.lock().unwrap().submits, 0);
    }
}
