//! Scripted in-memory browser for unit tests.
//!
//! A [`MockApp`] describes the routes of a fake front-end; [`MockFactory`]
//! hands out fresh [`MockSession`]s over it and remembers every session it
//! created so tests can check lifecycle guarantees afterwards.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::driver::traits::{BrowserSession, Selector, SessionFactory};
use crate::utils::config::SessionConfig;

#[derive(Debug, Clone)]
pub struct MockElement {
    pub tag: String,
    pub id: Option<String>,
    pub input_type: Option<String>,
    pub required: bool,
}

impl MockElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            input_type: None,
            required: false,
        }
    }

    pub fn input(id: &str, input_type: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            input_type: Some(input_type.to_string()),
            ..Self::new("input")
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Tag(tag) => &self.tag == tag,
            Selector::Id(id) => self.id.as_deref() == Some(id.as_str()),
            Selector::Css(css) => {
                if let Some(id) = css.strip_prefix('#') {
                    return self.id.as_deref() == Some(id);
                }
                let (tag, attr) = match css.split_once('[') {
                    Some((tag, rest)) => (tag, Some(rest.trim_end_matches(']'))),
                    None => (css.as_str(), None),
                };
                if !tag.is_empty() && tag != self.tag {
                    return false;
                }
                match attr.and_then(|a| a.strip_prefix("type=")) {
                    Some(t) => self.input_type.as_deref() == Some(t.trim_matches('\'')),
                    None => attr.is_none(),
                }
            }
        }
    }
}

/// What pressing the submit button does on a page
#[derive(Debug, Clone, Default)]
pub enum SubmitBehavior {
    /// Nothing happens (rejected login)
    #[default]
    Stay,
    /// Client-side router moves to another route
    NavigateTo(String),
    /// Native validation blocks empty required fields; otherwise the form posts and resets
    ValidateThenClear,
    /// Run `then`, and if the form actually went out, raise `alert(message)`
    Alert {
        message: String,
        then: Box<SubmitBehavior>,
    },
}

impl SubmitBehavior {
    pub fn alert(message: &str, then: SubmitBehavior) -> Self {
        SubmitBehavior::Alert {
            message: message.to_string(),
            then: Box::new(then),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub title: String,
    pub body_text: String,
    pub elements: Vec<MockElement>,
    pub on_submit: SubmitBehavior,
    /// Reads of the body text that come back empty after each navigation
    pub render_after: usize,
}

impl MockPage {
    pub fn new(title: &str, body_text: &str) -> Self {
        Self {
            title: title.to_string(),
            body_text: body_text.to_string(),
            ..Self::default()
        }
    }

    pub fn with(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn on_submit(mut self, behavior: SubmitBehavior) -> Self {
        self.on_submit = behavior;
        self
    }

    /// Content only shows up on the `reads + 1`th look at the body.
    pub fn rendered_after(mut self, reads: usize) -> Self {
        self.render_after = reads;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockApp {
    pub base_url: String,
    pub pages: HashMap<String, MockPage>,
    /// Body is reported hidden when the viewport is narrower than this
    pub body_hidden_below: Option<u32>,
    /// Every navigation fails (server down)
    pub unreachable: bool,
    /// Location reads a submit or back navigation stays in flight for
    pub navigation_delay: usize,
}

impl MockApp {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn page(mut self, path: &str, page: MockPage) -> Self {
        self.pages.insert(path.to_string(), page);
        self
    }

    pub fn slow_navigation(mut self, reads: usize) -> Self {
        self.navigation_delay = reads;
        self
    }

    /// A front-end that honours the full DOM contract the suite relies on.
    pub fn opalumpus(base_url: &str) -> Self {
        let nav = MockElement::new("nav");
        let link = MockElement::new("a");
        let submit = MockElement {
            input_type: Some("submit".to_string()),
            ..MockElement::new("button")
        };

        Self::new(base_url)
            .page(
                "/",
                MockPage::new("Opalumpus", "Welcome to Opalumpus. Explore trips.")
                    .with(nav.clone())
                    .with(link.clone()),
            )
            .page(
                "/trips",
                MockPage::new("Opalumpus", "Upcoming trips: Bali, Goa").with(nav.clone()),
            )
            .page(
                "/about",
                MockPage::new("Opalumpus", "About us: we plan journeys").with(nav.clone()),
            )
            .page(
                "/contactus",
                MockPage::new("Opalumpus", "Contact us at hello@opalumpus").with(nav.clone()),
            )
            .page(
                "/admin-signin",
                MockPage::new("Opalumpus", "Admin Sign In")
                    .with(MockElement::input("username", "text").required())
                    .with(MockElement::input("password", "password").required())
                    .with(submit.clone())
                    .on_submit(SubmitBehavior::alert("Invalid credentials", SubmitBehavior::Stay)),
            )
            .page(
                "/book-now",
                MockPage::new("Opalumpus", "Book Your Trip")
                    .with(MockElement::input("userName", "text").required())
                    .with(MockElement::input("userEmail", "email").required())
                    .with(MockElement::input("numberOfPeople", "number").required())
                    .with(MockElement {
                        id: Some("additionalNotes".to_string()),
                        ..MockElement::new("textarea")
                    })
                    .with(submit)
                    .on_submit(SubmitBehavior::alert(
                        "Booking successfully created!",
                        SubmitBehavior::ValidateThenClear,
                    )),
            )
    }

    /// Same routes, but only placeholder text and no forms or navigation landmarks.
    pub fn skeleton(base_url: &str) -> Self {
        Self::new(base_url)
            .page("/", MockPage::new("Opalumpus", "Coming soon").with(MockElement::new("a")))
            .page("/trips", MockPage::new("Opalumpus", "Trips coming soon"))
            .page("/about", MockPage::new("Opalumpus", "About"))
            .page("/contactus", MockPage::new("Opalumpus", "Contact"))
            .page("/admin-signin", MockPage::new("Opalumpus", "Please sign in"))
            .page("/book-now", MockPage::new("Opalumpus", "Book now - under construction"))
    }
}

/// A navigation the page has started but not yet committed
#[derive(Debug, Clone)]
pub enum PendingNavigation {
    Push(String),
    Back,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub history: Vec<String>,
    pub cursor: usize,
    pub values: HashMap<String, String>,
    pub viewport: (u32, u32),
    pub cookies: usize,
    pub closed: bool,
    pub screenshots: Vec<String>,
    pub submits: usize,
    /// Alert the page is stuck on
    pub open_dialog: Option<String>,
    /// Alerts that were answered
    pub dialogs: Vec<String>,
    pub pending: Option<(PendingNavigation, usize)>,
    pub body_reads: usize,
}

impl MockState {
    fn apply(&mut self, navigation: PendingNavigation) {
        match navigation {
            PendingNavigation::Push(path) => {
                let cursor = self.cursor;
                self.history.truncate(cursor + 1);
                self.history.push(path);
                self.cursor += 1;
            }
            PendingNavigation::Back => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
        }
        self.body_reads = 0;
    }

    fn navigate(&mut self, navigation: PendingNavigation, delay: usize) {
        if delay == 0 {
            self.apply(navigation);
        } else {
            self.pending = Some((navigation, delay));
        }
    }
}

pub struct MockSession {
    app: Arc<MockApp>,
    state: Arc<Mutex<MockState>>,
    /// Mirrors the dialog handler a real session installs
    answers_dialogs: bool,
}

impl MockSession {
    pub fn new(app: Arc<MockApp>, state: Arc<Mutex<MockState>>) -> Self {
        Self {
            app,
            state,
            answers_dialogs: true,
        }
    }

    /// A session that leaves alerts open, blocking the page.
    pub fn without_dialog_handler(mut self) -> Self {
        self.answers_dialogs = false;
        self
    }

    /// Calls that evaluate inside the page fail the way a browser does when
    /// the page is stuck on a dialog or between documents.
    fn page_script(&self) -> Result<()> {
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.open_dialog {
            anyhow::bail!("page is blocked by an open alert: {}", message);
        }
        if state.pending.is_some() {
            anyhow::bail!("Execution context was destroyed, most likely because of a navigation");
        }
        Ok(())
    }

    fn current_path(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.history.get(state.cursor).cloned()
    }

    fn current_page(&self) -> Option<MockPage> {
        self.current_path()
            .and_then(|p| self.app.pages.get(&p).cloned())
    }

    fn body_visible(&self) -> bool {
        let width = self.state.lock().unwrap().viewport.0;
        match self.app.body_hidden_below {
            Some(min) => width >= min,
            None => true,
        }
    }

    fn find(&self, selector: &Selector) -> Option<MockElement> {
        if matches!(selector, Selector::Tag(t) if t == "body") {
            return self.current_page().map(|_| MockElement::new("body"));
        }
        self.current_page()?
            .elements
            .into_iter()
            .find(|el| el.matches(selector))
    }

    fn submit(&self, page: &MockPage) {
        let mut state = self.state.lock().unwrap();
        state.submits += 1;
        self.react(&mut state, page, &page.on_submit);
    }

    /// Returns whether the form was actually sent
    fn react(&self, state: &mut MockState, page: &MockPage, behavior: &SubmitBehavior) -> bool {
        match behavior {
            SubmitBehavior::Stay => true,
            SubmitBehavior::NavigateTo(path) => {
                state.navigate(PendingNavigation::Push(path.clone()), self.app.navigation_delay);
                true
            }
            SubmitBehavior::ValidateThenClear => {
                let blocked = page.elements.iter().any(|el| {
                    el.required
                        && el
                            .id
                            .as_ref()
                            .map_or(true, |id| state.values.get(id).map_or(true, |v| v.is_empty()))
                });
                if !blocked {
                    state.values.clear();
                }
                !blocked
            }
            SubmitBehavior::Alert { message, then } => {
                let sent = self.react(state, page, then);
                if sent {
                    if self.answers_dialogs {
                        state.dialogs.push(message.clone());
                    } else {
                        state.open_dialog = Some(message.clone());
                    }
                }
                sent
            }
        }
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn goto(&self, url: &str) -> Result<()> {
        if self.app.unreachable {
            anyhow::bail!("net::ERR_CONNECTION_REFUSED at {}", url);
        }
        let path = url
            .strip_prefix(&self.app.base_url)
            .unwrap_or(url)
            .to_string();
        let path = if path.is_empty() { "/".to_string() } else { path };

        let mut state = self.state.lock().unwrap();
        if !state.history.is_empty() {
            let cursor = state.cursor;
            state.history.truncate(cursor + 1);
            state.cursor += 1;
        }
        state.history.push(path);
        state.values.clear();
        state.body_reads = 0;
        state.pending = None;
        Ok(())
    }

    /// Each read moves an in-flight navigation one step closer to commit.
    async fn current_url(&self) -> Result<String> {
        {
            let mut state = self.state.lock().unwrap();
            if let Some((navigation, reads_left)) = state.pending.take() {
                if reads_left > 1 {
                    state.pending = Some((navigation, reads_left - 1));
                } else {
                    state.apply(navigation);
                }
            }
        }
        Ok(match self.current_path() {
            Some(path) => format!("{}{}", self.app.base_url, path),
            None => "about:blank".to_string(),
        })
    }

    async fn title(&self) -> Result<String> {
        self.page_script()?;
        Ok(self.current_page().map(|p| p.title).unwrap_or_default())
    }

    async fn ready_state(&self) -> Result<String> {
        self.page_script()?;
        Ok("complete".to_string())
    }

    async fn wait_for_element(&self, selector: &Selector, _timeout: Duration) -> Result<bool> {
        self.page_script()?;
        Ok(self.find(selector).is_some())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        self.page_script()?;
        Ok(self
            .current_page()
            .map(|p| p.elements.iter().filter(|el| el.matches(selector)).count())
            .unwrap_or(0))
    }

    async fn text(&self, selector: &Selector) -> Result<Option<String>> {
        self.page_script()?;
        if matches!(selector, Selector::Tag(t) if t == "body") {
            let Some(page) = self.current_page() else {
                return Ok(None);
            };
            let mut state = self.state.lock().unwrap();
            if state.body_reads < page.render_after {
                state.body_reads += 1;
                return Ok(Some(String::new()));
            }
            return Ok(Some(page.body_text));
        }
        Ok(self.find(selector).map(|_| String::new()))
    }

    async fn attribute(&self, selector: &Selector, name: &str) -> Result<Option<String>> {
        self.page_script()?;
        let element = self.find(selector);
        Ok(match name {
            "type" => element.and_then(|el| el.input_type),
            "id" => element.and_then(|el| el.id),
            _ => None,
        })
    }

    async fn value(&self, selector: &Selector) -> Result<Option<String>> {
        self.page_script()?;
        let Some(el) = self.find(selector) else {
            return Ok(None);
        };
        let state = self.state.lock().unwrap();
        Ok(Some(
            el.id
                .and_then(|id| state.values.get(&id).cloned())
                .unwrap_or_default(),
        ))
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        self.page_script()?;
        if matches!(selector, Selector::Tag(t) if t == "body") {
            return Ok(self.current_page().is_some() && self.body_visible());
        }
        Ok(self.find(selector).is_some())
    }

    async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        self.page_script()?;
        let el = self
            .find(selector)
            .ok_or_else(|| anyhow::anyhow!("Element not found: {}", selector))?;
        if let Some(id) = el.id {
            self.state.lock().unwrap().values.insert(id, text.to_string());
        }
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        self.page_script()?;
        let el = self
            .find(selector)
            .ok_or_else(|| anyhow::anyhow!("Element not found: {}", selector))?;
        if el.input_type.as_deref() == Some("submit") {
            if let Some(page) = self.current_page() {
                self.submit(&page);
            }
        }
        Ok(())
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        self.state.lock().unwrap().viewport = (width, height);
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        self.page_script()?;
        let mut state = self.state.lock().unwrap();
        state.navigate(PendingNavigation::Back, self.app.navigation_delay);
        Ok(())
    }

    async fn history_length(&self) -> Result<u32> {
        self.page_script()?;
        let state = self.state.lock().unwrap();
        Ok(state.history.len().max(1) as u32)
    }

    async fn cookie_count(&self) -> Result<usize> {
        Ok(self.state.lock().unwrap().cookies)
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        std::fs::write(path, b"\x89PNG\r\n\x1a\n")?;
        self.state
            .lock()
            .unwrap()
            .screenshots
            .push(path.display().to_string());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Hands out a brand-new [`MockSession`] per acquisition
pub struct MockFactory {
    app: Arc<MockApp>,
    pub sessions: Mutex<Vec<Arc<Mutex<MockState>>>>,
    /// Make every acquisition fail with this message
    pub fail_with: Option<String>,
    /// Pre-seed sessions with cookies, as if a profile were being reused
    pub leak_cookies: bool,
}

impl MockFactory {
    pub fn new(app: MockApp) -> Self {
        Self {
            app: Arc::new(app),
            sessions: Mutex::new(Vec::new()),
            fail_with: None,
            leak_cookies: false,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(MockApp::default())
        }
    }

    pub fn states(&self) -> Vec<Arc<Mutex<MockState>>> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for MockFactory {
    async fn acquire(&self, config: &SessionConfig) -> Result<Box<dyn BrowserSession>> {
        if let Some(ref message) = self.fail_with {
            anyhow::bail!("{}", message);
        }
        let state = Arc::new(Mutex::new(MockState {
            viewport: (config.window_width, config.window_height),
            cookies: usize::from(self.leak_cookies),
            ..MockState::default()
        }));
        self.sessions.lock().unwrap().push(state.clone());

        Ok(Box::new(MockSession::new(self.app.clone(), state)))
    }
}

/// Open a single session over `app` for scenario-level tests.
pub fn session_for(app: MockApp) -> (MockSession, Arc<Mutex<MockState>>) {
    let state = Arc::new(Mutex::new(MockState {
        viewport: (1920, 1080),
        ..MockState::default()
    }));
    (MockSession::new(Arc::new(app), state.clone()), state)
}
