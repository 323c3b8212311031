use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::config::{SessionConfig, SuiteConfig};

/// Environment snapshot attached to setup failures so CI logs are debuggable.
#[derive(Debug, Clone)]
pub struct RuntimeDiagnostics {
    pub harness_version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
    pub executable: Option<PathBuf>,
    pub browser: Option<PathBuf>,
    pub display: Option<String>,
}

impl RuntimeDiagnostics {
    pub fn collect(configured_browser: Option<&Path>) -> Self {
        let browser = configured_browser
            .map(Path::to_path_buf)
            .or_else(find_browser);

        Self {
            harness_version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            executable: std::env::current_exe().ok(),
            browser,
            display: std::env::var("DISPLAY").ok(),
        }
    }
}

impl fmt::Display for RuntimeDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  harness: opalumpus-e2e {} ({}/{})",
            self.harness_version, self.os, self.arch
        )?;
        match &self.executable {
            Some(exe) => writeln!(f, "  executable: {}", exe.display())?,
            None => writeln!(f, "  executable: <unknown>")?,
        }
        match &self.browser {
            Some(path) => writeln!(f, "  browser: {}", path.display())?,
            None => writeln!(f, "  browser: <none found, relying on Playwright's bundled Chromium>")?,
        }
        write!(
            f,
            "  display: {}",
            self.display.as_deref().unwrap_or("<unset>")
        )
    }
}

/// Look for a Chrome/Chromium binary on this machine.
pub fn find_browser() -> Option<PathBuf> {
    let common_paths = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    for path in common_paths {
        let p = Path::new(path);
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }

    ["google-chrome", "chromium", "chromium-browser", "chrome"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Print what the harness would run against, without launching anything.
pub fn print_doctor(suite: &SuiteConfig, session: &SessionConfig) {
    let diagnostics = RuntimeDiagnostics::collect(session.browser_executable.as_deref());

    println!("{}", "Runtime".blue().bold());
    println!("{}", diagnostics);

    println!("\n{}", "Targets".blue().bold());
    println!("  BASE_URL: {}", suite.base_url.cyan());
    println!("  API_URL:  {}", suite.api_url.cyan());

    println!("\n{}", "Browser session".blue().bold());
    println!("  headless: {}", session.headless);
    println!(
        "  window: {}x{}",
        session.window_width, session.window_height
    );
    println!("  implicit wait: {:?}", session.implicit_wait);
    println!("  args: {}", session.launch_args().join(" ").dimmed());

    if diagnostics.browser.is_none() {
        println!(
            "\n{} No system Chrome found; Playwright will use its own download.",
            "⚠️".yellow()
        );
    }
}
