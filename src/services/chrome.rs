//! Chrome/Chromium backend for the browser renderer (via `headless_chrome`)

use crate::error::RenderError;
use crate::models::{RenderTimeouts, RendererConfig};
use crate::services::browser::{BrowserEngine, BrowserLauncher, CaptureSource};
use base64::Engine as _;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::{Emulation, Page, Target};
use headless_chrome::{Browser, LaunchOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Resolves when web fonts are ready, or after the soft ceiling
const FONTS_READY_JS: &str = "Promise.race([document.fonts.ready.then(() => true), \
     new Promise(r => setTimeout(() => r(false), __MS__))])";

// Changes whenever the document state or the number of fetched resources does
const ACTIVITY_JS: &str =
    "document.readyState + ':' + performance.getEntriesByType('resource').length";

const IDLE_POLL: Duration = Duration::from_millis(100);

/// Launches a headless Chrome process per [`RendererConfig`]
pub struct ChromeLauncher {
    chrome_path: Option<PathBuf>,
    sandbox: bool,
    idle_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            chrome_path: config.chrome_path.clone(),
            sandbox: config.sandbox,
            idle_timeout: Duration::from_secs(config.idle_browser_timeout_secs),
        }
    }

    /// Start Chrome and keep a control tab for browser-wide housekeeping
    pub fn start(&self) -> Result<ChromeEngine, RenderError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.sandbox)
            .path(self.chrome_path.clone())
            .idle_browser_timeout(self.idle_timeout)
            .build()
            .map_err(|e| RenderError::Unavailable(format!("Invalid launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| RenderError::Unavailable(format!("Failed to launch browser: {e}")))?;
        let control = browser
            .wait_for_initial_tab()
            .or_else(|_| browser.new_tab())
            .map_err(|e| RenderError::Unavailable(format!("Browser has no usable tab: {e}")))?;

        if let Ok(version) = browser.get_version() {
            tracing::info!(
                product = %version.product,
                pid = ?browser.get_process_id(),
                "Chrome started"
            );
        }
        Ok(ChromeEngine { browser, control })
    }
}

impl BrowserLauncher for ChromeLauncher {
    fn launch(&self) -> Result<Arc<dyn BrowserEngine>, RenderError> {
        Ok(Arc::new(self.start()?))
    }
}

/// A running Chrome process
pub struct ChromeEngine {
    browser: Browser,
    // Lives as long as the engine; capture contexts are disposed through it
    control: Arc<Tab>,
}

impl ChromeEngine {
    pub fn process_id(&self) -> Option<u32> {
        self.browser.get_process_id()
    }
}

impl BrowserEngine for ChromeEngine {
    fn is_connected(&self) -> bool {
        self.browser.get_version().is_ok()
    }

    fn capture(
        &self,
        source: &CaptureSource,
        width: u32,
        height: u32,
        timeouts: &RenderTimeouts,
    ) -> Result<Vec<u8>, RenderError> {
        let deadline = Instant::now() + timeouts.load;

        // Own context per capture: no cookies or cache shared between renders
        let context = self
            .browser
            .new_context()
            .map_err(|e| RenderError::Failure(format!("Failed to create context: {e}")))?;
        // Locals drop in reverse order: the tab closes before its context goes
        let _context = ContextGuard {
            control: self.control.clone(),
            id: context.get_id().to_string(),
        };
        let tab = TabGuard(
            context
                .new_tab()
                .map_err(|e| RenderError::Failure(format!("Failed to open tab: {e}")))?,
        );

        tab.set_default_timeout(timeouts.load);
        tab.call_method(device_metrics(width, height)?)
            .map_err(|e| RenderError::Failure(format!("Failed to size viewport: {e}")))?;

        match source {
            CaptureSource::Html(html) => {
                load(&tab, &html_data_url(html))?;
                wait_for_fonts(&tab, timeouts.fonts);
            }
            CaptureSource::Url(url) => {
                load(&tab, url)?;
                wait_until_idle(
                    || sample_activity(&tab),
                    timeouts.network_idle,
                    deadline,
                    IDLE_POLL,
                )?;
                wait_for_fonts(&tab, timeouts.fonts);
            }
        }

        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
            scale: 1.0,
        };
        tab.capture_screenshot(
            Page::CaptureScreenshotFormatOption::Png,
            None,
            Some(clip),
            true,
        )
        .map_err(|e| RenderError::Failure(format!("Screenshot failed: {e}")))
    }
}

/// Closes the tab on every exit path
struct TabGuard(Arc<Tab>);

impl std::ops::Deref for TabGuard {
    type Target = Tab;

    fn deref(&self) -> &Tab {
        &self.0
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.close(false) {
            tracing::debug!(error = %e, "Failed to close tab");
        }
    }
}

/// Disposes a browser context on every exit path
struct ContextGuard {
    control: Arc<Tab>,
    id: String,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let dispose = Target::DisposeBrowserContext {
            browser_context_id: self.id.clone(),
        };
        if let Err(e) = self.control.call_method(dispose) {
            tracing::debug!(context = %self.id, error = %e, "Failed to dispose context");
        }
    }
}

/// Viewport of exactly `width`×`height` CSS pixels at device scale factor 1
///
/// Built from the protocol's JSON form: only the required fields are set and
/// the optional ones differ between protocol revisions.
fn device_metrics(
    width: u32,
    height: u32,
) -> Result<Emulation::SetDeviceMetricsOverride, RenderError> {
    serde_json::from_value(serde_json::json!({
        "width": width,
        "height": height,
        "deviceScaleFactor": 1.0,
        "mobile": false,
    }))
    .map_err(|e| RenderError::Failure(format!("Invalid device metrics: {e}")))
}

fn html_data_url(html: &str) -> String {
    format!(
        "data:text/html;charset=utf-8;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(html)
    )
}

fn load(tab: &Tab, url: &str) -> Result<(), RenderError> {
    tab.navigate_to(url)
        .map_err(|e| RenderError::Timeout(format!("Navigation failed: {e}")))?;
    tab.wait_until_navigated()
        .map_err(|e| RenderError::Timeout(format!("Page load failed: {e}")))?;
    Ok(())
}

/// Best effort: a page whose fonts never settle is still captured
fn wait_for_fonts(tab: &Tab, ceiling: Duration) {
    let script = fonts_script(ceiling);
    match tab.evaluate(&script, true) {
        Ok(result) if result.value == Some(serde_json::Value::Bool(false)) => {
            tracing::debug!(
                ceiling_ms = ceiling.as_millis() as u64,
                "Fonts not ready, capturing anyway"
            );
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(error = %e, "Font wait failed"),
    }
}

fn fonts_script(ceiling: Duration) -> String {
    FONTS_READY_JS.replace("__MS__", &ceiling.as_millis().to_string())
}

fn sample_activity(tab: &Tab) -> String {
    tab.evaluate(ACTIVITY_JS, false)
        .ok()
        .and_then(|r| r.value)
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Network idleness from a series of activity samples
///
/// A page is idle once its document is complete and the activity string has
/// not changed for `quiet`.
#[derive(Debug)]
struct IdleTracker {
    quiet: Duration,
    deadline: Instant,
    last: Option<String>,
    stable_since: Instant,
}

#[derive(Debug, PartialEq, Eq)]
enum Idle {
    Waiting,
    Reached,
    Expired,
}

impl IdleTracker {
    fn new(quiet: Duration, deadline: Instant, now: Instant) -> Self {
        Self {
            quiet,
            deadline,
            last: None,
            stable_since: now,
        }
    }

    fn observe(&mut self, activity: String, now: Instant) -> Idle {
        if self.last.as_deref() != Some(activity.as_str()) {
            self.last = Some(activity);
            self.stable_since = now;
        } else if activity.starts_with("complete:")
            && now.duration_since(self.stable_since) >= self.quiet
        {
            return Idle::Reached;
        }

        if now >= self.deadline {
            Idle::Expired
        } else {
            Idle::Waiting
        }
    }
}

/// Poll `sample` until the page goes idle, or fail once `deadline` passes
fn wait_until_idle(
    mut sample: impl FnMut() -> String,
    quiet: Duration,
    deadline: Instant,
    poll: Duration,
) -> Result<(), RenderError> {
    let mut tracker = IdleTracker::new(quiet, deadline, Instant::now());
    loop {
        match tracker.observe(sample(), Instant::now()) {
            Idle::Reached => return Ok(()),
            Idle::Expired => {
                return Err(RenderError::Timeout("network never became idle".into()))
            }
            Idle::Waiting => std::thread::sleep(poll),
        }
    }
}
