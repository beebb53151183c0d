//! Headless browser rendering
//!
//! One browser process is shared by all callers and started on first use.
//! Before every render the process is checked for liveness and relaunched
//! when it has gone away or stopped answering, so a crashed or wedged browser
//! costs one slow request instead of an outage. Each render gets its own tab;
//! tabs are never shared.
//!
//! The process itself is hidden behind [`BrowserLauncher`] and
//! [`BrowserEngine`] so tests can swap in a scripted fake.

use crate::error::RenderError;
use crate::models::RenderTimeouts;
use crate::services::content_store::write_file;
use crate::services::template::render_template;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// What a tab should load before the screenshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    Html(String),
    Url(String),
}

/// A running browser process
///
/// Calls block; the renderer runs them on the blocking thread pool.
pub trait BrowserEngine: Send + Sync {
    /// False once the process has exited or the connection dropped
    fn is_connected(&self) -> bool;

    /// Load `source` in a fresh tab with a `width`×`height` viewport and
    /// return a PNG screenshot of exactly that size.
    fn capture(
        &self,
        source: &CaptureSource,
        width: u32,
        height: u32,
        timeouts: &RenderTimeouts,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Starts browser processes
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self) -> Result<Arc<dyn BrowserEngine>, RenderError>;
}

enum BrowserState {
    Uninitialized,
    Ready(Arc<dyn BrowserEngine>),
}

/// Renders HTML markup and remote pages to PNG files
pub struct BrowserRenderer {
    launcher: Arc<dyn BrowserLauncher>,
    state: Arc<Mutex<BrowserState>>,
    timeouts: RenderTimeouts,
}

impl BrowserRenderer {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, timeouts: RenderTimeouts) -> Self {
        Self {
            launcher,
            state: Arc::new(Mutex::new(BrowserState::Uninitialized)),
            timeouts,
        }
    }

    pub fn timeouts(&self) -> RenderTimeouts {
        self.timeouts
    }

    /// True when a browser process is up and answering (does not launch one)
    pub async fn is_running(&self) -> bool {
        match self.current().await {
            Some(engine) => is_alive(engine, self.timeouts.liveness).await,
            None => false,
        }
    }

    /// Render HTML markup and write the screenshot to `out_path`
    pub async fn render_html(
        &self,
        html: &str,
        width: u32,
        height: u32,
        out_path: &Path,
    ) -> Result<PathBuf, RenderError> {
        self.render_to_file(CaptureSource::Html(html.to_string()), width, height, out_path)
            .await
    }

    /// Render a remote page and write the screenshot to `out_path`
    pub async fn render_url(
        &self,
        url: &str,
        width: u32,
        height: u32,
        out_path: &Path,
    ) -> Result<PathBuf, RenderError> {
        self.render_to_file(CaptureSource::Url(url.to_string()), width, height, out_path)
            .await
    }

    /// Substitute `{{key}}` placeholders, then render as HTML
    pub async fn render_template(
        &self,
        template: &str,
        variables: &HashMap<String, String>,
        width: u32,
        height: u32,
        out_path: &Path,
    ) -> Result<PathBuf, RenderError> {
        let html = render_template(template, variables);
        self.render_html(&html, width, height, out_path).await
    }

    async fn render_to_file(
        &self,
        source: CaptureSource,
        width: u32,
        height: u32,
        out_path: &Path,
    ) -> Result<PathBuf, RenderError> {
        let png = self.capture(source, width, height).await?;
        write_file(out_path, &png).await?;
        Ok(out_path.to_path_buf())
    }

    /// Capture a screenshot, enforcing the load ceiling from this side
    ///
    /// The ceiling covers everything: waiting for the browser, the liveness
    /// check, a relaunch and the capture itself. Blocking work that outlives
    /// the ceiling keeps running detached; its tab is closed when it returns.
    pub async fn capture(
        &self,
        source: CaptureSource,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let load = self.timeouts.load;
        let kind = match &source {
            CaptureSource::Html(_) => "html",
            CaptureSource::Url(_) => "url",
        };
        let start = Instant::now();

        let result = tokio::time::timeout(load, self.acquire_and_capture(source, width, height))
            .await
            .unwrap_or_else(|_| {
                Err(RenderError::Timeout(format!(
                    "page did not finish loading within {}ms",
                    load.as_millis()
                )))
            });

        match &result {
            Ok(png) => tracing::debug!(
                kind,
                width,
                height,
                bytes = png.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Captured screenshot"
            ),
            Err(e) => tracing::warn!(kind, width, height, error = %e, "Capture failed"),
        }
        result
    }

    async fn acquire_and_capture(
        &self,
        source: CaptureSource,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let engine = self.engine().await?;
        let timeouts = self.timeouts;
        tokio::task::spawn_blocking(move || engine.capture(&source, width, height, &timeouts))
            .await
            .map_err(|e| RenderError::Failure(format!("Capture task failed: {e}")))?
    }

    async fn current(&self) -> Option<Arc<dyn BrowserEngine>> {
        match &*self.state.lock().await {
            BrowserState::Ready(engine) => Some(engine.clone()),
            BrowserState::Uninitialized => None,
        }
    }

    /// Current engine, launching or relaunching as needed
    ///
    /// The liveness check runs without the state lock and is bounded by
    /// `timeouts.liveness`; a browser that does not answer in time is
    /// treated as dead.
    async fn engine(&self) -> Result<Arc<dyn BrowserEngine>, RenderError> {
        if let Some(engine) = self.current().await {
            if is_alive(engine.clone(), self.timeouts.liveness).await {
                return Ok(engine);
            }
            tracing::warn!("Browser process is gone or unresponsive, relaunching");
            self.discard(&engine).await;
        }
        self.launch().await
    }

    /// Forget `dead` unless another caller already replaced it
    async fn discard(&self, dead: &Arc<dyn BrowserEngine>) {
        let mut state = self.state.lock().await;
        if let BrowserState::Ready(engine) = &*state {
            if Arc::ptr_eq(engine, dead) {
                *state = BrowserState::Uninitialized;
            }
        }
    }

    /// Launch a browser unless one is already up
    ///
    /// The state lock is held until the launch settles, so concurrent callers
    /// wait for a single launch instead of starting several processes. The
    /// launch runs in its own task: a caller that gives up at its ceiling
    /// leaves the launch to finish and publish the engine for the next one.
    async fn launch(&self) -> Result<Arc<dyn BrowserEngine>, RenderError> {
        let mut state = self.state.clone().lock_owned().await;
        if let BrowserState::Ready(engine) = &*state {
            return Ok(engine.clone());
        }

        let launcher = self.launcher.clone();
        tokio::spawn(async move {
            let start = Instant::now();
            let engine = tokio::task::spawn_blocking(move || launcher.launch())
                .await
                .map_err(|e| RenderError::Unavailable(format!("Launch task failed: {e}")))?
                .inspect_err(|e| tracing::error!(error = %e, "Failed to launch browser"))?;

            tracing::info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Browser launched"
            );
            *state = BrowserState::Ready(engine.clone());
            Ok::<_, RenderError>(engine)
        })
        .await
        .map_err(|e| RenderError::Unavailable(format!("Launch task failed: {e}")))?
    }
}

async fn is_alive(engine: Arc<dyn BrowserEngine>, within: Duration) -> bool {
    let check = tokio::task::spawn_blocking(move || engine.is_connected());
    matches!(tokio::time::timeout(within, check).await, Ok(Ok(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const HANG: Duration = Duration::from_secs(1);

    struct StubEngine {
        alive: AtomicBool,
        hung: AtomicBool,
        delay: Duration,
    }

    impl StubEngine {
        fn stall_if_hung(&self) {
            if self.hung.load(Ordering::SeqCst) {
                std::thread::sleep(HANG);
            }
        }
    }

    impl BrowserEngine for StubEngine {
        fn is_connected(&self) -> bool {
            self.stall_if_hung();
            self.alive.load(Ordering::SeqCst)
        }

        fn capture(
            &self,
            source: &CaptureSource,
            _width: u32,
            _height: u32,
            _timeouts: &RenderTimeouts,
        ) -> Result<Vec<u8>, RenderError> {
            self.stall_if_hung();
            std::thread::sleep(self.delay);
            match source {
                CaptureSource::Html(html) => Ok(html.as_bytes().to_vec()),
                CaptureSource::Url(url) => Err(RenderError::Timeout(url.clone())),
            }
        }
    }

    #[derive(Default)]
    struct StubLauncher {
        launches: AtomicUsize,
        fail: bool,
        delay: Duration,
        last: std::sync::Mutex<Option<Arc<StubEngine>>>,
    }

    impl StubLauncher {
        fn kill(&self) {
            if let Some(engine) = self.last.lock().unwrap().as_ref() {
                engine.alive.store(false, Ordering::SeqCst);
            }
        }

        /// Process stays up but stops answering
        fn hang(&self) {
            if let Some(engine) = self.last.lock().unwrap().as_ref() {
                engine.hung.store(true, Ordering::SeqCst);
            }
        }
    }

    impl BrowserLauncher for StubLauncher {
        fn launch(&self) -> Result<Arc<dyn BrowserEngine>, RenderError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RenderError::Unavailable("no browser installed".into()));
            }
            let engine = Arc::new(StubEngine {
                alive: AtomicBool::new(true),
                hung: AtomicBool::new(false),
                delay: self.delay,
            });
            *self.last.lock().unwrap() = Some(engine.clone());
            Ok(engine)
        }
    }

    fn renderer(launcher: Arc<StubLauncher>, load: Duration) -> BrowserRenderer {
        with_liveness(launcher, load, Duration::from_secs(5))
    }

    fn with_liveness(
        launcher: Arc<StubLauncher>,
        load: Duration,
        liveness: Duration,
    ) -> BrowserRenderer {
        let timeouts = RenderTimeouts {
            load,
            liveness,
            ..Default::default()
        };
        BrowserRenderer::new(launcher, timeouts)
    }

    #[tokio::test]
    async fn test_launches_lazily_once() {
        let launcher = Arc::new(StubLauncher::default());
        let renderer = renderer(launcher.clone(), Duration::from_secs(5));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
        assert!(!renderer.is_running().await);

        for _ in 0..3 {
            let png = renderer
                .capture(CaptureSource::Html("<p>".into()), 10, 10)
                .await
                .unwrap();
            assert_eq!(png, b"<p>");
        }
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert!(renderer.is_running().await);
    }

    #[tokio::test]
    async fn test_relaunches_dead_browser() {
        let launcher = Arc::new(StubLauncher::default());
        let renderer = renderer(launcher.clone(), Duration::from_secs(5));

        renderer
            .capture(CaptureSource::Html("a".into()), 10, 10)
            .await
            .unwrap();
        launcher.kill();
        assert!(!renderer.is_running().await);

        renderer
            .capture(CaptureSource::Html("b".into()), 10, 10)
            .await
            .unwrap();
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_launch_failure_is_unavailable() {
        let launcher = Arc::new(StubLauncher {
            fail: true,
            ..Default::default()
        });
        let renderer = renderer(launcher.clone(), Duration::from_secs(5));

        let err = renderer
            .capture(CaptureSource::Html("a".into()), 10, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Unavailable(_)));

        // every call retries the launch
        let _ = renderer
            .capture(CaptureSource::Html("a".into()), 10, 10)
            .await;
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_capture_times_out() {
        let launcher = Arc::new(StubLauncher {
            delay: Duration::from_millis(500),
            ..Default::default()
        });
        let renderer = renderer(launcher, Duration::from_millis(50));

        let start = Instant::now();
        let err = renderer
            .capture(CaptureSource::Html("a".into()), 10, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_render_template_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deep/dir/out.png");
        let renderer = renderer(Arc::new(StubLauncher::default()), Duration::from_secs(5));
        let vars = HashMap::from([("name".to_string(), "Ink".to_string())]);

        let path = renderer
            .render_template("<h1>{{name}}</h1>", &vars, 10, 10, &out)
            .await
            .unwrap();
        assert_eq!(path, out);
        assert_eq!(std::fs::read(&out).unwrap(), b"<h1>Ink</h1>");
    }

    #[tokio::test]
    async fn test_hung_browser_respects_load_ceiling() {
        let launcher = Arc::new(StubLauncher::default());
        let renderer = renderer(launcher.clone(), Duration::from_millis(200));

        renderer
            .capture(CaptureSource::Html("a".into()), 10, 10)
            .await
            .unwrap();
        launcher.hang();

        // The liveness check itself stalls; the ceiling still applies
        let start = Instant::now();
        let err = renderer
            .capture(CaptureSource::Html("b".into()), 10, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Timeout(_)));
        assert!(
            start.elapsed() < Duration::from_millis(800),
            "took {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_unresponsive_browser_is_relaunched() {
        let launcher = Arc::new(StubLauncher::default());
        let renderer = with_liveness(
            launcher.clone(),
            Duration::from_secs(5),
            Duration::from_millis(100),
        );

        renderer
            .capture(CaptureSource::Html("a".into()), 10, 10)
            .await
            .unwrap();
        launcher.hang();

        let start = Instant::now();
        let png = renderer
            .capture(CaptureSource::Html("b".into()), 10, 10)
            .await
            .unwrap();
        assert_eq!(png, b"b");
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() < HANG, "took {:?}", start.elapsed());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_relaunch() {
        let launcher = Arc::new(StubLauncher::default());
        let renderer = with_liveness(
            launcher.clone(),
            Duration::from_secs(5),
            Duration::from_millis(100),
        );

        renderer
            .capture(CaptureSource::Html("a".into()), 10, 10)
            .await
            .unwrap();
        launcher.kill();

        let (b, c) = tokio::join!(
            renderer.capture(CaptureSource::Html("b".into()), 10, 10),
            renderer.capture(CaptureSource::Html("c".into()), 10, 10),
        );
        assert_eq!(b.unwrap(), b"b");
        assert_eq!(c.unwrap(), b"c");
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_is_running_is_bounded() {
        let launcher = Arc::new(StubLauncher::default());
        let renderer = with_liveness(
            launcher.clone(),
            Duration::from_secs(5),
            Duration::from_millis(100),
        );

        renderer
            .capture(CaptureSource::Html("a".into()), 10, 10)
            .await
            .unwrap();
        launcher.hang();

        let start = Instant::now();
        assert!(!renderer.is_running().await);
        assert!(start.elapsed() < HANG);
    }
}
