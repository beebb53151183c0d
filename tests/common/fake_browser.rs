//! Scripted stand-in for headless Chrome.
//!
//! The fake "renders" a page as a flat PNG of the requested size: black when
//! the markup or URL mentions `black`, white otherwise. URLs on the
//! `.invalid` TLD hang until the configured delay passes.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{GrayImage, ImageFormat, Luma};

use inkscreen::error::RenderError;
use inkscreen::models::RenderTimeouts;
use inkscreen::services::{BrowserEngine, BrowserLauncher, CaptureSource};

#[derive(Default)]
pub struct FakeLauncher {
    launches: AtomicUsize,
    captures: Arc<AtomicUsize>,
    fail: AtomicBool,
    hang: Duration,
    last: Mutex<Option<Arc<FakeEngine>>>,
}

impl FakeLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Launcher whose `.invalid` pages take `hang` to load
    pub fn with_hang(hang: Duration) -> Arc<Self> {
        Arc::new(Self {
            hang,
            ..Default::default()
        })
    }

    /// Launcher that cannot start a browser
    pub fn failing() -> Arc<Self> {
        let launcher = Self::default();
        launcher.fail.store(true, Ordering::SeqCst);
        Arc::new(launcher)
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    /// Simulate the browser process dying
    pub fn kill(&self) {
        if let Some(engine) = self.last.lock().unwrap().as_ref() {
            engine.alive.store(false, Ordering::SeqCst);
        }
    }
}

impl BrowserLauncher for FakeLauncher {
    fn launch(&self) -> Result<Arc<dyn BrowserEngine>, RenderError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RenderError::Unavailable(
                "chrome executable not found".to_string(),
            ));
        }
        let engine = Arc::new(FakeEngine {
            alive: AtomicBool::new(true),
            captures: self.captures.clone(),
            hang: self.hang,
        });
        *self.last.lock().unwrap() = Some(engine.clone());
        Ok(engine)
    }
}

pub struct FakeEngine {
    alive: AtomicBool,
    captures: Arc<AtomicUsize>,
    hang: Duration,
}

impl BrowserEngine for FakeEngine {
    fn is_connected(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn capture(
        &self,
        source: &CaptureSource,
        width: u32,
        height: u32,
        _timeouts: &RenderTimeouts,
    ) -> Result<Vec<u8>, RenderError> {
        if !self.is_connected() {
            return Err(RenderError::Failure("browser connection closed".into()));
        }
        let text = match source {
            CaptureSource::Html(html) => html.as_str(),
            CaptureSource::Url(url) => {
                if url.contains(".invalid") {
                    std::thread::sleep(self.hang);
                }
                url.as_str()
            }
        };
        self.captures.fetch_add(1, Ordering::SeqCst);

        let fill = if text.contains("black") { 0 } else { 255 };
        Ok(flat_png(width, height, fill))
    }
}

/// Uniform grayscale PNG
pub fn flat_png(width: u32, height: u32, level: u8) -> Vec<u8> {
    let img = GrayImage::from_pixel(width, height, Luma([level]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("encode fake screenshot");
    buf.into_inner()
}
