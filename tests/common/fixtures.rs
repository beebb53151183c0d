//! Test fixtures and constants.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};

use inkscreen::models::AppConfig;

/// Device models from the embedded config
pub mod models {
    /// 800×480, monochrome
    pub const OG: &str = "og";

    /// 1872×1404, 16 gray levels
    pub const X: &str = "x";

    /// Not configured anywhere
    pub const UNKNOWN: &str = "nonexistent";
}

pub const TEST_PIN: &str = "4711";

/// Default config with content written below `dir`
pub fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::with_default_models();
    config.content.dir = dir.join("content");
    config.content.temp_dir = Some(dir.join("tmp"));
    config
}

/// RGB PNG split into a black left half and a white right half
pub fn split_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    encode(&img, ImageFormat::Png)
}

/// Horizontal gray ramp as JPEG
pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, _| {
        let v = (x * 255 / width.max(1)) as u8;
        Rgb([v, v, v])
    });
    encode(&img, ImageFormat::Jpeg)
}

fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode fixture");
    buf.into_inner()
}

/// JSON body for the HTML endpoint targeting a model
pub fn html_request(html: &str, model: &str) -> String {
    serde_json::json!({ "html": html, "model": model }).to_string()
}
