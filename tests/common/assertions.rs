//! Assertion helpers for tests.

use axum::http::StatusCode;
use image::GrayImage;
use pretty_assertions::assert_eq;

use inkscreen::models::ContentLocator;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert an error response with the JSON error envelope
pub fn assert_error(response: &TestResponse, expected: StatusCode) {
    assert_status(response, expected);
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"].as_u64(), Some(expected.as_u16() as u64));
    assert!(
        json["error"].is_string(),
        "Expected error message, got: {}",
        serde_json::to_string_pretty(&json).unwrap()
    );
}

/// Assert a successful screen response and return its locator
pub fn assert_locator(response: &TestResponse) -> ContentLocator {
    assert_ok(response);
    let locator: ContentLocator = response.json();
    assert!(
        locator.image.starts_with("/content/") && locator.image.ends_with(".png"),
        "Unexpected image URL: {}",
        locator.image
    );
    assert!(
        locator.thumbnail.starts_with("/content/") && locator.thumbnail.ends_with(".jpg"),
        "Unexpected thumbnail URL: {}",
        locator.thumbnail
    );
    locator
}

/// Assert every pixel is pure black or pure white
pub fn assert_binary(img: &GrayImage) {
    let stray = img.pixels().find(|p| p.0[0] != 0 && p.0[0] != 255);
    assert!(stray.is_none(), "Found non-binary pixel {stray:?}");
}

/// Assert every pixel has the given level
pub fn assert_uniform(img: &GrayImage, level: u8) {
    let stray = img.pixels().find(|p| p.0[0] != level);
    assert!(stray.is_none(), "Expected all pixels {level}, found {stray:?}");
}
