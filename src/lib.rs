//! Inkscreen - e-ink display content backend
//!
//! Renders HTML, web pages and uploaded images into dimensionally exact,
//! halftoned bitmaps for e-ink display terminals.
//! This library exposes modules for integration testing.

pub mod api;
pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
