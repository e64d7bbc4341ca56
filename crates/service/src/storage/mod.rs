//! Storage abstractions for service layer
//!
//! Uploaded recipe images are written to a local media directory and served
//! read-only by the HTTP layer.

pub mod image_store;

pub use image_store::{verify_image, ImageFormat, ImageStore, LocalImageStore};
