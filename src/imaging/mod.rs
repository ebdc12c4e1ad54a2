//! Image processing — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions`, `avif-parse` for AVIF |
//! | **Decode** | `image` (JPEG, PNG, WebP), `avif-parse` + `rav1d` (AVIF) |
//! | **Resize** | Lanczos3 via `DynamicImage::resize_exact` |
//! | **Encode** | JPEG / PNG / WebP (lossless) / AVIF (rav1e) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a render
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

mod avif;
pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::scaled_dimensions;
pub use params::{Quality, RenderParams};
pub use rust_backend::RustBackend;
