//! Parameter types for image operations.
//!
//! These structs describe *what* to render, not *how*. They are the interface
//! between the resize engine (which decides which artifacts exist) and the
//! [`backend`](super::backend) (which does the pixel work), so tests can swap
//! in a mock backend without touching planning logic.

use crate::config::Format;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// One artifact to render: resize `source` to exactly `width`×`height`
/// and encode it as `format` at `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub quality: Quality,
}
