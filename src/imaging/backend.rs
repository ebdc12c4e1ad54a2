//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the resize engine
//! needs: identify (read native dimensions without a full decode where
//! possible) and render (decode, resize, encode one artifact).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Renders for one source
//! run in parallel on the rayon pool and synchronizer handlers run on worker
//! threads, hence the `Send + Sync` bound.

use super::params::RenderParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Send + Sync {
    /// Get native image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize and encode one artifact, writing it to `params.output`.
    fn render(&self, params: &RenderParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::config::Format;
    use crate::fs_ops::write_atomic;
    use std::io::Write;
    use std::sync::Mutex;

    /// Mock backend that records operations and writes small placeholder
    /// files instead of encoding pixels.
    ///
    /// Every identify returns the same dimensions. Renders whose output path
    /// ends with one of `failing_outputs` fail with `ProcessingFailed`, and
    /// sources listed in `unreadable` fail to identify.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    pub struct MockBackend {
        pub dimensions: Dimensions,
        pub failing_outputs: Mutex<Vec<String>>,
        pub unreadable: Mutex<Vec<String>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Render {
            source: String,
            output: String,
            width: u32,
            height: u32,
            format: Format,
            quality: u32,
        },
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self::with_dimensions(Dimensions {
                width: 800,
                height: 600,
            })
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dimensions: Dimensions) -> Self {
            Self {
                dimensions,
                failing_outputs: Mutex::new(Vec::new()),
                unreadable: Mutex::new(Vec::new()),
                operations: Mutex::new(Vec::new()),
            }
        }

        /// Fail any render whose output path ends with `suffix`.
        pub fn fail_output(self, suffix: &str) -> Self {
            self.failing_outputs.lock().unwrap().push(suffix.to_string());
            self
        }

        /// Fail identify for any source path ending with `suffix`.
        pub fn fail_identify(self, suffix: &str) -> Self {
            self.unreadable.lock().unwrap().push(suffix.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn render_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Render { .. }))
                .count()
        }
    }

    fn matches_any(list: &Mutex<Vec<String>>, path: &Path) -> bool {
        let path = path.to_string_lossy();
        list.lock().unwrap().iter().any(|s| path.ends_with(s.as_str()))
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            if matches_any(&self.unreadable, path) {
                return Err(BackendError::ProcessingFailed(format!(
                    "mock: cannot read {}",
                    path.display()
                )));
            }
            Ok(self.dimensions)
        }

        fn render(&self, params: &RenderParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Render {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                width: params.width,
                height: params.height,
                format: params.format,
                quality: params.quality.value(),
            });

            if matches_any(&self.failing_outputs, &params.output) {
                return Err(BackendError::ProcessingFailed(format!(
                    "mock: encode failed for {}",
                    params.output.display()
                )));
            }

            let source_bytes = std::fs::read(&params.source)?;
            write_atomic(&params.output, |w| -> Result<(), BackendError> {
                writeln!(
                    w,
                    "{}x{} {} q{}",
                    params.width,
                    params.height,
                    params.format,
                    params.quality.value()
                )?;
                w.write_all(&source_bytes)?;
                Ok(())
            })
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(Dimensions {
            width: 800,
            height: 600,
        });

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_identify_can_fail() {
        let backend = MockBackend::new().fail_identify("broken.png");
        assert!(backend.identify(Path::new("/x/broken.png")).is_err());
        assert!(backend.identify(Path::new("/x/fine.png")).is_ok());
    }

    #[test]
    fn mock_render_writes_placeholder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        std::fs::write(&source, b"pixels").unwrap();
        let output = tmp.path().join("out/resized.webp");

        let backend = MockBackend::new();
        backend
            .render(&RenderParams {
                source,
                output: output.clone(),
                width: 400,
                height: 300,
                format: Format::Webp,
                quality: crate::imaging::Quality::new(90),
            })
            .unwrap();

        let written = std::fs::read(&output).unwrap();
        assert!(written.starts_with(b"400x300 webp q90\n"));
        assert!(written.ends_with(b"pixels"));
        assert_eq!(backend.render_count(), 1);
    }
}
