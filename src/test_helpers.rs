//! Shared test utilities for the trq-image test suite.
//!
//! Provides synthetic image writers, a project-layout fixture, and a tree
//! snapshot used to compare whole output directories.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = TestProject::new();
//! project.write_png("blog/hero.png", 64, 32);
//! project.write_file("docs/readme.txt", b"hello");
//!
//! let before = snapshot_tree(&project.roots.output_dir);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::mapping::SyncRoots;

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a small valid RGB JPEG with a gradient pattern.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

/// Write a small valid RGBA PNG with a gradient pattern and varying alpha.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, ((x + y) % 256) as u8])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Project fixture
// =========================================================================

/// A temp project with `src/images` as the source tree and
/// `public/images` as the output tree.
pub struct TestProject {
    pub dir: TempDir,
    pub roots: SyncRoots,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let roots = SyncRoots::new(
            dir.path().join("src/images"),
            dir.path().join("public/images"),
        );
        std::fs::create_dir_all(&roots.source_dir).unwrap();
        Self { dir, roots }
    }

    /// Absolute path of a file in the source tree.
    pub fn source(&self, relative: &str) -> PathBuf {
        self.roots.source_dir.join(relative)
    }

    /// Absolute path of a file in the output tree.
    pub fn output(&self, relative: &str) -> PathBuf {
        self.roots.output_dir.join(relative)
    }

    pub fn write_png(&self, relative: &str, width: u32, height: u32) -> PathBuf {
        let path = self.source(relative);
        create_test_png(&path, width, height);
        path
    }

    pub fn write_jpeg(&self, relative: &str, width: u32, height: u32) -> PathBuf {
        let path = self.source(relative);
        create_test_jpeg(&path, width, height);
        path
    }

    pub fn write_file(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.source(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

// =========================================================================
// Tree inspection
// =========================================================================

/// Relative path → file bytes for every file under `root` (empty if missing).
pub fn snapshot_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    if !root.exists() {
        return BTreeMap::new();
    }
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}

/// Sorted relative file paths under `root`.
pub fn tree_files(root: &Path) -> Vec<String> {
    snapshot_tree(root).into_keys().collect()
}
