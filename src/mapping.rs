//! Source path → output artifact paths.
//!
//! Every source image maps to a fixed set of artifacts under the output
//! root, computed purely from its path and the config:
//!
//! ```text
//! src/images/blog/hero@2x.png          (declared ratio 2)
//!   → public/images/blog/hero@2x.webp  one per retained scale × format
//!   → public/images/blog/hero@raw.png  verbatim copy
//! ```
//!
//! ## Scale retention
//!
//! A tier is kept when `tier.dpr <= max_dpr / declared_ratio`. With tiers
//! `[{"", 1}, {"2x", 0.5}]` a plain source keeps both, but an `@2x` source
//! keeps only tiers at or below `0.5`. The formula drops the *largest*
//! multipliers for high-density sources, so an `@2x` source loses the `dpr 1`
//! tier even though that tier would be a downscale.
//!
//! ## Image classification
//!
//! [`is_image`] matches the extension case-insensitively: `a.JPG` is resized
//! like `a.jpg`, while its `@raw` copy keeps the original `JPG` spelling.

use crate::config::{Format, OptimizeConfig, RAW_SUFFIX, ScaleSpec};
use crate::naming::parse_file_name;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MappingError {
    #[error("{path} is not inside {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("{0} has no file name")]
    NoFileName(PathBuf),
}

/// The watched source tree and the tree it is mirrored into.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRoots {
    /// `<src_root>/images`
    pub source_dir: PathBuf,
    /// `<public_root>/<output_dir>`
    pub output_dir: PathBuf,
}

impl SyncRoots {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Standard project layout: sources in `<src>/images`, output in `<public>/<output_dir>`.
    pub fn from_project(src_root: &Path, public_root: &Path, config: &OptimizeConfig) -> Self {
        Self::new(src_root.join("images"), public_root.join(&config.output_dir))
    }

    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.source_dir)
    }

    /// Mirror a source path into the output tree.
    pub fn mirror(&self, source: &Path) -> Result<PathBuf, MappingError> {
        let relative =
            source
                .strip_prefix(&self.source_dir)
                .map_err(|_| MappingError::OutsideRoot {
                    path: source.to_path_buf(),
                    root: self.source_dir.clone(),
                })?;
        Ok(self.output_dir.join(relative))
    }

    /// Output path relative to the output root, for display and logs.
    pub fn display_output<'a>(&self, output: &'a Path) -> std::borrow::Cow<'a, str> {
        output
            .strip_prefix(&self.output_dir)
            .unwrap_or(output)
            .to_string_lossy()
    }
}

/// One planned render: a retained scale in one format.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedArtifact {
    pub scale: ScaleSpec,
    /// Extension written; a [`Format`] name, or the source's own extension.
    pub extension: String,
    pub path: PathBuf,
}

/// Every artifact a source image owns.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPlan {
    /// Output path stem (`public/images/blog/hero`).
    pub base_name: PathBuf,
    pub declared_ratio: f64,
    pub scales: Vec<ScaleSpec>,
    pub artifacts: Vec<PlannedArtifact>,
    /// `<base_name>@raw.<source ext>`
    pub raw_path: PathBuf,
}

impl OutputPlan {
    /// All paths owned by the source, raw copy last.
    pub fn all_paths(&self) -> impl Iterator<Item = &Path> {
        self.artifacts
            .iter()
            .map(|a| a.path.as_path())
            .chain(std::iter::once(self.raw_path.as_path()))
    }
}

/// Tiers kept for a source with the given declared ratio.
pub fn retained_scales(scales: &[ScaleSpec], declared_ratio: f64) -> Vec<ScaleSpec> {
    let max_dpr = scales
        .iter()
        .map(|s| s.dpr)
        .fold(f64::NEG_INFINITY, f64::max);
    let limit = max_dpr / declared_ratio;
    scales.iter().filter(|s| s.dpr <= limit).cloned().collect()
}

/// `<base>[@suffix].<ext>`
pub fn artifact_path(base_name: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut name = base_name.as_os_str().to_os_string();
    if !suffix.is_empty() {
        name.push("@");
        name.push(suffix);
    }
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Source file extension as written (case preserved), or `""`.
pub fn source_extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Compute the full artifact set for a source image.
pub fn plan_outputs(
    source: &Path,
    roots: &SyncRoots,
    config: &OptimizeConfig,
) -> Result<OutputPlan, MappingError> {
    let mirrored = roots.mirror(source)?;
    let file_name = mirrored
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MappingError::NoFileName(source.to_path_buf()))?;

    let parsed = parse_file_name(file_name);
    let base_name = mirrored.with_file_name(parsed.base_name());
    let scales = retained_scales(&config.scales, parsed.declared_ratio);

    let original_ext = source_extension(source);
    let extensions: Vec<&str> = if config.formats.is_empty() {
        vec![original_ext]
    } else {
        config.formats.iter().map(|f| f.extension()).collect()
    };

    let artifacts = scales
        .iter()
        .flat_map(|scale| {
            extensions.iter().map(|ext| PlannedArtifact {
                scale: scale.clone(),
                extension: ext.to_string(),
                path: artifact_path(&base_name, &scale.suffix, ext),
            })
        })
        .collect();

    Ok(OutputPlan {
        raw_path: artifact_path(&base_name, RAW_SUFFIX, original_ext),
        base_name,
        declared_ratio: parsed.declared_ratio,
        scales,
        artifacts,
    })
}

/// Whether a path is an image the pipeline resizes (by extension).
pub fn is_image(path: &Path) -> bool {
    Format::from_extension(source_extension(path)).is_some()
}
