//! Resize engine: one source image → its full artifact set.
//!
//! For each source, [`optimize`]:
//!
//! 1. Identifies the source (native width). If that fails nothing is written
//!    and the call returns [`OptimizeError::Decode`].
//! 2. Plans the artifact set via [`mapping::plan_outputs`].
//! 3. Renders every retained scale × format in parallel on the rayon pool.
//! 4. Copies the source bytes to `<base>@raw.<ext>`.
//!
//! Steps 3 and 4 are best effort: a failed render becomes
//! [`ArtifactStatus::EncodeFailed`] in the returned [`OptimizeReport`] and
//! siblings (and the raw copy) are unaffected. The caller decides whether to
//! log or escalate.

use crate::config::{Format, OptimizeConfig};
use crate::fs_ops;
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, Quality, RenderParams, scaled_dimensions,
};
use crate::mapping::{self, MappingError, OutputPlan, PlannedArtifact, SyncRoots};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("cannot read {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error("cannot create output directory for {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of writing one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Created,
    EncodeFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactResult {
    pub path: PathBuf,
    pub status: ArtifactStatus,
}

impl ArtifactResult {
    pub fn is_ok(&self) -> bool {
        self.status == ArtifactStatus::Created
    }
}

/// Everything produced for one source image.
#[derive(Debug, Clone)]
pub struct OptimizeReport {
    pub source: PathBuf,
    pub dimensions: Dimensions,
    /// One entry per retained scale × format, in plan order.
    pub artifacts: Vec<ArtifactResult>,
    /// The verbatim `@raw` copy.
    pub raw: ArtifactResult,
}

impl OptimizeReport {
    pub fn failures(&self) -> impl Iterator<Item = &ArtifactResult> {
        self.artifacts
            .iter()
            .chain(std::iter::once(&self.raw))
            .filter(|a| !a.is_ok())
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn created_count(&self) -> usize {
        self.artifacts.iter().filter(|a| a.is_ok()).count() + usize::from(self.raw.is_ok())
    }
}

/// Generate every artifact for `source`.
pub fn optimize(
    backend: &impl ImageBackend,
    source: &Path,
    roots: &SyncRoots,
    config: &OptimizeConfig,
) -> Result<OptimizeReport, OptimizeError> {
    let dimensions = backend
        .identify(source)
        .map_err(|source_err| OptimizeError::Decode {
            path: source.to_path_buf(),
            source: source_err,
        })?;

    let plan = mapping::plan_outputs(source, roots, config)?;
    fs_ops::ensure_parent_dir(&plan.base_name).map_err(|e| OptimizeError::OutputDir {
        path: plan.base_name.clone(),
        source: e,
    })?;

    let quality = Quality::new(config.quality);
    let (artifacts, raw) = rayon::join(
        || render_all(backend, source, dimensions, &plan, quality),
        || copy_raw(source, &plan),
    );

    tracing::debug!(
        source = %source.display(),
        artifacts = artifacts.len(),
        "optimized"
    );

    Ok(OptimizeReport {
        source: source.to_path_buf(),
        dimensions,
        artifacts,
        raw,
    })
}

fn render_all(
    backend: &impl ImageBackend,
    source: &Path,
    dimensions: Dimensions,
    plan: &OutputPlan,
    quality: Quality,
) -> Vec<ArtifactResult> {
    plan.artifacts
        .par_iter()
        .map(|artifact| ArtifactResult {
            path: artifact.path.clone(),
            status: match render_one(backend, source, dimensions, artifact, quality) {
                Ok(()) => ArtifactStatus::Created,
                Err(reason) => ArtifactStatus::EncodeFailed(reason),
            },
        })
        .collect()
}

fn render_one(
    backend: &impl ImageBackend,
    source: &Path,
    dimensions: Dimensions,
    artifact: &PlannedArtifact,
    quality: Quality,
) -> Result<(), String> {
    let format = Format::from_extension(&artifact.extension)
        .ok_or_else(|| format!("unsupported output format '{}'", artifact.extension))?;
    let (width, height) = scaled_dimensions(dimensions, artifact.scale.dpr).ok_or_else(|| {
        format!(
            "{}px source at dpr {} gives a zero-width image",
            dimensions.width, artifact.scale.dpr
        )
    })?;

    backend
        .render(&RenderParams {
            source: source.to_path_buf(),
            output: artifact.path.clone(),
            width,
            height,
            format,
            quality,
        })
        .map_err(|e| e.to_string())
}

fn copy_raw(source: &Path, plan: &OutputPlan) -> ArtifactResult {
    let status = match fs_ops::copy_verbatim(source, &plan.raw_path) {
        Ok(_) => ArtifactStatus::Created,
        Err(e) => ArtifactStatus::EncodeFailed(format!("raw copy failed: {e}")),
    };
    ArtifactResult {
        path: plan.raw_path.clone(),
        status,
    }
}
