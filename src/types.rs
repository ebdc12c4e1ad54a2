//! Shared types passed between the synchronizer, the watcher and output.

use crate::fs_ops::{RemoveResult, RemoveStatus};
use crate::optimize::OptimizeReport;
use std::fmt;
use std::path::PathBuf;

/// What happened to a source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Change,
    Delete,
}

/// Why an event was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not under the watched source directory.
    OutsideSource,
    /// OS directory metadata (`.DS_Store`).
    Metadata,
    /// A directory add/change; its files arrive as their own events.
    Directory,
}

/// Result of handling one source path, during full sync or from a watch event.
#[derive(Debug, Clone)]
pub enum EventReport {
    /// Image (re)generated; individual artifacts may still have failed.
    Optimized(OptimizeReport),
    /// Image could not be read; nothing was written.
    OptimizeFailed { source: PathBuf, error: String },
    /// Outputs removed after a delete.
    Removed {
        source: PathBuf,
        results: Vec<RemoveResult>,
    },
    /// Passthrough file mirrored.
    Copied { source: PathBuf, output: PathBuf },
    CopyFailed {
        source: PathBuf,
        output: PathBuf,
        error: String,
    },
    Ignored { path: PathBuf, reason: IgnoreReason },
}

impl EventReport {
    /// True when no part of the handling failed. Missing delete targets count as success.
    pub fn is_success(&self) -> bool {
        match self {
            EventReport::Optimized(report) => report.is_complete(),
            EventReport::Removed { results, .. } => results
                .iter()
                .all(|r| !matches!(r.status, RemoveStatus::Failed(_))),
            EventReport::Copied { .. } | EventReport::Ignored { .. } => true,
            EventReport::OptimizeFailed { .. } | EventReport::CopyFailed { .. } => false,
        }
    }
}

/// Totals over a batch of [`EventReport`]s.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub images: u32,
    pub artifacts_created: u32,
    pub artifacts_failed: u32,
    pub unreadable: u32,
    pub copied: u32,
    pub copy_failed: u32,
    pub deleted: u32,
    pub ignored: u32,
}

impl SyncStats {
    pub fn record(&mut self, report: &EventReport) {
        match report {
            EventReport::Optimized(r) => {
                self.images += 1;
                self.artifacts_created += r.created_count() as u32;
                self.artifacts_failed += r.failures().count() as u32;
            }
            EventReport::OptimizeFailed { .. } => self.unreadable += 1,
            EventReport::Removed { results, .. } => {
                self.deleted += results
                    .iter()
                    .filter(|r| r.status == RemoveStatus::Deleted)
                    .count() as u32;
            }
            EventReport::Copied { .. } => self.copied += 1,
            EventReport::CopyFailed { .. } => self.copy_failed += 1,
            EventReport::Ignored { .. } => self.ignored += 1,
        }
    }

    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a EventReport>) -> Self {
        let mut stats = Self::default();
        for report in reports {
            stats.record(report);
        }
        stats
    }

    pub fn failures(&self) -> u32 {
        self.artifacts_failed + self.unreadable + self.copy_failed
    }
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images → {} artifacts, {} files copied",
            self.images, self.artifacts_created, self.copied
        )?;
        if self.deleted > 0 {
            write!(f, ", {} deleted", self.deleted)?;
        }
        if self.failures() > 0 {
            write!(
                f,
                " ({} failed artifacts, {} unreadable images, {} failed copies)",
                self.artifacts_failed, self.unreadable, self.copy_failed
            )?;
        }
        Ok(())
    }
}
