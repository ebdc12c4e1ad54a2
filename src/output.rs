//! Log and CLI output.
//!
//! Every [`EventReport`] turns into one log line per touched output path,
//! keyed by the path relative to the output root:
//!
//! ```text
//! INFO  created blog/hero.webp
//! INFO  created blog/hero@raw.png
//! ERROR failed to create blog/hero@sm.avif: 3px source at dpr 0.1 gives a zero-width image
//! INFO  deleted blog/old.webp
//! WARN  blog/old@2x.webp not found, nothing to delete
//! INFO  copied docs/readme.txt
//! ```
//!
//! # Architecture
//!
//! As with the CLI printers, the formatting is pure: [`event_log_lines`]
//! returns `(Severity, String)` pairs for tests to inspect, and
//! [`log_event_report`] hands them to `tracing`. The `format_*` functions
//! return `Vec<String>` and the `print_*` wrappers write them to stdout.

use crate::fs_ops::RemoveStatus;
use crate::mapping::{OutputPlan, SyncRoots};
use crate::optimize::{ArtifactResult, ArtifactStatus};
use crate::sync::SyncReport;
use crate::types::{EventReport, IgnoreReason};
use std::path::Path;

/// Log level of one output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

fn source_display<'a>(roots: &SyncRoots, source: &'a Path) -> std::borrow::Cow<'a, str> {
    source
        .strip_prefix(&roots.source_dir)
        .unwrap_or(source)
        .to_string_lossy()
}

fn artifact_line(artifact: &ArtifactResult, roots: &SyncRoots) -> (Severity, String) {
    let rel = roots.display_output(&artifact.path);
    match &artifact.status {
        ArtifactStatus::Created => (Severity::Info, format!("created {rel}")),
        ArtifactStatus::EncodeFailed(reason) => {
            (Severity::Error, format!("failed to create {rel}: {reason}"))
        }
    }
}

fn ignore_reason_text(reason: IgnoreReason) -> &'static str {
    match reason {
        IgnoreReason::OutsideSource => "outside the source directory",
        IgnoreReason::Metadata => "OS metadata",
        IgnoreReason::Directory => "directory",
    }
}

/// Log lines for one report, in output order.
pub fn event_log_lines(report: &EventReport, roots: &SyncRoots) -> Vec<(Severity, String)> {
    match report {
        EventReport::Optimized(r) => r
            .artifacts
            .iter()
            .chain(std::iter::once(&r.raw))
            .map(|a| artifact_line(a, roots))
            .collect(),
        EventReport::OptimizeFailed { source, error } => vec![(
            Severity::Error,
            format!("cannot process {}: {error}", source_display(roots, source)),
        )],
        EventReport::Removed { results, .. } => results
            .iter()
            .map(|r| {
                let rel = roots.display_output(&r.path);
                match &r.status {
                    RemoveStatus::Deleted => (Severity::Info, format!("deleted {rel}")),
                    RemoveStatus::NotFound => {
                        (Severity::Warn, format!("{rel} not found, nothing to delete"))
                    }
                    RemoveStatus::Failed(e) => {
                        (Severity::Error, format!("failed to delete {rel}: {e}"))
                    }
                }
            })
            .collect(),
        EventReport::Copied { output, .. } => vec![(
            Severity::Info,
            format!("copied {}", roots.display_output(output)),
        )],
        EventReport::CopyFailed {
            source,
            output,
            error,
        } => {
            let target = if output.as_os_str().is_empty() {
                source_display(roots, source)
            } else {
                roots.display_output(output)
            };
            vec![(Severity::Error, format!("failed to copy {target}: {error}"))]
        }
        EventReport::Ignored { path, reason } => vec![(
            Severity::Debug,
            format!(
                "ignored {} ({})",
                path.display(),
                ignore_reason_text(*reason)
            ),
        )],
    }
}

/// Emit [`event_log_lines`] through `tracing`.
pub fn log_event_report(report: &EventReport, roots: &SyncRoots) {
    for (severity, line) in event_log_lines(report, roots) {
        match severity {
            Severity::Debug => tracing::debug!("{line}"),
            Severity::Info => tracing::info!("{line}"),
            Severity::Warn => tracing::warn!("{line}"),
            Severity::Error => tracing::error!("{line}"),
        }
    }
}

/// Totals after a `sync` run, followed by each failure.
///
/// ```text
/// Synced src/images → public/images
///     2 images → 9 artifacts, 1 files copied (1 failed artifacts, 0 unreadable images, 0 failed copies)
///     failed to create blog/hero@sm.avif: ...
/// ```
pub fn format_sync_summary(report: &SyncReport, roots: &SyncRoots) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Synced {} → {}",
            roots.source_dir.display(),
            roots.output_dir.display()
        ),
        format!("    {}", report.stats()),
    ];
    for event in &report.events {
        for (severity, line) in event_log_lines(event, roots) {
            if severity == Severity::Error {
                lines.push(format!("    {line}"));
            }
        }
    }
    lines
}

pub fn print_sync_summary(report: &SyncReport, roots: &SyncRoots) {
    for line in format_sync_summary(report, roots) {
        println!("{line}");
    }
}

/// Planned artifacts for one source, relative to the output root.
///
/// ```text
/// blog/hero@2x.png (ratio 2)
///     2x     → blog/hero@2x.webp
///     raw    → blog/hero@raw.png
/// ```
pub fn format_plan(source: &Path, plan: &OutputPlan, roots: &SyncRoots) -> Vec<String> {
    let mut lines = vec![format!(
        "{} (ratio {})",
        source_display(roots, source),
        plan.declared_ratio
    )];
    for artifact in &plan.artifacts {
        let tier = if artifact.scale.suffix.is_empty() {
            "1x".to_string()
        } else {
            artifact.scale.suffix.clone()
        };
        lines.push(format!(
            "    {tier:<6} → {}",
            roots.display_output(&artifact.path)
        ));
    }
    lines.push(format!(
        "    {:<6} → {}",
        "raw",
        roots.display_output(&plan.raw_path)
    ));
    lines
}

pub fn print_plan(source: &Path, plan: &OutputPlan, roots: &SyncRoots) {
    for line in format_plan(source, plan, roots) {
        println!("{line}");
    }
}
