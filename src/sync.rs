//! Keeps the output tree a mirror of the source tree.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start(force)──▶ FullSyncing ──▶ Watching
//!          │                                ▲
//!          └────────── start(false) ────────┘
//! ```
//!
//! [`Synchronizer::full_sync`] wipes the output root and rebuilds it from
//! scratch. [`Synchronizer::handle_event`] applies one source change
//! incrementally. Both return reports and never log per file; the host hooks
//! ([`Synchronizer::start`] and [`Dispatcher`]) log through [`output`].
//!
//! # Per-path ordering
//!
//! The watcher can deliver `Change, Change, Delete` for one file faster than a
//! render finishes. [`Dispatcher`] gives every source path its own FIFO queue:
//! the first event for an idle path spawns a rayon task that drains the queue,
//! later events for that path are appended to it. Different paths run
//! concurrently, the same path strictly in arrival order, so the output always
//! ends up matching the last event.

use crate::config::OptimizeConfig;
use crate::fs_ops::{self, RemoveResult};
use crate::imaging::ImageBackend;
use crate::mapping::{self, SyncRoots};
use crate::optimize;
use crate::output;
use crate::types::{ChangeKind, EventReport, IgnoreReason, SyncStats};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use walkdir::WalkDir;

/// macOS Finder metadata; never mirrored.
pub const IGNORED_FILE_NAME: &str = ".DS_Store";

/// Environment variable that forces a full sync on startup when set to `true`.
pub const FORCE_ENV: &str = "RESIZE_IMAGES";

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("synchronizer already started (state: {0:?})")]
    AlreadyStarted(SyncState),
    #[error("source directory {0} does not exist")]
    SourceMissing(PathBuf),
    #[error("cannot clear output directory {path}: {source}")]
    ResetOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    FullSyncing,
    Watching,
}

/// Whether a `RESIZE_IMAGES` value asks for a full sync. Only the exact string `true` does.
pub fn force_requested(value: Option<&str>) -> bool {
    value == Some("true")
}

/// [`force_requested`] applied to the process environment.
pub fn force_from_env() -> bool {
    force_requested(std::env::var(FORCE_ENV).ok().as_deref())
}

/// Reports from one full sync, in source walk order.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub events: Vec<EventReport>,
}

impl SyncReport {
    pub fn stats(&self) -> SyncStats {
        SyncStats::from_reports(&self.events)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Synchronizer<B> {
    backend: B,
    roots: SyncRoots,
    config: OptimizeConfig,
    state: Mutex<SyncState>,
}

impl<B: ImageBackend> Synchronizer<B> {
    pub fn new(backend: B, roots: SyncRoots, config: OptimizeConfig) -> Self {
        Self {
            backend,
            roots,
            config,
            state: Mutex::new(SyncState::Idle),
        }
    }

    pub fn roots(&self) -> &SyncRoots {
        &self.roots
    }

    pub fn state(&self) -> SyncState {
        *lock(&self.state)
    }

    /// Startup hook. Runs a full sync when `force` is set, then enters `Watching`.
    ///
    /// Only valid from `Idle`. The state becomes `Watching` even when the full
    /// sync fails; the error is logged and returned.
    pub fn start(&self, force: bool) -> Result<Option<SyncReport>, SyncError> {
        {
            let mut state = lock(&self.state);
            if *state != SyncState::Idle {
                return Err(SyncError::AlreadyStarted(*state));
            }
            *state = if force {
                SyncState::FullSyncing
            } else {
                SyncState::Watching
            };
        }
        if !force {
            return Ok(None);
        }

        tracing::info!(
            source = %self.roots.source_dir.display(),
            output = %self.roots.output_dir.display(),
            "full sync"
        );
        let result = self.full_sync();
        *lock(&self.state) = SyncState::Watching;

        match result {
            Ok(report) => {
                for event in &report.events {
                    output::log_event_report(event, &self.roots);
                }
                tracing::info!("{}", report.stats());
                Ok(Some(report))
            }
            Err(e) => {
                tracing::error!("full sync failed: {e}");
                Err(e)
            }
        }
    }

    /// Wipe the output root and regenerate it from every source file.
    ///
    /// Files are handled one at a time in sorted walk order, so when two sources
    /// map to the same artifact (`hero.png` and `hero@2x.png` both own
    /// `hero@raw.png`) the later one always wins. Renders within one source
    /// still run in parallel. Symlinked files are followed like in
    /// [`Synchronizer::handle_event`]. Unreadable directory entries are skipped
    /// with a warning.
    pub fn full_sync(&self) -> Result<SyncReport, SyncError> {
        let source_dir = &self.roots.source_dir;
        if !source_dir.is_dir() {
            return Err(SyncError::SourceMissing(source_dir.clone()));
        }

        let output_dir = &self.roots.output_dir;
        fs_ops::reset_dir(output_dir)
            .and_then(|()| std::fs::create_dir_all(output_dir))
            .map_err(|source| SyncError::ResetOutput {
                path: output_dir.clone(),
                source,
            })?;

        let files: Vec<PathBuf> = WalkDir::new(source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| !entry.file_type().is_dir() && entry.path().is_file())
            .map(|entry| entry.into_path())
            .collect();

        let events = files.iter().map(|path| self.sync_file(path)).collect();
        Ok(SyncReport { events })
    }

    /// Apply one source change to the output tree.
    pub fn handle_event(&self, path: &Path, kind: ChangeKind) -> EventReport {
        if let Some(reason) = self.ignore_reason(path) {
            return EventReport::Ignored {
                path: path.to_path_buf(),
                reason,
            };
        }
        match kind {
            ChangeKind::Add | ChangeKind::Change => self.sync_file(path),
            ChangeKind::Delete => self.remove_outputs(path),
        }
    }

    fn ignore_reason(&self, path: &Path) -> Option<IgnoreReason> {
        if !self.roots.contains(path) {
            Some(IgnoreReason::OutsideSource)
        } else if path.file_name().is_some_and(|n| n == IGNORED_FILE_NAME) {
            Some(IgnoreReason::Metadata)
        } else {
            None
        }
    }

    /// Regenerate an image or copy a passthrough file.
    fn sync_file(&self, path: &Path) -> EventReport {
        if let Some(reason) = self.ignore_reason(path) {
            return EventReport::Ignored {
                path: path.to_path_buf(),
                reason,
            };
        }
        if path.is_dir() {
            return EventReport::Ignored {
                path: path.to_path_buf(),
                reason: IgnoreReason::Directory,
            };
        }

        if mapping::is_image(path) {
            return match optimize::optimize(&self.backend, path, &self.roots, &self.config) {
                Ok(report) => EventReport::Optimized(report),
                Err(e) => EventReport::OptimizeFailed {
                    source: path.to_path_buf(),
                    error: e.to_string(),
                },
            };
        }

        let output = match self.roots.mirror(path) {
            Ok(output) => output,
            Err(e) => {
                return EventReport::CopyFailed {
                    source: path.to_path_buf(),
                    output: PathBuf::new(),
                    error: e.to_string(),
                };
            }
        };
        match fs_ops::copy_verbatim(path, &output) {
            Ok(_) => EventReport::Copied {
                source: path.to_path_buf(),
                output,
            },
            Err(e) => EventReport::CopyFailed {
                source: path.to_path_buf(),
                output,
                error: e.to_string(),
            },
        }
    }

    /// Remove everything a deleted source owned.
    fn remove_outputs(&self, path: &Path) -> EventReport {
        let targets: Vec<PathBuf> = if mapping::is_image(path) {
            match mapping::plan_outputs(path, &self.roots, &self.config) {
                Ok(plan) => plan.all_paths().map(Path::to_path_buf).collect(),
                Err(_) => Vec::new(),
            }
        } else {
            self.roots.mirror(path).into_iter().collect()
        };

        let results: Vec<RemoveResult> = targets
            .iter()
            .map(|target| fs_ops::remove_output(target))
            .collect();
        EventReport::Removed {
            source: path.to_path_buf(),
            results,
        }
    }
}

struct Queues {
    pending: Mutex<HashMap<PathBuf, VecDeque<ChangeKind>>>,
    idle: Condvar,
}

/// Per-path serialized event handling on the rayon pool.
pub struct Dispatcher<B> {
    sync: Arc<Synchronizer<B>>,
    queues: Arc<Queues>,
    reports: Option<Sender<EventReport>>,
}

impl<B: ImageBackend + 'static> Dispatcher<B> {
    /// `reports`, when given, receives every [`EventReport`] after it is logged.
    pub fn new(sync: Arc<Synchronizer<B>>, reports: Option<Sender<EventReport>>) -> Self {
        Self {
            sync,
            queues: Arc::new(Queues {
                pending: Mutex::new(HashMap::new()),
                idle: Condvar::new(),
            }),
            reports,
        }
    }

    pub fn synchronizer(&self) -> &Synchronizer<B> {
        &self.sync
    }

    /// Queue `kind` for `path`. Returns immediately.
    pub fn dispatch(&self, path: PathBuf, kind: ChangeKind) {
        {
            let mut pending = lock(&self.queues.pending);
            if let Some(queue) = pending.get_mut(&path) {
                queue.push_back(kind);
                return;
            }
            pending.insert(path.clone(), VecDeque::new());
        }

        let sync = Arc::clone(&self.sync);
        let queues = Arc::clone(&self.queues);
        let reports = self.reports.clone();
        rayon::spawn(move || drain(&*sync, &*queues, reports.as_ref(), path, kind));
    }

    /// Block until every queued event has been handled.
    pub fn wait_idle(&self) {
        let mut pending = lock(&self.queues.pending);
        while !pending.is_empty() {
            pending = self
                .queues
                .idle
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Handle `first`, then whatever arrived for `path` meanwhile, until its queue is empty.
fn drain<B: ImageBackend>(
    sync: &Synchronizer<B>,
    queues: &Queues,
    reports: Option<&Sender<EventReport>>,
    path: PathBuf,
    first: ChangeKind,
) {
    let mut next = Some(first);
    while let Some(kind) = next {
        let report = sync.handle_event(&path, kind);
        output::log_event_report(&report, sync.roots());
        if let Some(tx) = reports {
            // The receiver going away only means nobody is listening anymore.
            let _ = tx.send(report);
        }

        let mut pending = lock(&queues.pending);
        next = pending.get_mut(&path).and_then(VecDeque::pop_front);
        if next.is_none() {
            pending.remove(&path);
            if pending.is_empty() {
                queues.idle.notify_all();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Format, ScaleSpec};
    use crate::fs_ops::RemoveStatus;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::{TestProject, snapshot_tree, tree_files};
    use std::sync::mpsc;

    fn retina_config() -> OptimizeConfig {
        OptimizeConfig {
            scales: vec![ScaleSpec::new("", 1.0), ScaleSpec::new("2x", 0.5)],
            formats: vec![Format::Webp],
            ..Default::default()
        }
    }

    fn mock_sync(project: &TestProject) -> Synchronizer<MockBackend> {
        Synchronizer::new(MockBackend::new(), project.roots.clone(), retina_config())
    }

    // =========================================================================
    // Force signal
    // =========================================================================

    #[test]
    fn force_only_on_exact_true() {
        assert!(force_requested(Some("true")));
        assert!(!force_requested(Some("TRUE")));
        assert!(!force_requested(Some("1")));
        assert!(!force_requested(Some("")));
        assert!(!force_requested(None));
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[test]
    fn start_without_force_goes_straight_to_watching() {
        let project = TestProject::new();
        project.write_file("a.txt", b"a");
        let sync = mock_sync(&project);

        assert_eq!(sync.state(), SyncState::Idle);
        assert!(sync.start(false).unwrap().is_none());
        assert_eq!(sync.state(), SyncState::Watching);
        assert!(tree_files(&project.roots.output_dir).is_empty());
    }

    #[test]
    fn start_with_force_runs_full_sync() {
        let project = TestProject::new();
        project.write_file("a.txt", b"a");
        let sync = mock_sync(&project);

        let report = sync.start(true).unwrap().unwrap();
        assert_eq!(report.stats().copied, 1);
        assert_eq!(sync.state(), SyncState::Watching);
        assert_eq!(tree_files(&project.roots.output_dir), vec!["a.txt"]);
    }

    #[test]
    fn start_twice_is_rejected() {
        let project = TestProject::new();
        let sync = mock_sync(&project);
        sync.start(false).unwrap();

        let err = sync.start(true).unwrap_err();
        assert!(matches!(err, SyncError::AlreadyStarted(SyncState::Watching)));
    }

    #[test]
    fn failed_full_sync_still_enters_watching() {
        let project = TestProject::new();
        std::fs::remove_dir_all(&project.roots.source_dir).unwrap();
        let sync = mock_sync(&project);

        let err = sync.start(true).unwrap_err();
        assert!(matches!(err, SyncError::SourceMissing(_)));
        assert_eq!(sync.state(), SyncState::Watching);
    }

    // =========================================================================
    // Full sync
    // =========================================================================

    #[test]
    fn full_sync_mirrors_images_and_passthrough_files() {
        let project = TestProject::new();
        project.write_file("blog/hero.png", b"img");
        project.write_file("blog/banner@2x.jpg", b"img2");
        project.write_file("docs/notes.txt", b"plain text");
        project.write_file("blog/.DS_Store", b"junk");

        let report = mock_sync(&project).full_sync().unwrap();
        let stats = report.stats();
        assert_eq!(stats.images, 2);
        assert_eq!(stats.copied, 1);
        assert_eq!(stats.ignored, 1);

        assert_eq!(
            tree_files(&project.roots.output_dir),
            vec![
                "blog/banner@2x.webp",
                "blog/banner@raw.jpg",
                "blog/hero.webp",
                "blog/hero@2x.webp",
                "blog/hero@raw.png",
                "docs/notes.txt",
            ]
        );
    }

    #[test]
    fn full_sync_wipes_stale_outputs() {
        let project = TestProject::new();
        project.write_file("kept.txt", b"keep");
        std::fs::create_dir_all(project.output("old")).unwrap();
        std::fs::write(project.output("old/stale.webp"), b"stale").unwrap();

        mock_sync(&project).full_sync().unwrap();
        assert_eq!(tree_files(&project.roots.output_dir), vec!["kept.txt"]);
    }

    #[test]
    fn full_sync_twice_is_byte_identical() {
        let project = TestProject::new();
        project.write_png("a/photo.png", 64, 48);
        project.write_jpeg("b/shot@2x.JPG", 40, 40);
        project.write_file("c/data.json", b"{}");

        let sync = Synchronizer::new(RustBackend::new(), project.roots.clone(), retina_config());
        sync.full_sync().unwrap();
        let first = snapshot_tree(&project.roots.output_dir);
        sync.full_sync().unwrap();
        let second = snapshot_tree(&project.roots.output_dir);

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn colliding_sources_resolve_in_walk_order() {
        let project = TestProject::new();
        for i in 0..20 {
            project.write_file(&format!("d{i}/hero.png"), b"A");
            project.write_file(&format!("d{i}/hero@2x.png"), b"B");
        }
        let sync = Synchronizer::new(
            MockBackend::new(),
            project.roots.clone(),
            OptimizeConfig::default(),
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(8)
            .build()
            .unwrap();

        let first = pool.install(|| {
            sync.full_sync().unwrap();
            snapshot_tree(&project.roots.output_dir)
        });
        for i in 0..20 {
            // hero@2x.png sorts after hero.png, so its bytes win
            assert_eq!(first[&format!("d{i}/hero@raw.png")], b"B");
        }
        for _ in 0..5 {
            let again = pool.install(|| {
                sync.full_sync().unwrap();
                snapshot_tree(&project.roots.output_dir)
            });
            assert_eq!(again, first);
        }
    }

    #[cfg(unix)]
    #[test]
    fn full_sync_follows_symlinked_files_like_events() {
        let project = TestProject::new();
        let target = project.dir.path().join("outside.txt");
        std::fs::write(&target, b"linked bytes").unwrap();
        project.write_file("plain.txt", b"plain");
        let link = project.source("linked.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let sync = mock_sync(&project);
        sync.full_sync().unwrap();
        let after_full_sync = snapshot_tree(&project.roots.output_dir);
        assert_eq!(after_full_sync["linked.txt"], b"linked bytes");

        sync.handle_event(&link, ChangeKind::Add);
        assert_eq!(snapshot_tree(&project.roots.output_dir), after_full_sync);
    }

    #[test]
    fn uppercase_extension_is_an_image() {
        let project = TestProject::new();
        project.write_file("LOUD.PNG", b"x");

        mock_sync(&project).full_sync().unwrap();
        assert_eq!(
            tree_files(&project.roots.output_dir),
            vec!["LOUD.webp", "LOUD@2x.webp", "LOUD@raw.PNG"]
        );
    }

    #[test]
    fn full_sync_keeps_walk_order_in_report() {
        let project = TestProject::new();
        for name in ["c.txt", "a.txt", "b.txt"] {
            project.write_file(name, name.as_bytes());
        }

        let report = mock_sync(&project).full_sync().unwrap();
        let sources: Vec<_> = report
            .events
            .iter()
            .filter_map(|e| match e {
                EventReport::Copied { source, .. } => source.file_name(),
                _ => None,
            })
            .collect();
        assert_eq!(sources, vec!["a.txt", "b.txt", "c.txt"]);
    }

    // =========================================================================
    // Incremental events
    // =========================================================================

    #[test]
    fn image_delete_removes_every_artifact() {
        let project = TestProject::new();
        let source = project.write_file("blog/hero.png", b"img");
        let sync = mock_sync(&project);
        sync.full_sync().unwrap();
        assert_eq!(tree_files(&project.roots.output_dir).len(), 3);

        std::fs::remove_file(&source).unwrap();
        let report = sync.handle_event(&source, ChangeKind::Delete);

        let EventReport::Removed { results, .. } = report else {
            panic!("expected Removed, got {report:?}");
        };
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.status == RemoveStatus::Deleted));
        assert!(
            tree_files(&project.roots.output_dir)
                .iter()
                .all(|f| !f.contains("hero"))
        );
    }

    #[test]
    fn delete_of_never_generated_image_reports_not_found() {
        let project = TestProject::new();
        let sync = mock_sync(&project);

        let report = sync.handle_event(&project.source("ghost.png"), ChangeKind::Delete);
        let EventReport::Removed { results, .. } = &report else {
            panic!("expected Removed, got {report:?}");
        };
        assert!(results.iter().all(|r| r.status == RemoveStatus::NotFound));
        assert!(report.is_success());
    }

    #[test]
    fn change_overwrites_passthrough_with_exact_bytes() {
        let project = TestProject::new();
        let source = project.write_file("fonts/body.woff2", b"v1");
        let sync = mock_sync(&project);
        sync.handle_event(&source, ChangeKind::Add);

        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        std::fs::write(&source, &bytes).unwrap();
        let report = sync.handle_event(&source, ChangeKind::Change);

        assert!(matches!(report, EventReport::Copied { .. }));
        assert_eq!(std::fs::read(project.output("fonts/body.woff2")).unwrap(), bytes);
    }

    #[test]
    fn passthrough_delete_removes_mirror() {
        let project = TestProject::new();
        let source = project.write_file("notes.md", b"# hi");
        let sync = mock_sync(&project);
        sync.handle_event(&source, ChangeKind::Add);
        assert!(project.output("notes.md").exists());

        let report = sync.handle_event(&source, ChangeKind::Delete);
        assert!(report.is_success());
        assert!(!project.output("notes.md").exists());
    }

    #[test]
    fn deleted_directory_removes_mirrored_directory() {
        let project = TestProject::new();
        project.write_file("album/one.txt", b"1");
        project.write_file("album/two.txt", b"2");
        let sync = mock_sync(&project);
        sync.full_sync().unwrap();

        let dir = project.source("album");
        std::fs::remove_dir_all(&dir).unwrap();
        sync.handle_event(&dir, ChangeKind::Delete);
        assert!(!project.output("album").exists());
    }

    #[test]
    fn directory_add_is_ignored() {
        let project = TestProject::new();
        let dir = project.source("empty");
        std::fs::create_dir_all(&dir).unwrap();

        let report = mock_sync(&project).handle_event(&dir, ChangeKind::Add);
        assert!(matches!(
            report,
            EventReport::Ignored {
                reason: IgnoreReason::Directory,
                ..
            }
        ));
    }

    #[test]
    fn ds_store_and_outside_paths_are_ignored() {
        let project = TestProject::new();
        let sync = mock_sync(&project);
        let ds_store = project.write_file(".DS_Store", b"x");
        let outside = project.dir.path().join("src/other.png");
        std::fs::write(&outside, b"x").unwrap();

        assert!(matches!(
            sync.handle_event(&ds_store, ChangeKind::Add),
            EventReport::Ignored {
                reason: IgnoreReason::Metadata,
                ..
            }
        ));
        assert!(matches!(
            sync.handle_event(&outside, ChangeKind::Add),
            EventReport::Ignored {
                reason: IgnoreReason::OutsideSource,
                ..
            }
        ));
        assert!(tree_files(&project.roots.output_dir).is_empty());
    }

    #[test]
    fn unreadable_image_reports_failure_and_writes_nothing() {
        let project = TestProject::new();
        let source = project.write_file("bad.png", b"x");
        let sync = Synchronizer::new(
            MockBackend::new().fail_identify("bad.png"),
            project.roots.clone(),
            retina_config(),
        );

        let report = sync.handle_event(&source, ChangeKind::Add);
        assert!(matches!(report, EventReport::OptimizeFailed { .. }));
        assert!(tree_files(&project.roots.output_dir).is_empty());
    }

    // =========================================================================
    // Dispatcher
    // =========================================================================

    #[test]
    fn dispatcher_applies_same_path_events_in_order() {
        let project = TestProject::new();
        let source = project.write_file("hero.png", b"img");
        let sync = Arc::new(mock_sync(&project));
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(Arc::clone(&sync), Some(tx));

        dispatcher.dispatch(source.clone(), ChangeKind::Add);
        dispatcher.dispatch(source.clone(), ChangeKind::Change);
        dispatcher.dispatch(source.clone(), ChangeKind::Delete);
        dispatcher.wait_idle();

        let kinds: Vec<&str> = rx
            .try_iter()
            .map(|r| match r {
                EventReport::Optimized(_) => "optimized",
                EventReport::Removed { .. } => "removed",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["optimized", "optimized", "removed"]);
        assert!(tree_files(&project.roots.output_dir).is_empty());
    }

    #[test]
    fn dispatcher_handles_many_paths() {
        let project = TestProject::new();
        let sources: Vec<_> = (0..16)
            .map(|i| project.write_file(&format!("dir{}/file{i}.txt", i % 4), b"data"))
            .collect();
        let dispatcher = Dispatcher::new(Arc::new(mock_sync(&project)), None);

        for source in &sources {
            dispatcher.dispatch(source.clone(), ChangeKind::Add);
        }
        dispatcher.wait_idle();

        assert_eq!(tree_files(&project.roots.output_dir).len(), 16);
    }

    #[test]
    fn wait_idle_returns_immediately_when_nothing_queued() {
        let project = TestProject::new();
        let dispatcher = Dispatcher::new(Arc::new(mock_sync(&project)), None);
        dispatcher.wait_idle();
    }
}
