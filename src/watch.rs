//! Filesystem watcher feeding the [`Dispatcher`].
//!
//! `notify` events are flattened into `(path, ChangeKind)` pairs:
//!
//! | notify event | change |
//! |---|---|
//! | `Create(_)` | Add |
//! | `Modify(Data \| Any \| Other)` | Change |
//! | `Modify(Name(From))` | Delete |
//! | `Modify(Name(To))` | Add |
//! | `Modify(Name(Both))` | Delete old, Add new |
//! | `Modify(Name(Any \| Other))` | Add if the path exists, else Delete |
//! | `Remove(_)` | Delete |
//! | `Modify(Metadata(_))`, `Access(_)`, `Any`, `Other` | ignored |

use crate::imaging::ImageBackend;
use crate::sync::Dispatcher;
use crate::types::ChangeKind;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("cannot watch {path}: {source}")]
    Notify {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

fn exists_or_deleted(path: &Path) -> ChangeKind {
    if path.exists() {
        ChangeKind::Add
    } else {
        ChangeKind::Delete
    }
}

/// Source changes described by one notify event.
pub fn map_event(event: &Event) -> Vec<(PathBuf, ChangeKind)> {
    let all = |kind: ChangeKind| -> Vec<(PathBuf, ChangeKind)> {
        event.paths.iter().map(|p| (p.clone(), kind)).collect()
    };

    match &event.kind {
        EventKind::Create(_) => all(ChangeKind::Add),
        EventKind::Remove(_) => all(ChangeKind::Delete),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => all(ChangeKind::Delete),
            RenameMode::To => all(ChangeKind::Add),
            RenameMode::Both => match event.paths.as_slice() {
                [from, to, ..] => vec![
                    (from.clone(), ChangeKind::Delete),
                    (to.clone(), ChangeKind::Add),
                ],
                _ => event
                    .paths
                    .iter()
                    .map(|p| (p.clone(), exists_or_deleted(p)))
                    .collect(),
            },
            RenameMode::Any | RenameMode::Other => event
                .paths
                .iter()
                .map(|p| (p.clone(), exists_or_deleted(p)))
                .collect(),
        },
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other) => {
            all(ChangeKind::Change)
        }
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// Forward every event to `dispatcher` until `events` ends.
pub fn pump<B: ImageBackend + 'static>(
    events: impl IntoIterator<Item = notify::Result<Event>>,
    dispatcher: &Dispatcher<B>,
) {
    for event in events {
        match event {
            Ok(event) => {
                for (path, kind) in map_event(&event) {
                    tracing::trace!(path = %path.display(), ?kind, "source change");
                    dispatcher.dispatch(path, kind);
                }
            }
            Err(e) => tracing::error!("watch error: {e}"),
        }
    }
}

/// Watch the source tree recursively and dispatch changes. Blocks for as
/// long as the watcher lives.
pub fn watch<B: ImageBackend + 'static>(dispatcher: &Dispatcher<B>) -> Result<(), WatchError> {
    let source_dir = dispatcher.synchronizer().roots().source_dir.clone();
    let notify_failed = |source: notify::Error| WatchError::Notify {
        path: source_dir.clone(),
        source,
    };

    let (tx, rx) = mpsc::channel();
    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .map_err(notify_failed)?;
    watcher
        .watch(&source_dir, RecursiveMode::Recursive)
        .map_err(notify_failed)?;

    tracing::info!(source = %source_dir.display(), "watching");
    pump(rx, dispatcher);
    tracing::warn!(source = %source_dir.display(), "watcher channel closed");
    Ok(())
}
