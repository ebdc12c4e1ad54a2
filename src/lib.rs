//! # trq-image
//!
//! Build-time image assets for a static site. Source images live in
//! `src/images/`; every one of them becomes a set of resized, re-encoded
//! variants plus a verbatim copy under `public/images/`, and the output tree
//! is kept in sync while a dev server runs.
//!
//! # Architecture
//!
//! ```text
//! src/images/blog/hero@2x.png
//!      │
//!      ├─ naming      "hero", declared ratio 2
//!      ├─ mapping     retained tiers → public/images/blog/hero@<suffix>.<fmt>
//!      ├─ optimize    identify, render every tier × format, copy @raw
//!      └─ sync        full sync on startup, per-path incremental updates
//!                     ▲
//!      watch ─────────┘ notify events → Dispatcher (per-path FIFO)
//! ```
//!
//! Nothing the pipeline hits is fatal to its host: an unreadable source
//! skips that source, a failed encode skips that artifact, a missing delete
//! target is a warning. Outcomes come back as reports ([`optimize::OptimizeReport`],
//! [`types::EventReport`]) and [`output`] turns them into `tracing` events.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `trq-image.toml` loading, stock defaults, validation |
//! | [`naming`] | `name@<ratio>x.ext` filename parser |
//! | [`mapping`] | Source path → artifact paths; scale tier retention |
//! | [`fs_ops`] | Output tree maintenance: atomic writes, copies, removals |
//! | [`imaging`] | Pure-Rust decode, resize and encode behind [`imaging::ImageBackend`] |
//! | [`optimize`] | One source image → its full artifact set |
//! | [`sync`] | Full and incremental sync, lifecycle, per-path dispatcher |
//! | [`watch`] | `notify` watcher → dispatcher |
//! | [`types`] | Event and report types shared by sync, watch and output |
//! | [`output`] | Log lines and CLI summaries |
//!
//! # Design Decisions
//!
//! ## Full Regeneration, No Cache
//!
//! A changed source regenerates all of its artifacts, and a forced startup
//! wipes the output root and rebuilds it. The output tree is a pure function
//! of the source tree and the config, so running a full sync twice yields a
//! byte-identical tree.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and encoding all use the `image` crate;
//! AVIF sources are decoded with `rav1d`. No system libraries, no external
//! processes.
//!
//! ## Atomic Writes
//!
//! Artifacts are written to a hidden temp file next to their final path and
//! renamed into place, so a dev server serving the output tree never sees a
//! half-written image.

pub mod config;
pub mod fs_ops;
pub mod imaging;
pub mod mapping;
pub mod naming;
pub mod optimize;
pub mod output;
pub mod sync;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
