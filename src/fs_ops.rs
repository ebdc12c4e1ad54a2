//! Output tree maintenance: directory creation, wipes, copies, deletes.
//!
//! Every write into the output tree goes through [`write_atomic`]: bytes land
//! in a hidden sibling temp file first and are renamed into place, so a
//! concurrent reader (the dev server) sees either the old file or the new
//! one, never a truncated one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Outcome of removing one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveStatus {
    Deleted,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveResult {
    pub path: PathBuf,
    pub status: RemoveStatus,
}

/// Create every missing ancestor of `path`.
///
/// Idempotent; losing a creation race against another handler is not an error.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

fn ensure_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        other => other,
    }
}

/// Recursively delete `dir`. A missing directory is fine.
pub fn reset_dir(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Hidden sibling used while `path` is being written.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}-{n}.tmp", std::process::id()))
}

/// Write through `write` into a temp file, then rename it over `path`.
///
/// On failure the temp file is removed and `path` is left untouched.
pub fn write_atomic<T, E>(
    path: &Path,
    write: impl FnOnce(&mut io::BufWriter<fs::File>) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<io::Error>,
{
    ensure_parent_dir(path)?;
    let tmp = temp_sibling(path);
    let result = write_then_rename(&tmp, path, write);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_then_rename<T, E>(
    tmp: &Path,
    path: &Path,
    write: impl FnOnce(&mut io::BufWriter<fs::File>) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<io::Error>,
{
    let mut writer = io::BufWriter::new(fs::File::create(tmp)?);
    let value = write(&mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::rename(tmp, path)?;
    Ok(value)
}

/// Copy `src` to `dst` byte for byte, overwriting any existing file.
pub fn copy_verbatim(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut input = fs::File::open(src)?;
    write_atomic(dst, |out| io::copy(&mut input, out))
}

/// Remove one output path; a directory is removed with its contents.
pub fn remove_output(path: &Path) -> RemoveResult {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    let status = match result {
        Ok(()) => RemoveStatus::Deleted,
        Err(e) if e.kind() == io::ErrorKind::NotFound => RemoveStatus::NotFound,
        Err(e) => RemoveStatus::Failed(e.to_string()),
    };
    RemoveResult {
        path: path.to_path_buf(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_parent_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a/b/c/file.png");
        ensure_parent_dir(&file).unwrap();
        ensure_parent_dir(&file).unwrap();
        assert!(tmp.path().join("a/b/c").is_dir());
        assert!(!file.exists());
    }

    #[test]
    fn ensure_parent_dir_of_bare_name_is_noop() {
        ensure_parent_dir(Path::new("file.png")).unwrap();
    }

    #[test]
    fn reset_dir_removes_tree_and_tolerates_missing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("out");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/f.txt"), "x").unwrap();

        reset_dir(&dir).unwrap();
        assert!(!dir.exists());
        reset_dir(&dir).unwrap();
    }

    #[test]
    fn copy_verbatim_preserves_bytes_and_creates_dirs() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.bin");
        let bytes: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        fs::write(&src, &bytes).unwrap();

        let dst = tmp.path().join("deep/dir/dst.bin");
        copy_verbatim(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), bytes);
    }

    #[test]
    fn copy_verbatim_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old content that is longer").unwrap();

        copy_verbatim(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn write_atomic_leaves_no_temp_file_on_error() {
        let tmp = TempDir::new().unwrap();
        let dst = tmp.path().join("out.bin");
        let result: io::Result<()> = write_atomic(&dst, |w| {
            w.write_all(b"partial")?;
            Err(io::Error::other("encoder blew up"))
        });
        assert!(result.is_err());
        assert!(!dst.exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn remove_output_reports_status() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.png");
        fs::write(&file, "x").unwrap();

        assert_eq!(remove_output(&file).status, RemoveStatus::Deleted);
        assert!(!file.exists());
        assert_eq!(remove_output(&file).status, RemoveStatus::NotFound);
    }

    #[test]
    fn remove_output_removes_directories() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("docs");
        fs::create_dir_all(dir.join("inner")).unwrap();
        fs::write(dir.join("inner/a.txt"), "x").unwrap();

        assert_eq!(remove_output(&dir).status, RemoveStatus::Deleted);
        assert!(!dir.exists());
    }
}
