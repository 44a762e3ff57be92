// src/lib.rs
//! Packages a project directory into a compressed archive for upload to a
//! deployment service, honoring the project's `.gitignore` (when present)
//! plus a built-in default rule set.
//!
//! The produced archive lands at a uniquely named path in the system temp
//! directory; the caller uploads it and owns its eventual deletion. No
//! partial archive survives any failure path.
#![deny(unsafe_op_in_unsafe_fn, rust_2018_idioms)]
#![deny(warnings)]

use archive::ArchiveWriter;
use filters::Matcher;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info};
use walk::WalkError;

/// Patterns always excluded from deploy packages. Appended after the
/// project's own ignore rules, so they take precedence on conflict.
pub const DEFAULT_IGNORES: &[&str] = &[
    "/.gitignore",
    ".git/",
    ".vs/",
    "bin/",
    "obj/",
    "artifacts/",
    "*.user",
    "*.swp",
    "*.log",
    "*/vendor/",
];

/// Error type for packaging operations. Every surfaced failure names the
/// offending path where one is known.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The packaging root does not exist.
    #[error("source directory `{}` does not exist", .0.display())]
    SourceNotFound(PathBuf),
    /// A read or write failed during traversal or archive writing.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Cancellation was observed between files.
    #[error("packaging was cancelled")]
    Cancelled,
}

impl From<WalkError> for PackageError {
    fn from(err: WalkError) -> Self {
        PackageError::Io {
            path: err.path,
            source: err.source,
        }
    }
}

/// Result type for packaging operations.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Cooperative cancellation flag, checked between files during packaging.
/// Clones share the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Packages `source` into a fresh `deploy-*.tar.gz` in the system temp
/// directory and returns its path.
///
/// # Errors
///
/// Returns [`PackageError::SourceNotFound`] when `source` is not an
/// existing directory, and [`PackageError::Io`] for any read or write
/// failure; in the latter case the temporary archive is removed.
pub fn package_dir(source: &Path) -> Result<PathBuf> {
    package_dir_with_cancel(source, &CancelFlag::new())
}

/// Like [`package_dir`], but observes `cancel` between files. A cancelled
/// run returns [`PackageError::Cancelled`] and leaves no archive behind.
pub fn package_dir_with_cancel(source: &Path, cancel: &CancelFlag) -> Result<PathBuf> {
    package_dir_in(source, &std::env::temp_dir(), cancel)
}

/// Like [`package_dir_with_cancel`], but places the archive in `temp_dir`
/// instead of the system temp directory.
pub fn package_dir_in(source: &Path, temp_dir: &Path, cancel: &CancelFlag) -> Result<PathBuf> {
    if !source.is_dir() {
        return Err(PackageError::SourceNotFound(source.to_path_buf()));
    }

    // Rebuilt from the current ignore-file contents on every call.
    let matcher = Matcher::load(source, DEFAULT_IGNORES).map_err(|e| PackageError::Io {
        path: source.join(filters::IGNORE_FILE),
        source: e,
    })?;

    let tmp = tempfile::Builder::new()
        .prefix("deploy-")
        .suffix(".tar.gz")
        .tempfile_in(temp_dir)
        .map_err(|e| PackageError::Io {
            path: temp_dir.to_path_buf(),
            source: e,
        })?;

    // The guard removes the partial archive on every early return below;
    // only the success path persists it.
    let mut writer = ArchiveWriter::new(tmp.as_file());
    let mut files = 0usize;
    for entry in walk::walk(source, &matcher) {
        if cancel.is_cancelled() {
            return Err(PackageError::Cancelled);
        }
        let entry = entry?;
        if entry.rel.trim().is_empty() {
            continue;
        }
        writer
            .append_path(&entry.path, &entry.rel)
            .map_err(|e| PackageError::Io {
                path: entry.path.clone(),
                source: e,
            })?;
        debug!(entry = %entry.rel, "added to package");
        files += 1;
    }
    writer.finish().map_err(|e| PackageError::Io {
        path: tmp.path().to_path_buf(),
        source: e,
    })?;

    let (_file, path) = tmp.keep().map_err(|e| PackageError::Io {
        path: e.file.path().to_path_buf(),
        source: e.error,
    })?;
    info!(archive = %path.display(), files, "created deploy package");
    Ok(path)
}
