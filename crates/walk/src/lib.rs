use filters::Matcher;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::trace;

/// Error raised while traversing the source tree. Carries the path that
/// failed so callers can surface it verbatim.
#[derive(Debug, Error)]
#[error("{}: {source}", .path.display())]
pub struct WalkError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A kept file produced by the walker.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Path on disk, rooted at the walk root.
    pub path: PathBuf,
    /// Forward-slash path relative to the walk root.
    pub rel: String,
}

/// Depth-first generator over the kept files under `root`.
///
/// Ignored subdirectories are pruned without being enumerated unless a
/// negated rule might re-include something beneath them. The root itself
/// is never tested against the rule set. Siblings are visited in file-name
/// order, so a single walk is deterministic.
pub struct Walk<'a> {
    root: PathBuf,
    matcher: &'a Matcher,
    pending: Vec<PathBuf>,
    ready: VecDeque<Entry>,
    failed: bool,
}

/// Creates a [`Walk`] over `root`, filtering through `matcher`.
pub fn walk<'a>(root: &Path, matcher: &'a Matcher) -> Walk<'a> {
    Walk {
        root: root.to_path_buf(),
        matcher,
        pending: vec![root.to_path_buf()],
        ready: VecDeque::new(),
        failed: false,
    }
}

impl Walk<'_> {
    fn visit(&mut self, dir: &Path) -> Result<(), WalkError> {
        let reader = fs::read_dir(dir).map_err(|source| WalkError {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut children = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|source| WalkError {
                path: dir.to_path_buf(),
                source,
            })?;
            children.push(entry);
        }
        children.sort_by_key(|e| e.file_name());

        for child in children {
            let path = child.path();
            let file_type = child.file_type().map_err(|source| WalkError {
                path: path.clone(),
                source,
            })?;
            let rel = relative(&self.root, &path);

            if file_type.is_dir() {
                if self.matcher.is_ignored(&rel, true)
                    && !self.matcher.has_negated_descendant(&rel)
                {
                    trace!(dir = %path.display(), "pruned ignored directory");
                    continue;
                }
                self.pending.push(path);
            } else if !self.matcher.is_ignored(&rel, false) {
                self.ready.push_back(Entry { path, rel });
            }
        }
        Ok(())
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<Entry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(entry) = self.ready.pop_front() {
                return Some(Ok(entry));
            }
            let dir = self.pending.pop()?;
            if let Err(err) = self.visit(&dir) {
                self.failed = true;
                return Some(Err(err));
            }
        }
    }
}

fn relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
