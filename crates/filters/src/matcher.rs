// crates/filters/src/matcher.rs
use crate::rule::Rule;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Name of the per-project ignore file read from the packaging root.
pub const IGNORE_FILE: &str = ".gitignore";

/// An ordered rule set: ignore-file rules first, built-in defaults after.
/// Evaluation walks every rule in that order and lets the last match win.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    rules: Vec<Rule>,
}

impl Matcher {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compiles an ordered sequence of raw pattern lines, dropping blanks
    /// and comments.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::new(lines.into_iter().filter_map(Rule::parse).collect())
    }

    /// Reads `<root>/.gitignore` when present, then appends the built-in
    /// `defaults`. Rebuilt fresh for every packaging call, so edits to the
    /// ignore file are always picked up.
    pub fn load(root: &Path, defaults: &[&str]) -> io::Result<Self> {
        let mut rules = Vec::new();
        let path = root.join(IGNORE_FILE);
        if path.exists() {
            let text = fs::read_to_string(&path)?;
            rules.extend(text.lines().filter_map(Rule::parse));
        }
        rules.extend(defaults.iter().filter_map(|p| Rule::parse(p)));
        debug!(rules = rules.len(), root = %root.display(), "loaded ignore rules");
        Ok(Self::new(rules))
    }

    /// Last-match-wins decision over the whole rule sequence; a path no
    /// rule matches is kept.
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        let normalized = normalize(path);
        if normalized.is_empty() {
            return false;
        }

        let mut ignored = false;
        for rule in &self.rules {
            if rule.is_match(&normalized, is_dir) {
                ignored = !rule.negated();
            }
        }
        ignored
    }

    /// Conservative check used to avoid over-pruning: does any negated rule
    /// possibly target something beneath `dir`? Wildcard negations cannot
    /// be ruled out without descending, so they always answer true. False
    /// positives only cost an extra descent, never a lost file.
    pub fn has_negated_descendant(&self, dir: &str) -> bool {
        let normalized = normalize(dir);
        let prefix = if normalized.is_empty() {
            String::new()
        } else if normalized.ends_with('/') {
            normalized.to_lowercase()
        } else {
            format!("{normalized}/").to_lowercase()
        };

        for rule in self.rules.iter().filter(|r| r.negated()) {
            if rule.has_wildcard() {
                return true;
            }
            // Case-insensitive like rule matching itself; a negation
            // written `!vendor/keep.txt` must still force a descent into
            // an on-disk `Vendor` directory.
            if !prefix.is_empty() && rule.pattern().to_lowercase().starts_with(prefix.as_str()) {
                return true;
            }
        }
        false
    }
}

fn normalize(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let stripped = replaced.strip_prefix("./").unwrap_or(&replaced);
    stripped.trim_start_matches('/').to_string()
}
