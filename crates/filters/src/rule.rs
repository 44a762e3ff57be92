// crates/filters/src/rule.rs
use regex::{Regex, RegexBuilder};

/// One compiled ignore rule.
///
/// Rules are immutable once parsed; a [`Matcher`](crate::Matcher) never
/// mutates a rule after construction.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    anchored: bool,
    dir_only: bool,
    negated: bool,
    has_wildcard: bool,
    regex: Regex,
}

impl Rule {
    /// Parses one line of an ignore file. Returns `None` for blank lines,
    /// comments and lines that are empty after stripping their markers.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let (negated, rest) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (anchored, rest) = match rest.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let (dir_only, rest) = match rest.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        if rest.trim().is_empty() {
            return None;
        }

        let body = rest.replace('\\', "/");
        let has_wildcard = body.contains('*') || body.contains('?');
        let regex = compile(&body, anchored, dir_only).ok()?;
        let pattern = if dir_only { format!("{body}/") } else { body };

        Some(Rule {
            pattern,
            anchored,
            dir_only,
            negated,
            has_wildcard,
            regex,
        })
    }

    /// Normalized pattern text; keeps the trailing slash of directory-only
    /// rules so prefix checks can tell `vendor/` from a file rule `vendor`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn anchored(&self) -> bool {
        self.anchored
    }

    pub fn dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    /// Tests a normalized, forward-slash relative path. Directories are
    /// tested both bare and with a trailing slash so directory-only rules
    /// match the directory itself as well as everything beneath it.
    pub fn is_match(&self, path: &str, is_dir: bool) -> bool {
        let candidate = path.trim_end_matches('/');
        if self.regex.is_match(candidate) {
            return true;
        }
        is_dir && self.regex.is_match(&format!("{candidate}/"))
    }
}

fn compile(pattern: &str, anchored: bool, dir_only: bool) -> Result<Regex, regex::Error> {
    let mut re = String::new();
    re.push_str(if anchored { "^" } else { "(?:^|.*/)" });

    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        // `**/` spans zero or more whole segments.
                        chars.next();
                        re.push_str("(?:.*/)?");
                    } else {
                        re.push_str(".*");
                    }
                } else {
                    re.push_str("[^/]*");
                }
            }
            '?' => re.push_str("[^/]"),
            '/' => re.push('/'),
            _ => re.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
    }

    if dir_only {
        // Requires the separator: `vendor/` must match the directory and
        // its contents but never a plain file named `vendor`.
        re.push_str("/.*");
    }
    re.push('$');

    RegexBuilder::new(&re).case_insensitive(true).build()
}
