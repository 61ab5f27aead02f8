//! Include/exclude path filtering.
//!
//! Paths are compared relative to the component's source root, with `/`
//! separators. A pattern matches when its glob form matches the whole path
//! or when the pattern text occurs anywhere in the path. Glob syntax:
//!
//! - `**` matches any run of characters, `/` included
//! - `*` matches within one path segment
//! - `?` matches one character other than `/`
//!
//! Any other character is taken as a regular-expression atom (`.` is
//! escaped). A pattern that does not compile falls back to substring
//! matching alone.

use std::path::{Component, Path};

use regex::Regex;
use scaffolder_model::{FilterMode, PathFilters};
use tracing::debug;

/// A compiled include or exclude pattern.
#[derive(Debug, Clone)]
struct Pattern {
    raw: String,
    normalized: String,
    glob: Option<Regex>,
}

impl Pattern {
    fn new(raw: &str) -> Self {
        let normalized = raw.replace('\\', "/");
        let glob = match Regex::new(&glob_to_regex(&normalized)) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!(pattern = raw, error = %e, "glob did not compile, using substring match");
                None
            }
        };
        Self {
            raw: raw.to_string(),
            normalized,
            glob,
        }
    }

    fn matches(&self, path: &str) -> bool {
        let glob = match &self.glob {
            Some(re) => re.is_match(path),
            None => path.contains(&self.normalized),
        };
        glob || path.contains(&self.raw)
    }
}

/// Translate a glob into an anchored regular expression.
fn glob_to_regex(glob: &str) -> String {
    let mut re = String::with_capacity(glob.len() + 8);
    re.push_str("^(?:");
    let mut chars = glob.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                re.push_str(".*");
            }
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '.' => re.push_str("\\."),
            other => re.push(other),
        }
    }
    re.push_str(")$");
    re
}

/// Forward-slash form of `path` relative to `base`.
///
/// A path outside `base` is reached through `..` segments from `base`. A
/// relative path under an absolute base (or the reverse) has no common
/// anchor and is used as given.
fn relative_path(path: &Path, base: &Path) -> String {
    let parts: Vec<String> = match path.strip_prefix(base) {
        Ok(rel) => segments(rel),
        Err(_) if path.is_absolute() == base.is_absolute() => {
            let path = segments(path);
            let base = segments(base);
            let common = path.iter().zip(&base).take_while(|(p, b)| p == b).count();
            std::iter::repeat("..".to_string())
                .take(base.len() - common)
                .chain(path[common..].iter().cloned())
                .collect()
        }
        Err(_) => segments(path),
    };
    if parts.len() == 1 && parts[0].is_empty() {
        return "/".to_string();
    }
    parts.join("/")
}

fn segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            Component::RootDir => Some(String::new()),
            Component::ParentDir => Some("..".to_string()),
            Component::Prefix(p) => Some(p.as_os_str().to_string_lossy().into_owned()),
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        })
        .collect()
}

/// Decides which paths of a source tree belong to a component.
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    mode: FilterMode,
}

impl PathFilter {
    /// Compile the patterns of `filters`, using the mode they carry.
    pub fn new(filters: &PathFilters) -> Self {
        Self::with_mode(filters, filters.filter_mode)
    }

    /// Compile the patterns of `filters` under an explicitly chosen mode.
    pub fn with_mode(filters: &PathFilters, mode: FilterMode) -> Self {
        Self {
            include: filters.include_paths.iter().map(|p| Pattern::new(p)).collect(),
            exclude: filters.exclude_paths.iter().map(|p| Pattern::new(p)).collect(),
            mode,
        }
    }

    /// Whether `path`, found under `base`, is kept.
    pub fn should_include(&self, path: &Path, base: &Path) -> bool {
        self.should_include_relative(&relative_path(path, base))
    }

    /// Whether a path already relative to the source root is kept.
    pub fn should_include_relative(&self, rel: &str) -> bool {
        if rel.is_empty() || rel == "." {
            return true;
        }
        let included = self.include.iter().any(|p| p.matches(rel));
        let excluded = self.exclude.iter().any(|p| p.matches(rel));
        match self.mode {
            FilterMode::IncludeFirst => (self.include.is_empty() || included) && !excluded,
            FilterMode::ExcludeFirst => !excluded || included,
        }
    }
}

/// Whether the extension of `path` is one of `patterns`.
///
/// A pattern is either a wildcard (`*.c`) or a bare or dotted extension
/// (`c`, `.c`). A path without an extension never matches.
pub fn matches_extension<S: AsRef<str>>(path: &Path, patterns: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = format!(".{ext}");
    patterns.iter().map(AsRef::as_ref).any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix('*') {
            suffix == ext
        } else if pattern.is_empty() {
            false
        } else if pattern.starts_with('.') {
            pattern == ext
        } else {
            ext[1..] == *pattern
        }
    })
}
