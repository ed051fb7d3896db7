//! Read-only repository snapshot handed to every check
//!
//! All file access from checks goes through here so ignored paths stay
//! invisible and every read or walk is bounded.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Largest prefix of a file any check will read
pub const MAX_READ_BYTES: u64 = 1024 * 1024;

/// Files considered by [`RepoSnapshot::glob`] before pattern matching
const MAX_GLOB_CANDIDATES: usize = 10_000;

/// Manifests consulted by [`RepoSnapshot::dependency_present`]
const DEPENDENCY_FILES: &[&str] = &[
    "pyproject.toml",
    "requirements.txt",
    "requirements-dev.txt",
    "Pipfile",
    "package.json",
    "Cargo.toml",
    "go.mod",
    "Gemfile",
];

/// Compiled set of ignored path globs, matched against repo-relative paths
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    set: Option<Arc<GlobSet>>,
    patterns: Vec<String>,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, globset::Error> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        Ok(Self {
            set: Some(Arc::new(builder.build()?)),
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
        })
    }

    /// True if the path or any of its parent directories matches
    pub fn is_match(&self, relative: &Path) -> bool {
        let Some(set) = &self.set else {
            return false;
        };
        relative
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .any(|p| set.is_match(p))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }
}

/// Cheap-to-clone handle on a repository checkout
#[derive(Debug, Clone)]
pub struct RepoSnapshot {
    root: PathBuf,
    filter: PathFilter,
}

impl RepoSnapshot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: PathFilter::default(),
        }
    }

    /// Same checkout, seen through an ignored-path filter
    pub fn with_filter(&self, filter: PathFilter) -> Self {
        Self {
            root: self.root.clone(),
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name of the checkout
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.filter.is_match(relative)
    }

    /// Repo-relative display form of an absolute path
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    pub fn has_file(&self, relative: &str) -> bool {
        !self.is_ignored(Path::new(relative)) && self.root.join(relative).is_file()
    }

    pub fn has_dir(&self, relative: &str) -> bool {
        !self.is_ignored(Path::new(relative)) && self.root.join(relative).is_dir()
    }

    /// First candidate that exists as a file
    pub fn find_file<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.has_file(c))
    }

    /// First candidate that exists as a directory
    pub fn find_dir<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.has_dir(c))
    }

    /// Read a repo-relative file (lossy UTF-8, bounded)
    pub fn read(&self, relative: &str) -> Option<String> {
        if self.is_ignored(Path::new(relative)) {
            return None;
        }
        read_bounded(&self.root.join(relative))
    }

    /// Case-insensitive search; returns the first pattern found
    pub fn contains<'a>(&self, relative: &str, patterns: &[&'a str]) -> Option<&'a str> {
        let content = self.read(relative)?;
        first_match(&content, patterns)
    }

    /// [`Self::read`] for a path produced by [`Self::walk`] or [`Self::files_in`]
    pub fn read_path(&self, path: &Path) -> Option<String> {
        read_bounded(path)
    }

    /// [`Self::contains`] for a path produced by [`Self::walk`] or [`Self::files_in`]
    pub fn path_contains<'a>(&self, path: &Path, patterns: &[&'a str]) -> Option<&'a str> {
        let content = read_bounded(path)?;
        first_match(&content, patterns)
    }

    /// Names of the immediate children of a directory, sorted
    pub fn list_dir(&self, relative: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.root.join(relative)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| !self.is_ignored(&Path::new(relative).join(e.file_name())))
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Files directly inside a directory whose extension is listed
    pub fn files_in(&self, relative: &str, extensions: &[&str]) -> Vec<PathBuf> {
        self.list_dir(relative)
            .into_iter()
            .map(|name| self.root.join(relative).join(name))
            .filter(|p| p.is_file() && has_extension(p, extensions))
            .collect()
    }

    /// Source files under the root, honoring .gitignore and ignored paths.
    ///
    /// Hidden entries are skipped, order is stable (sorted by file name per
    /// directory) and the result holds at most `limit` files.
    pub fn walk(&self, extensions: &[&str], limit: usize) -> Vec<PathBuf> {
        self.walk_filtered(limit, |path| has_extension(path, extensions))
    }

    fn walk_all(&self, limit: usize) -> Vec<PathBuf> {
        self.walk_filtered(limit, |_| true)
    }

    fn walk_filtered(&self, limit: usize, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
        use ignore::WalkBuilder;

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut files = Vec::new();
        for entry in builder.build().filter_map(|e| e.ok()) {
            if files.len() >= limit {
                break;
            }
            let path = entry.path();
            if !path.is_file() || !keep(path) {
                continue;
            }
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if self.is_ignored(relative) {
                continue;
            }
            files.push(path.to_path_buf());
        }
        files
    }

    /// Files anywhere under the root whose repo-relative path matches a glob
    pub fn glob(&self, patterns: &[&str], limit: usize) -> Result<Vec<PathBuf>, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
        }
        let set = builder.build()?;
        Ok(self
            .walk_all(MAX_GLOB_CANDIDATES)
            .into_iter()
            .filter(|p| set.is_match(self.relative(p)))
            .take(limit)
            .collect())
    }

    /// A table nested under a dotted key of a TOML file, e.g. `tool.ruff`
    pub fn toml_section(&self, relative: &str, section: &str) -> Option<toml::Table> {
        let content = self.read(relative)?;
        let mut current: toml::Table = toml::from_str(&content).ok()?;
        for part in section.split('.') {
            match current.remove(part) {
                Some(toml::Value::Table(table)) => current = table,
                _ => return None,
            }
        }
        Some(current)
    }

    /// True when the root .gitignore ignores `relative` (a file)
    pub fn is_gitignored(&self, relative: &str) -> bool {
        let (gitignore, _) = ignore::gitignore::Gitignore::new(self.root.join(".gitignore"));
        gitignore
            .matched_path_or_any_parents(self.root.join(relative), false)
            .is_ignore()
    }

    /// First package name mentioned in any common dependency manifest
    pub fn dependency_present<'a>(&self, packages: &[&'a str]) -> Option<&'a str> {
        DEPENDENCY_FILES
            .iter()
            .find_map(|manifest| self.contains(manifest, packages))
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

fn read_bounded(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut bytes = Vec::new();
    file.take(MAX_READ_BYTES).read_to_end(&mut bytes).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn first_match<'a>(content: &str, patterns: &[&'a str]) -> Option<&'a str> {
    let haystack = content.to_lowercase();
    patterns
        .iter()
        .copied()
        .find(|p| haystack.contains(&p.to_lowercase()))
}
