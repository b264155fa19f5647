//! Read-only file trees that templates are loaded from.
//!
//! The assembler never touches the filesystem directly. It reads through the
//! [`FileTree`] trait, which has two implementations:
//!
//! - [`DiskTree`]: a directory on disk. Convenient during development, where
//!   edits to templates should be picked up by re-parsing.
//! - [`EmbeddedTree`]: an in-memory map of `(path, content)` entries. Used for
//!   single-binary deployment, typically fed with `include_str!`, and in tests.
//!
//! Paths are always `/`-separated and relative to the root of the tree, e.g.
//! `templates/views/app/dashboard.html`.
//!
//! ```rust
//! use trellis::{EmbeddedTree, FileTree};
//!
//! let tree = EmbeddedTree::from_entries(&[
//!     ("templates/app.html", "<main>{% block content %}{% endblock %}</main>"),
//!     ("templates/views/app/home.html", "{% block content %}home{% endblock %}"),
//! ]);
//!
//! let names: Vec<_> = tree
//!     .read_dir("templates")
//!     .unwrap()
//!     .into_iter()
//!     .map(|e| e.name)
//!     .collect();
//! assert_eq!(names, ["app.html", "views"]);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A direct child of a directory in a [`FileTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Base name of the entry, including any extension.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl TreeEntry {
    fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// A read-only tree of template files.
///
/// Implementations must return directory listings sorted by entry name.
pub trait FileTree: Send + Sync {
    /// Lists the direct children of `path`.
    fn read_dir(&self, path: &str) -> io::Result<Vec<TreeEntry>>;

    /// Reads the file at `path` as UTF-8 text.
    fn read_file(&self, path: &str) -> io::Result<String>;

    /// Returns whether a file or directory exists at `path`.
    fn exists(&self, path: &str) -> bool;
}

/// A [`FileTree`] backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskTree {
    root: PathBuf,
}

impl DiskTree {
    /// Creates a tree rooted at `root`. Nothing is read until the tree is used.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this tree is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let relative = normalize(path);
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

impl FileTree for DiskTree {
    fn read_dir(&self, path: &str) -> io::Result<Vec<TreeEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_dir() {
                entries.push(TreeEntry::dir(name));
            } else {
                entries.push(TreeEntry::file(name));
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }
}

/// A [`FileTree`] held entirely in memory.
///
/// Directories are implied by the paths of the files they contain; an empty
/// directory cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedTree {
    files: BTreeMap<String, String>,
}

impl EmbeddedTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from `(path, content)` pairs, typically baked into the
    /// binary with `include_str!`.
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        let mut tree = Self::new();
        for (path, content) in entries {
            tree.insert(*path, *content);
        }
        tree
    }

    /// Adds or replaces the file at `path`.
    pub fn insert(&mut self, path: impl AsRef<str>, content: impl Into<String>) -> &mut Self {
        self.files
            .insert(normalize(path.as_ref()).to_string(), content.into());
        self
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, path: impl AsRef<str>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Number of files in the tree.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the tree holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileTree for EmbeddedTree {
    fn read_dir(&self, path: &str) -> io::Result<Vec<TreeEntry>> {
        let dir = normalize(path);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        // name -> is_dir; a name seen as both keeps the directory flag
        let mut children: BTreeMap<&str, bool> = BTreeMap::new();
        for file in self.files.keys() {
            let Some(rest) = file.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    children.insert(child, true);
                }
                None => {
                    children.entry(rest).or_insert(false);
                }
            }
        }

        if children.is_empty() && !dir.is_empty() {
            return Err(not_found(dir));
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| {
                if is_dir {
                    TreeEntry::dir(name)
                } else {
                    TreeEntry::file(name)
                }
            })
            .collect())
    }

    fn read_file(&self, path: &str) -> io::Result<String> {
        let path = normalize(path);
        self.files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn exists(&self, path: &str) -> bool {
        let path = normalize(path);
        if path.is_empty() {
            return !self.files.is_empty();
        }
        if self.files.contains_key(path) {
            return true;
        }
        let prefix = format!("{path}/");
        self.files.keys().any(|file| file.starts_with(&prefix))
    }
}

fn normalize(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.trim_matches('/')
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{path}: no such file or directory"))
}
