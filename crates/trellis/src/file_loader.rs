//! Directory listing under the template root.
//!
//! Every convention directory (the layout root, `views/<layout>`, `partials`,
//! `emails`, `translations`) is listed through [`list`], which returns the
//! direct, non-directory children as [`FileRef`]s. Sub-directories are skipped
//! silently; there is no recursion.
//!
//! # Missing directories
//!
//! | Directory | When missing |
//! |-----------|--------------|
//! | template root, `views/<layout>` | [`ParseError::Config`] |
//! | `partials` | falls back to the legacy `_partials` name, with a warning |
//! | `_partials` | warning, empty listing |
//! | anything listed as [`Presence::Optional`] | warning, empty listing |

use std::io;

use tracing::warn;

use crate::error::ParseError;
use crate::tree::FileTree;

/// Directory holding the views of every layout, one sub-directory per layout.
pub const VIEWS_DIR: &str = "views";
/// Directory of partials shared by all views.
pub const PARTIALS_DIR: &str = "partials";
/// Obsolete name of [`PARTIALS_DIR`], still honoured.
pub const LEGACY_PARTIALS_DIR: &str = "_partials";
/// Directory of standalone email templates.
pub const EMAILS_DIR: &str = "emails";
/// Directory of per-language translation files.
pub const TRANSLATIONS_DIR: &str = "translations";
/// Directory of auxiliary data files, see [`Bundle::data_content`](crate::Bundle::data_content).
pub const DATA_DIR: &str = "data";

/// A file discovered while listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Base file name including extension, e.g. `dashboard.html`.
    pub name: String,
    /// Path from the root of the file tree, e.g. `templates/views/app/dashboard.html`.
    pub path: String,
}

impl FileRef {
    /// The file name with its last extension removed.
    pub fn stem(&self) -> &str {
        strip_extension(&self.name)
    }
}

/// Whether a missing directory aborts the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Joins path segments with `/`, ignoring empty segments and stray slashes.
pub fn join(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Removes the last extension of a file name: `app.html` becomes `app`.
///
/// Dot-files such as `.hidden` are returned unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Lists the files directly under the directory named by `segments`.
///
/// See the [module documentation](self) for how missing directories are handled.
pub fn list(
    tree: &dyn FileTree,
    segments: &[&str],
    presence: Presence,
) -> Result<Vec<FileRef>, ParseError> {
    let dir = join(segments);

    if !tree.exists(&dir) {
        return match segments.last().copied() {
            Some(PARTIALS_DIR) => {
                warn!(
                    path = %dir,
                    "`partials` directory not found, falling back to the obsolete `_partials` name"
                );
                let mut legacy = segments.to_vec();
                if let Some(last) = legacy.last_mut() {
                    *last = LEGACY_PARTIALS_DIR;
                }
                list(tree, &legacy, presence)
            }
            Some(LEGACY_PARTIALS_DIR) => {
                warn!("no `partials` directory found, views will not have any partials");
                Ok(Vec::new())
            }
            _ => match presence {
                Presence::Required => Err(ParseError::Config {
                    path: dir,
                    source: io::Error::new(io::ErrorKind::NotFound, "directory not found"),
                }),
                Presence::Optional => {
                    warn!(path = %dir, "optional directory not found, skipping");
                    Ok(Vec::new())
                }
            },
        };
    }

    let entries = tree.read_dir(&dir).map_err(|source| match presence {
        Presence::Required => ParseError::Config {
            path: dir.clone(),
            source,
        },
        Presence::Optional => ParseError::Io {
            path: dir.clone(),
            source,
        },
    })?;

    Ok(entries
        .into_iter()
        .filter(|entry| !entry.is_dir)
        .map(|entry| FileRef {
            path: join(&[dir.as_str(), entry.name.as_str()]),
            name: entry.name,
        })
        .collect())
}

/// Reads the content of a listed file.
pub fn read(tree: &dyn FileTree, file: &FileRef) -> Result<String, ParseError> {
    tree.read_file(&file.path).map_err(|source| ParseError::Io {
        path: file.path.clone(),
        source,
    })
}
