//! Error types for parsing template trees and rendering views.
//!
//! Two families exist, matching the two phases of the crate:
//!
//! - [`ParseError`]: raised while assembling a [`Bundle`](crate::Bundle). Every
//!   variant is fatal; no partially built bundle is ever returned.
//! - [`RenderError`]: raised by a single render call. The bundle stays usable.

use std::io;
use std::path::PathBuf;

/// Error type for the assembly phase.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A directory the convention requires (the template root, or the view
    /// directory of a declared layout) is missing or unreadable.
    #[error("required directory \"{path}\" cannot be read: {source}")]
    Config {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A file inside the template tree could not be read.
    #[error("failed to read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A template document failed to compile.
    #[error("failed to compile template \"{path}\": {source}")]
    Template {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    /// A translation file is not a JSON array of translation records.
    #[error("invalid translation file \"{path}\": {source}")]
    Translation {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Two layouts resolve to the same view directory, so their views would
    /// share keys.
    #[error("view \"{key}\" is produced by both layout \"{first}\" and layout \"{second}\"")]
    DuplicateView {
        key: String,
        first: String,
        second: String,
    },

    /// A partial has the same file name as a layout it would be compiled
    /// next to, and would replace it.
    #[error("partial \"{partial}\" has the same name as layout \"{layout}\"")]
    ShadowedLayout { layout: String, partial: String },

    /// The static analysis summary could not be written.
    #[error("failed to write static analysis file \"{}\": {source}", path.display())]
    StaticAnalysis {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The supplied [`Options`](crate::Options) are inconsistent.
    #[error("invalid options: {0}")]
    Options(String),
}

impl ParseError {
    /// Returns the tree path the error refers to, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ParseError::Config { path, .. }
            | ParseError::Io { path, .. }
            | ParseError::Template { path, .. }
            | ParseError::Translation { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Error type for a single render call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No view is registered under the requested key.
    #[error("can't find view: {0}")]
    ViewNotFound(String),

    /// No email is registered under the requested key.
    #[error("can't find email: {0}")]
    EmailNotFound(String),

    /// The template engine failed while executing against the payload.
    #[error("failed to render \"{key}\": {source}")]
    Execution {
        key: String,
        #[source]
        source: minijinja::Error,
    },
}

impl RenderError {
    /// True for the not-found variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RenderError::ViewNotFound(_) | RenderError::EmailNotFound(_)
        )
    }
}
