//! The result of assembly: every compiled view and email, looked up by key.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use serde::Serialize;

use super::unit::CompiledUnit;
use crate::error::{ParseError, RenderError};
use crate::file_loader::{self, DATA_DIR};
use crate::i18n::Catalog;
use crate::options::Options;
use crate::tree::FileTree;

/// Immutable set of compiled views and emails.
///
/// A bundle is built once by [`Assembler`](crate::Assembler) and then only
/// read. It is `Send + Sync`, so it can be shared behind an `Arc` and rendered
/// from many threads at once. To pick up template changes, assemble a new
/// bundle and swap it in.
///
/// ```rust
/// use trellis::{Assembler, EmbeddedTree, Options};
/// use serde_json::json;
///
/// let tree = EmbeddedTree::from_entries(&[
///     ("templates/app.html", "<main>{% block content %}{% endblock %}</main>"),
///     ("templates/views/app/home.html", "{% block content %}Hi {{ name }}{% endblock %}"),
/// ]);
/// let bundle = Assembler::new(Options::default()).assemble(tree).unwrap();
///
/// let html = bundle.render_to_string("app/home.html", json!({ "name": "Ana" })).unwrap();
/// assert_eq!(html, "<main>Hi Ana</main>");
/// ```
pub struct Bundle {
    views: BTreeMap<String, CompiledUnit>,
    emails: BTreeMap<String, CompiledUnit>,
    tree: Arc<dyn FileTree>,
    catalog: Arc<Catalog>,
    options: Options,
}

impl Bundle {
    pub(crate) fn new(
        views: BTreeMap<String, CompiledUnit>,
        emails: BTreeMap<String, CompiledUnit>,
        tree: Arc<dyn FileTree>,
        catalog: Arc<Catalog>,
        options: Options,
    ) -> Self {
        Self {
            views,
            emails,
            tree,
            catalog,
            options,
        }
    }

    /// Renders the view registered under `key` into `out`.
    ///
    /// An unknown key fails before anything is written.
    pub fn render<S, W>(&self, key: &str, ctx: S, out: W) -> Result<(), RenderError>
    where
        S: Serialize,
        W: io::Write,
    {
        let unit = self
            .view(key)
            .ok_or_else(|| RenderError::ViewNotFound(key.to_string()))?;
        unit.render_to(ctx, out)
            .map_err(|source| execution(key, source))
    }

    /// Renders the email registered under `key` into `out`.
    pub fn render_email<S, W>(&self, key: &str, ctx: S, out: W) -> Result<(), RenderError>
    where
        S: Serialize,
        W: io::Write,
    {
        let unit = self
            .email(key)
            .ok_or_else(|| RenderError::EmailNotFound(key.to_string()))?;
        unit.render_to(ctx, out)
            .map_err(|source| execution(key, source))
    }

    /// Renders a view and returns the output.
    pub fn render_to_string<S: Serialize>(&self, key: &str, ctx: S) -> Result<String, RenderError> {
        let unit = self
            .view(key)
            .ok_or_else(|| RenderError::ViewNotFound(key.to_string()))?;
        unit.render(ctx).map_err(|source| execution(key, source))
    }

    /// Renders an email and returns the output.
    pub fn render_email_to_string<S: Serialize>(
        &self,
        key: &str,
        ctx: S,
    ) -> Result<String, RenderError> {
        let unit = self
            .email(key)
            .ok_or_else(|| RenderError::EmailNotFound(key.to_string()))?;
        unit.render(ctx).map_err(|source| execution(key, source))
    }

    pub fn view(&self, key: &str) -> Option<&CompiledUnit> {
        self.views.get(key)
    }

    pub fn email(&self, key: &str) -> Option<&CompiledUnit> {
        self.emails.get(key)
    }

    /// View keys, sorted.
    pub fn view_keys(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// Email keys, sorted.
    pub fn email_keys(&self) -> impl Iterator<Item = &str> {
        self.emails.keys().map(String::as_str)
    }

    /// The translations the bundle's templates use.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Options the bundle was assembled with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The file tree the bundle was assembled from.
    pub fn tree(&self) -> &dyn FileTree {
        self.tree.as_ref()
    }

    /// Reads `<root>/data/<filename>` from the bundle's file tree.
    pub fn data_content(&self, filename: &str) -> Result<String, ParseError> {
        let path = file_loader::join(&[self.options.root.as_str(), DATA_DIR, filename]);
        self.tree
            .read_file(&path)
            .map_err(|source| ParseError::Io { path, source })
    }
}

fn execution(key: &str, source: minijinja::Error) -> RenderError {
    RenderError::Execution {
        key: key.to_string(),
        source,
    }
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("views", &self.views.keys().collect::<Vec<_>>())
            .field("emails", &self.emails.keys().collect::<Vec<_>>())
            .field("translations", &self.catalog.len())
            .field("options", &self.options)
            .finish()
    }
}
