//! Walks the directory convention and compiles every view and email.
//!
//! ```text
//! templates/
//! ├── app.html                  layout "app"
//! ├── views/app/dashboard.html  view key "app/dashboard.html"
//! ├── partials/nav.html         available to every view
//! ├── emails/welcome.html       email key "welcome.html"
//! └── translations/fr.json      language "fr"
//! ```
//!
//! Assembly is all or nothing: a missing layout root or view directory, an
//! unreadable file, or one malformed document fails the whole call and no
//! bundle is returned.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, info};

use super::analysis::Summary;
use super::bundle::Bundle;
use super::functions::{Functions, Namespace};
use super::unit::{CompiledUnit, Document};
use crate::error::ParseError;
use crate::file_loader::{self, FileRef, Presence, EMAILS_DIR, PARTIALS_DIR, VIEWS_DIR};
use crate::i18n::Catalog;
use crate::options::Options;
use crate::tree::FileTree;

/// Builds a [`Bundle`] from a file tree.
#[derive(Debug, Default)]
pub struct Assembler {
    options: Options,
    functions: Functions,
}

impl Assembler {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            functions: Functions::new(),
        }
    }

    /// Sets the caller's template functions.
    pub fn functions(mut self, functions: Functions) -> Self {
        self.functions = functions;
        self
    }

    /// Assembles a bundle that takes ownership of `tree`.
    pub fn assemble<T: FileTree + 'static>(self, tree: T) -> Result<Bundle, ParseError> {
        self.assemble_shared(Arc::new(tree))
    }

    /// Assembles a bundle from a tree that may be shared with other bundles.
    pub fn assemble_shared(self, tree: Arc<dyn FileTree>) -> Result<Bundle, ParseError> {
        let Self { options, functions } = self;
        options.validate()?;

        let fs = tree.as_ref();
        let root = options.root.as_str();

        let catalog = Arc::new(Catalog::load(fs, root)?);
        let namespace = Namespace::build(functions, Arc::clone(&catalog));

        let partial_refs = file_loader::list(fs, &[root, PARTIALS_DIR], Presence::Optional)?;
        let partials = load_all(fs, &partial_refs)?;

        let layouts = file_loader::list(fs, &[root], Presence::Required)?;

        let mut summary = options.static_analysis.then(Summary::new);
        let mut views = BTreeMap::new();
        let mut origins: HashMap<String, String> = HashMap::new();

        for layout_ref in &layouts {
            let layout = load(fs, layout_ref)?;
            let layout_view = layout_ref.stem();
            let view_refs =
                file_loader::list(fs, &[root, VIEWS_DIR, layout_view], Presence::Required)?;

            for view_ref in &view_refs {
                let key = file_loader::join(&[layout_view, view_ref.name.as_str()]);
                if let Some(first) = origins.get(&key) {
                    return Err(ParseError::DuplicateView {
                        key,
                        first: first.clone(),
                        second: layout_ref.path.clone(),
                    });
                }

                let view = load(fs, view_ref)?;
                let unit =
                    CompiledUnit::compose(&key, &layout, &view, &partials, &namespace, &options)?;

                if let Some(summary) = summary.as_mut() {
                    let sources: Vec<&str> = [&layout, &view]
                        .into_iter()
                        .chain(&partials)
                        .map(|doc| doc.source.as_str())
                        .collect();
                    summary.record(&unit, &sources, &namespace);
                }

                debug!(key = %key, layout = %layout_ref.path, "compiled view");
                origins.insert(key.clone(), layout_ref.path.clone());
                views.insert(key, unit);
            }
        }

        let mut emails = BTreeMap::new();
        for email_ref in file_loader::list(fs, &[root, EMAILS_DIR], Presence::Optional)? {
            let email = load(fs, &email_ref)?;
            let unit = CompiledUnit::standalone(&email, &namespace, &options)?;
            debug!(key = %email.name, "compiled email");
            emails.insert(email.name, unit);
        }

        if let (Some(summary), Some(path)) = (&summary, options.static_analysis_file.as_deref()) {
            summary.write(path)?;
            debug!(path = %path.display(), views = summary.len(), "wrote static analysis");
        }

        info!(
            root,
            layouts = layouts.len(),
            views = views.len(),
            partials = partials.len(),
            emails = emails.len(),
            languages = catalog.languages().count(),
            translations = catalog.len(),
            "templates assembled"
        );

        Ok(Bundle::new(views, emails, tree, catalog, options))
    }
}

/// Assembles `tree` with default options.
///
/// ```rust
/// use trellis::{EmbeddedTree, Functions};
///
/// let tree = EmbeddedTree::from_entries(&[
///     ("templates/app.html", "{% block content %}{% endblock %}"),
///     ("templates/views/app/index.html", "{% block content %}{{ motto() }}{% endblock %}"),
/// ]);
/// let bundle = trellis::parse(tree, Functions::new().add("motto", || "ship it")).unwrap();
/// assert_eq!(bundle.render_to_string("app/index.html", serde_json::json!({})).unwrap(), "ship it");
/// ```
pub fn parse<T: FileTree + 'static>(tree: T, functions: Functions) -> Result<Bundle, ParseError> {
    Assembler::new(Options::default())
        .functions(functions)
        .assemble(tree)
}

fn load(tree: &dyn FileTree, file: &FileRef) -> Result<Document, ParseError> {
    let source = file_loader::read(tree, file)?;
    Ok(Document::new(file.name.as_str(), file.path.as_str(), source))
}

fn load_all(tree: &dyn FileTree, files: &[FileRef]) -> Result<Vec<Document>, ParseError> {
    files.iter().map(|file| load(tree, file)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::EmbeddedTree;

    fn base() -> EmbeddedTree {
        EmbeddedTree::new()
            .with("templates/app.html", "<main>{% block content %}{% endblock %}</main>")
            .with("templates/views/app/one.html", "{% block content %}one{% endblock %}")
            .with("templates/views/app/two.html", "{% block content %}two{% endblock %}")
    }

    #[test]
    fn test_view_keys() {
        let bundle = Assembler::default().assemble(base()).unwrap();
        assert_eq!(
            bundle.view_keys().collect::<Vec<_>>(),
            ["app/one.html", "app/two.html"]
        );
        assert_eq!(bundle.email_keys().count(), 0);
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let tree = EmbeddedTree::new().with("elsewhere/app.html", "");
        let err = Assembler::default().assemble(tree).unwrap_err();
        assert!(matches!(err, ParseError::Config { ref path, .. } if path == "templates"));
    }

    #[test]
    fn test_missing_view_directory_is_config_error() {
        let tree = base().with("templates/admin.html", "{% block content %}{% endblock %}");
        let err = Assembler::default().assemble(tree).unwrap_err();
        assert!(matches!(err, ParseError::Config { ref path, .. } if path == "templates/views/admin"));
    }

    #[test]
    fn test_partial_shadowing_a_layout_is_rejected() {
        let tree = base().with("templates/partials/app.html", "PARTIAL");
        let err = Assembler::default().assemble(tree).unwrap_err();
        assert!(matches!(err, ParseError::ShadowedLayout { ref partial, .. }
            if partial == "templates/partials/app.html"));
    }

    #[test]
    fn test_colliding_layouts_are_rejected() {
        let tree = base().with("templates/app.txt", "{% block content %}{% endblock %}");
        let err = Assembler::default().assemble(tree).unwrap_err();
        match err {
            ParseError::DuplicateView { key, first, second } => {
                assert_eq!(key, "app/one.html");
                assert_eq!(first, "templates/app.html");
                assert_eq!(second, "templates/app.txt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_root() {
        let tree = EmbeddedTree::new()
            .with("site/app.html", "{% block content %}{% endblock %}")
            .with("site/views/app/x.html", "{% block content %}x{% endblock %}");
        let bundle = Assembler::new(Options::new().root("site"))
            .assemble(tree)
            .unwrap();
        assert_eq!(bundle.render_to_string("app/x.html", serde_json::json!({})).unwrap(), "x");
    }

    #[test]
    fn test_invalid_options_fail_before_reading() {
        let options = Options {
            static_analysis: true,
            ..Options::default()
        };
        let err = Assembler::new(options).assemble(base()).unwrap_err();
        assert!(matches!(err, ParseError::Options(_)));
    }

    #[test]
    fn test_shared_tree() {
        let tree: Arc<dyn FileTree> = Arc::new(base());
        let a = Assembler::default().assemble_shared(Arc::clone(&tree)).unwrap();
        let b = Assembler::default().assemble_shared(tree).unwrap();
        assert_eq!(a.view_keys().count(), b.view_keys().count());
    }
}
