//! Compiled, directly executable template units.

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use minijinja::{Environment, UndefinedBehavior};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::functions::Namespace;
use crate::error::ParseError;
use crate::options::Options;

static EXTENDS_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{%-?\s*extends\b").expect("extends pattern compiles"));

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{#.*?#\}").expect("comment pattern compiles"));

/// Whether `source` declares its own parent template. Comments are ignored.
fn declares_extends(source: &str) -> bool {
    EXTENDS_TAG.is_match(&COMMENT.replace_all(source, ""))
}

/// A template source read from the file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Base file name, e.g. `nav.html`.
    pub name: String,
    /// Path inside the file tree, used in error messages.
    pub path: String,
    pub source: String,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            source: source.into(),
        }
    }
}

/// One executable template: a view composed with its layout and every
/// partial, or a standalone email.
///
/// Each unit owns its own environment, so units never see each other's
/// documents. Rendering borrows the unit immutably and can run concurrently.
pub struct CompiledUnit {
    env: Environment<'static>,
    entry: String,
    documents: Vec<String>,
}

impl CompiledUnit {
    /// Composes `view` with `layout` and `partials` under `key`.
    ///
    /// The view is registered as extending the layout unless it already
    /// declares its own `{% extends %}`. The header is prepended on the view's
    /// first line so reported line numbers still match the file.
    ///
    /// A partial named like the layout is rejected, since it would replace it.
    pub fn compose(
        key: &str,
        layout: &Document,
        view: &Document,
        partials: &[Document],
        namespace: &Namespace,
        options: &Options,
    ) -> Result<Self, ParseError> {
        if let Some(partial) = partials.iter().find(|p| p.name == layout.name) {
            return Err(ParseError::ShadowedLayout {
                layout: layout.path.clone(),
                partial: partial.path.clone(),
            });
        }

        let mut unit = Self::empty(key, namespace, options);

        unit.add(layout.name.clone(), layout.source.clone(), &layout.path)?;

        let view_source = if declares_extends(&view.source) {
            view.source.clone()
        } else {
            format!(r#"{{% extends "{}" %}}{}"#, layout.name, view.source)
        };
        unit.add(key.to_string(), view_source, &view.path)?;

        for partial in partials {
            unit.add(partial.name.clone(), partial.source.clone(), &partial.path)?;
        }

        Ok(unit)
    }

    /// Compiles a single document on its own, keyed by its file name.
    pub fn standalone(
        document: &Document,
        namespace: &Namespace,
        options: &Options,
    ) -> Result<Self, ParseError> {
        let mut unit = Self::empty(&document.name, namespace, options);
        unit.add(
            document.name.clone(),
            document.source.clone(),
            &document.path,
        )?;
        Ok(unit)
    }

    fn empty(entry: &str, namespace: &Namespace, options: &Options) -> Self {
        let mut env = Environment::new();
        if options.strict_undefined {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }
        namespace.install(&mut env);

        Self {
            env,
            entry: entry.to_string(),
            documents: Vec::new(),
        }
    }

    fn add(&mut self, name: String, source: String, path: &str) -> Result<(), ParseError> {
        self.env
            .add_template_owned(name.clone(), source)
            .map_err(|source| ParseError::Template {
                path: path.to_string(),
                source,
            })?;
        self.documents.push(name);
        Ok(())
    }

    /// Key the unit is rendered by.
    pub fn key(&self) -> &str {
        &self.entry
    }

    /// Names of the documents compiled into this unit, entry included.
    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(String::as_str)
    }

    /// Executes the unit against `ctx`, streaming output into `out`.
    pub fn render_to<S, W>(&self, ctx: S, out: W) -> Result<(), minijinja::Error>
    where
        S: Serialize,
        W: io::Write,
    {
        self.env
            .get_template(&self.entry)?
            .render_captured_to(ctx, out)?;
        Ok(())
    }

    /// Executes the unit against `ctx` and returns the output.
    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(&self.entry)?.render(ctx)
    }

    /// Variables referenced by any document of the unit without being
    /// defined there. Attribute paths are included (`user.name`).
    pub fn referenced_variables(&self) -> BTreeSet<String> {
        self.documents
            .iter()
            .filter_map(|name| self.env.get_template(name).ok())
            .flat_map(|template| template.undeclared_variables(true))
            .collect()
    }
}

impl fmt::Debug for CompiledUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledUnit")
            .field("entry", &self.entry)
            .field("documents", &self.documents)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Catalog;
    use crate::template::functions::Functions;
    use minijinja::context;
    use std::sync::Arc;

    fn namespace() -> Namespace {
        Namespace::build(Functions::new(), Arc::new(Catalog::new()))
    }

    fn layout() -> Document {
        Document::new(
            "app.html",
            "templates/app.html",
            "<main>{% block content %}{% endblock %}</main>{% include \"nav.html\" %}",
        )
    }

    fn nav() -> Document {
        Document::new("nav.html", "templates/partials/nav.html", "<nav>{{ title }}</nav>")
    }

    #[test]
    fn test_compose_injects_extends() {
        let view = Document::new(
            "home.html",
            "templates/views/app/home.html",
            "{% block content %}Hello {{ name }}{% endblock %}",
        );
        let unit = CompiledUnit::compose(
            "app/home.html",
            &layout(),
            &view,
            &[nav()],
            &namespace(),
            &Options::default(),
        )
        .unwrap();

        assert_eq!(unit.key(), "app/home.html");
        assert_eq!(
            unit.documents().collect::<Vec<_>>(),
            ["app.html", "app/home.html", "nav.html"]
        );
        let out = unit.render(context! { name => "Ana", title => "T" }).unwrap();
        assert_eq!(out, "<main>Hello Ana</main><nav>T</nav>");
    }

    #[test]
    fn test_explicit_extends_is_kept() {
        let base = Document::new("base.html", "templates/partials/base.html", "[{% block content %}{% endblock %}]");
        let view = Document::new(
            "own.html",
            "templates/views/app/own.html",
            "{% extends \"base.html\" %}{% block content %}own{% endblock %}",
        );
        let unit = CompiledUnit::compose(
            "app/own.html",
            &layout(),
            &view,
            &[base],
            &namespace(),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(unit.render(context! {}).unwrap(), "[own]");
    }

    #[test]
    fn test_explicit_extends_after_comment_or_set() {
        let base = Document::new("base.html", "templates/partials/base.html", "[{% block content %}{% endblock %}]");
        for source in [
            "{# note #}{% extends \"base.html\" %}{% block content %}x{% endblock %}",
            "{% set label = \"x\" %}{% extends \"base.html\" %}{% block content %}x{% endblock %}",
        ] {
            let view = Document::new("own.html", "templates/views/app/own.html", source);
            let unit = CompiledUnit::compose(
                "app/own.html",
                &layout(),
                &view,
                &[base.clone()],
                &namespace(),
                &Options::default(),
            )
            .unwrap();
            assert_eq!(unit.render(context! {}).unwrap(), "[x]");
        }
    }

    #[test]
    fn test_extends_inside_comment_is_ignored() {
        let view = Document::new(
            "home.html",
            "templates/views/app/home.html",
            "{# {% extends \"other.html\" %} #}{% block content %}home{% endblock %}",
        );
        let unit = CompiledUnit::compose(
            "app/home.html",
            &layout(),
            &view,
            &[nav()],
            &namespace(),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(unit.render(context! { title => "T" }).unwrap(), "<main>home</main><nav>T</nav>");
    }

    #[test]
    fn test_partial_named_like_layout_is_rejected() {
        let shadow = Document::new("app.html", "templates/partials/app.html", "PARTIAL");
        let view = Document::new(
            "home.html",
            "templates/views/app/home.html",
            "{% block content %}x{% endblock %}",
        );
        let err = CompiledUnit::compose(
            "app/home.html",
            &layout(),
            &view,
            &[nav(), shadow],
            &namespace(),
            &Options::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ParseError::ShadowedLayout { ref layout, ref partial }
                if layout == "templates/app.html" && partial == "templates/partials/app.html"
        ));
    }

    #[test]
    fn test_syntax_error_names_the_document() {
        let broken = Document::new("bad.html", "templates/partials/bad.html", "{% if %}");
        let view = Document::new("v.html", "templates/views/app/v.html", "");
        let err = CompiledUnit::compose(
            "app/v.html",
            &layout(),
            &view,
            &[broken],
            &namespace(),
            &Options::default(),
        )
        .unwrap_err();
        assert_eq!(err.path(), Some("templates/partials/bad.html"));
    }

    #[test]
    fn test_standalone_email() {
        let email = Document::new("welcome.txt", "templates/emails/welcome.txt", "Hi {{ name }} & co");
        let unit = CompiledUnit::standalone(&email, &namespace(), &Options::default()).unwrap();
        assert_eq!(unit.key(), "welcome.txt");
        assert_eq!(unit.render(context! { name => "Bo" }).unwrap(), "Hi Bo & co");
    }

    #[test]
    fn test_strict_undefined() {
        let email = Document::new("e.txt", "templates/emails/e.txt", "Hi {{ name }}");
        let lenient = CompiledUnit::standalone(&email, &namespace(), &Options::default()).unwrap();
        assert_eq!(lenient.render(context! {}).unwrap(), "Hi ");

        let strict = CompiledUnit::standalone(
            &email,
            &namespace(),
            &Options::default().strict_undefined(true),
        )
        .unwrap();
        assert!(strict.render(context! {}).is_err());
    }

    #[test]
    fn test_render_to_writer() {
        let email = Document::new("e.txt", "templates/emails/e.txt", "{{ n }}!");
        let unit = CompiledUnit::standalone(&email, &namespace(), &Options::default()).unwrap();
        let mut buf = Vec::new();
        unit.render_to(context! { n => 7 }, &mut buf).unwrap();
        assert_eq!(buf, b"7!");
    }

    #[test]
    fn test_referenced_variables_spans_documents() {
        let view = Document::new(
            "v.html",
            "templates/views/app/v.html",
            "{% block content %}{{ user.name }}{% endblock %}",
        );
        let unit = CompiledUnit::compose(
            "app/v.html",
            &layout(),
            &view,
            &[nav()],
            &namespace(),
            &Options::default(),
        )
        .unwrap();
        let vars = unit.referenced_variables();
        assert!(vars.contains("user.name"));
        assert!(vars.contains("title"));
    }
}
