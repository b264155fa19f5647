//! # Trellis - Convention-Driven HTML Templates
//!
//! `trellis` assembles a directory of [minijinja] templates into an immutable
//! bundle of ready-to-render views, following a fixed layout:
//!
//! ```text
//! templates/
//! ├── app.html              a layout
//! ├── views/app/*.html      views rendered inside app.html
//! ├── partials/*.html       shared by every view
//! ├── emails/*.html         standalone documents
//! └── translations/*.json   one file per language
//! ```
//!
//! Every view is compiled together with its layout and all partials, and is
//! looked up by `"<layout>/<view file name>"`. Templates can call translation,
//! locale formatting and helper functions out of the box.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis::{Assembler, EmbeddedTree, Functions, Options};
//! use serde_json::json;
//!
//! let tree = EmbeddedTree::from_entries(&[
//!     ("templates/app.html", "<body>{% block content %}{% endblock %}{% include \"footer.html\" %}</body>"),
//!     ("templates/views/app/home.html", "{% block content %}<h1>{{ t(lang, \"hello\") }}</h1>{% endblock %}"),
//!     ("templates/partials/footer.html", "<footer>{{ year() }}</footer>"),
//!     ("templates/translations/fr.json", r#"[{"key": "hello", "value": "Bonjour"}]"#),
//! ]);
//!
//! let bundle = Assembler::new(Options::default())
//!     .functions(Functions::new().add("year", || 2024))
//!     .assemble(tree)
//!     .unwrap();
//!
//! let html = bundle.render_to_string("app/home.html", json!({ "lang": "fr" })).unwrap();
//! assert_eq!(html, "<body><h1>Bonjour</h1><footer>2024</footer></body>");
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: where templates are read from ([`DiskTree`], [`EmbeddedTree`])
//! - [`template`]: assembly, compiled units and the function namespace
//! - [`i18n`]: translation catalog and locale formatting
//! - [`helpers`]: the generic helpers exposed to templates
//! - [`page`]: a conventional payload for views
//!
//! [minijinja]: https://docs.rs/minijinja

pub mod error;
pub mod file_loader;
pub mod helpers;
pub mod i18n;
pub mod options;
pub mod page;
pub mod template;
pub mod tree;

pub use error::{ParseError, RenderError};
pub use helpers::HelperError;
pub use i18n::{Catalog, Message};
pub use options::Options;
pub use page::{Markup, Notification, PageData};
pub use template::{parse, Assembler, Bundle, CompiledUnit, Functions};
pub use tree::{DiskTree, EmbeddedTree, FileTree, TreeEntry};

// Re-export so callers can build values without depending on minijinja.
pub use minijinja::Value;
