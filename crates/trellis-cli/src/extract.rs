//! Finding translation keys in templates and Rust sources.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use syn::visit::{self, Visit};
use syn::{Expr, ExprCall, ExprLit, ExprMethodCall, Lit};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// `t(lang, "key")`, `tp(...)`, `tf(...)`, `tfp(...)` with a literal key.
static TEMPLATE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:tfp|tf|tp|t)\s*\(\s*[^,()]+?\s*,\s*(?:"([^"\\]*)"|'([^'\\]*)')"#)
        .expect("template call pattern compiles")
});

/// Catalog methods whose second argument is a translation key.
const TRANSLATE_FUNCTIONS: &[&str] = &[
    "translate",
    "translate_plural",
    "translate_format",
    "translate_format_plural",
];

/// Keys used by translation calls in one template source.
pub fn template_keys(source: &str) -> BTreeSet<String> {
    TEMPLATE_CALL
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Keys passed as string literals to the translate functions in one Rust
/// source file. Calls with a computed key are skipped with a warning.
pub fn source_keys(source: &str) -> syn::Result<BTreeSet<String>> {
    let file = syn::parse_file(source)?;
    let mut visitor = KeyVisitor::default();
    visitor.visit_file(&file);
    Ok(visitor.keys)
}

#[derive(Default)]
struct KeyVisitor {
    keys: BTreeSet<String>,
}

impl KeyVisitor {
    fn record(&mut self, function: &str, args: &[&Expr]) {
        if !TRANSLATE_FUNCTIONS.contains(&function) {
            return;
        }
        let Some(key) = args.get(1) else {
            return;
        };
        match key {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => {
                self.keys.insert(lit.value());
            }
            _ => warn!(function, "translation key is not a string literal, skipping"),
        }
    }
}

impl<'ast> Visit<'ast> for KeyVisitor {
    fn visit_expr_call(&mut self, call: &'ast ExprCall) {
        if let Expr::Path(path) = call.func.as_ref() {
            if let Some(segment) = path.path.segments.last() {
                let args: Vec<&Expr> = call.args.iter().collect();
                self.record(&segment.ident.to_string(), &args);
            }
        }
        visit::visit_expr_call(self, call);
    }

    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        let args: Vec<&Expr> = call.args.iter().collect();
        self.record(&call.method.to_string(), &args);
        visit::visit_expr_method_call(self, call);
    }
}

/// Files under `dir` whose extension is `ext`, sorted.
pub fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == ext) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Keys used by every `*.html` template under `root`.
pub fn scan_templates(root: &Path) -> Result<BTreeSet<String>> {
    let mut keys = BTreeSet::new();
    for path in files_with_extension(root, "html")? {
        let source =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let found = template_keys(&source);
        debug!(path = %path.display(), keys = found.len(), "scanned template");
        keys.extend(found);
    }
    Ok(keys)
}

/// Keys used by every `*.rs` file under `dir`. Files that don't parse are
/// skipped with a warning.
pub fn scan_sources(dir: &Path) -> Result<BTreeSet<String>> {
    let mut keys = BTreeSet::new();
    for path in files_with_extension(dir, "rs")? {
        let source =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        match source_keys(&source) {
            Ok(found) => keys.extend(found),
            Err(err) => warn!(path = %path.display(), error = %err, "cannot parse source, skipping"),
        }
    }
    Ok(keys)
}
