//! The function namespace shared by every compiled unit.
//!
//! A [`Namespace`] is built once per assembly from the translation catalog and
//! the caller's [`Functions`], then installed as globals into each unit's
//! environment.
//!
//! ## Built-ins
//!
//! - `t(lang, key)`, `tp(lang, key, count)`, `tf(lang, key, ...)`,
//!   `tfp(lang, key, count, ...)` - translation lookups
//! - `shortdate(locale, date)`, `currency(locale, amount)` - locale formatting
//! - `map(k, v, ...)`, `iterate(n)`, `xsrf(token)`, `strip(text, needle)`,
//!   `fallback(value, default)`, `filesize(bytes)`, `slugify(text)`,
//!   `thousands(n)`, `timeago(date)` - generic helpers
//!
//! ### Example
//!
//! ```jinja
//! <h1>{{ t(lang, "welcome") }}</h1>
//! <p>{{ tfp(lang, "%d new messages", count, count) }}</p>
//! <a href="/posts/{{ slugify(post.title) }}">{{ fallback(post.title, "untitled") }}</a>
//! {{ xsrf(xsrf_token) }}
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult, Rest};
use minijinja::{Environment, Error, ErrorKind, Value};
use tracing::warn;

use crate::helpers;
use crate::i18n::{self, Catalog};

/// Caller-supplied template functions.
///
/// Entries are installed after the built-ins, so a name that matches a
/// built-in replaces it.
///
/// ```rust
/// use trellis::Functions;
///
/// let functions = Functions::new()
///     .add("shout", |s: String| s.to_uppercase())
///     .add("double", |n: i64| n * 2);
/// assert_eq!(functions.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct Functions {
    entries: BTreeMap<String, Value>,
}

impl Functions {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function, using the same signatures minijinja accepts for
    /// `Environment::add_function`.
    pub fn add<F, Rv, Args>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.add_value(name, Value::from_function::<F, Rv, Args>(f))
    }

    /// Adds an arbitrary value as a global, e.g. a constant or a
    /// `Value::from_object` callable.
    pub fn add_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.entries.insert(name.into(), value);
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no functions were added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Functions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// The merged set of globals every compiled unit sees.
#[derive(Clone, Default)]
pub struct Namespace {
    entries: BTreeMap<String, Value>,
}

impl Namespace {
    /// Builds the namespace: built-ins bound to `catalog`, then `user`.
    pub fn build(user: Functions, catalog: Arc<Catalog>) -> Self {
        let mut namespace = Self::default();
        register_translation_functions(&mut namespace, catalog);
        register_locale_functions(&mut namespace);
        register_helpers(&mut namespace);

        for (name, value) in user.entries {
            if namespace.entries.contains_key(&name) {
                warn!(function = %name, "user function shadows a built-in");
            }
            namespace.entries.insert(name, value);
        }

        namespace
    }

    /// Whether `name` is a global of this namespace.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Global names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Adds every entry as a global of `env`.
    pub fn install(&self, env: &mut Environment<'static>) {
        for (name, value) in &self.entries {
            env.add_global(name.clone(), value.clone());
        }
    }

    fn insert<F, Rv, Args>(&mut self, name: &str, f: F)
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.entries
            .insert(name.to_string(), Value::from_function::<F, Rv, Args>(f));
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

fn invalid<E>(function: &str, err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::new(ErrorKind::InvalidOperation, format!("{function}: {err}")).with_source(err)
}

fn register_translation_functions(ns: &mut Namespace, catalog: Arc<Catalog>) {
    // t(lang, key)
    let c = Arc::clone(&catalog);
    ns.insert("t", move |lang: String, key: String| -> String {
        c.translate(&lang, &key).to_string()
    });

    // tp(lang, key, count)
    let c = Arc::clone(&catalog);
    ns.insert("tp", move |lang: String, key: String, count: i64| -> String {
        c.translate_plural(&lang, &key, count).to_string()
    });

    // tf(lang, key, args...)
    let c = Arc::clone(&catalog);
    ns.insert(
        "tf",
        move |lang: String, key: String, args: Rest<Value>| -> Result<String, Error> {
            c.translate_format(&lang, &key, &args)
                .map_err(|e| invalid("tf", e))
        },
    );

    // tfp(lang, key, count, args...)
    ns.insert(
        "tfp",
        move |lang: String, key: String, count: i64, args: Rest<Value>| -> Result<String, Error> {
            catalog
                .translate_format_plural(&lang, &key, count, &args)
                .map_err(|e| invalid("tfp", e))
        },
    );
}

fn register_locale_functions(ns: &mut Namespace) {
    // shortdate(locale, date)
    ns.insert(
        "shortdate",
        |locale: String, date: Value| -> Result<String, Error> {
            let parsed = i18n::parse_date(&date).ok_or_else(|| unparsable_date("shortdate", &date))?;
            Ok(i18n::to_date(&locale, parsed.date_naive()))
        },
    );

    // currency(locale, amount)
    ns.insert("currency", |locale: String, amount: f64| -> String {
        i18n::to_currency(&locale, amount)
    });
}

fn unparsable_date(function: &str, value: &Value) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("{function}: cannot interpret {value:?} as a date"),
    )
}

fn register_helpers(ns: &mut Namespace) {
    ns.insert("map", |args: Rest<Value>| -> Result<Value, Error> {
        helpers::build_map(&args).map_err(|e| invalid("map", e))
    });

    ns.insert("iterate", helpers::iterate);

    // Output is trusted markup; the token itself is escaped.
    ns.insert("xsrf", |token: String| -> Value {
        Value::from_safe_string(helpers::xsrf_field(&token))
    });

    ns.insert("strip", |text: String, needle: String| -> String {
        helpers::strip(&text, &needle)
    });

    ns.insert("fallback", helpers::fallback);

    ns.insert("filesize", helpers::filesize);

    ns.insert("slugify", |text: String| -> String { helpers::slugify(&text) });

    ns.insert("thousands", |n: Value| -> String {
        helpers::thousands(&n.to_string())
    });

    ns.insert("timeago", |date: Value| -> Result<String, Error> {
        let then = i18n::parse_date(&date).ok_or_else(|| unparsable_date("timeago", &date))?;
        Ok(helpers::time_ago(then.with_timezone(&Utc), Utc::now()))
    });
}
