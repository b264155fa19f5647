//! Translation catalog loaded from `translations/*.json`.
//!
//! Each file holds one language, named by its base name (`fr.json` → `fr`):
//!
//! ```json
//! [
//!   { "key": "hello", "value": "Bonjour" },
//!   { "key": "people", "value": "personne", "plural": "personnes" }
//! ]
//! ```
//!
//! Records are indexed under `<lang>_<key>`. When two records collide, the one
//! loaded last wins; files load in name order.

use std::collections::{BTreeSet, HashMap};

use minijinja::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::{sprintf, FormatError};
use crate::error::ParseError;
use crate::file_loader::{self, Presence, TRANSLATIONS_DIR};
use crate::tree::FileTree;

/// Value returned for keys that have no translation.
pub const NOT_FOUND: &str = "not found";

/// One translation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub key: String,
    #[serde(default)]
    pub value: String,
    /// Plural form. An empty string counts as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
}

impl Message {
    /// Creates a record with only a singular value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            plural: None,
        }
    }

    /// Sets the plural value.
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    fn plural_value(&self) -> Option<&str> {
        self.plural.as_deref().filter(|p| !p.is_empty())
    }

    fn sentinel(key: &str) -> Self {
        Self::new(key, NOT_FOUND)
    }
}

/// All translations known to a bundle.
///
/// A catalog is immutable once loaded and is shared between the bundle and the
/// template functions, so lookups never need locking.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<String, Message>,
    languages: BTreeSet<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every file under `<root>/translations`.
    ///
    /// A missing directory yields an empty catalog. A file that can't be read
    /// or isn't a JSON array of records aborts the load.
    pub fn load(tree: &dyn FileTree, root: &str) -> Result<Self, ParseError> {
        let mut catalog = Self::new();

        let files = file_loader::list(tree, &[root, TRANSLATIONS_DIR], Presence::Optional)?;
        for file in files {
            let content = file_loader::read(tree, &file)?;
            let messages: Vec<Message> =
                serde_json::from_str(&content).map_err(|source| ParseError::Translation {
                    path: file.path.clone(),
                    source,
                })?;
            catalog.add_language(file.stem(), messages);
        }

        Ok(catalog)
    }

    /// Adds the records of one language, overwriting colliding keys.
    pub fn add_language(&mut self, lang: &str, messages: impl IntoIterator<Item = Message>) {
        self.languages.insert(lang.to_string());
        for message in messages {
            let key = composite_key(lang, &message.key);
            if self.messages.insert(key, message).is_some() {
                debug!(lang, "translation key overwritten by a later record");
            }
        }
    }

    /// Parses `json` as a translation file for `lang` and adds its records.
    pub fn add_json(&mut self, lang: &str, json: &str) -> Result<(), serde_json::Error> {
        let messages: Vec<Message> = serde_json::from_str(json)?;
        self.add_language(lang, messages);
        Ok(())
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&Message> {
        self.messages.get(&composite_key(lang, key))
    }

    /// Returns the record for `lang`/`key`, or a sentinel whose value is
    /// [`NOT_FOUND`].
    pub fn message(&self, lang: &str, key: &str) -> Message {
        self.lookup(lang, key)
            .cloned()
            .unwrap_or_else(|| Message::sentinel(key))
    }

    /// Returns the singular value for `lang`/`key`.
    pub fn translate(&self, lang: &str, key: &str) -> &str {
        self.lookup(lang, key)
            .map(|m| m.value.as_str())
            .unwrap_or(NOT_FOUND)
    }

    /// Returns the plural value when `count > 1` and one is registered,
    /// otherwise the singular value.
    pub fn translate_plural(&self, lang: &str, key: &str, count: i64) -> &str {
        match self.lookup(lang, key) {
            Some(message) => match message.plural_value() {
                Some(plural) if count > 1 => plural,
                _ => message.value.as_str(),
            },
            None => NOT_FOUND,
        }
    }

    /// Interpolates `args` into the singular value.
    pub fn translate_format(
        &self,
        lang: &str,
        key: &str,
        args: &[Value],
    ) -> Result<String, FormatError> {
        sprintf(self.translate(lang, key), args)
    }

    /// Interpolates `args` into the value picked by [`translate_plural`](Self::translate_plural).
    pub fn translate_format_plural(
        &self,
        lang: &str,
        key: &str,
        count: i64,
        args: &[Value],
    ) -> Result<String, FormatError> {
        sprintf(self.translate_plural(lang, key, count), args)
    }

    /// Languages that contributed at least one file, in name order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }

    /// Number of indexed records across all languages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if no records are indexed.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn composite_key(lang: &str, key: &str) -> String {
    format!("{lang}_{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::EmbeddedTree;

    fn french() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add_json(
                "fr",
                r#"[
                    {"key": "hello", "value": "Bonjour"},
                    {"key": "people", "value": "personne", "plural": "personnes"},
                    {"key": "empty-plural", "value": "chat", "plural": ""},
                    {"key": "greeting", "value": "Bonjour %s"},
                    {"key": "items", "value": "%d article", "plural": "%d articles"}
                ]"#,
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_translate_found() {
        assert_eq!(french().translate("fr", "hello"), "Bonjour");
    }

    #[test]
    fn test_translate_missing_returns_sentinel() {
        let catalog = french();
        assert_eq!(catalog.translate("fr", "missing-key"), NOT_FOUND);
        assert_eq!(catalog.translate("en", "hello"), NOT_FOUND);

        let message = catalog.message("fr", "missing-key");
        assert_eq!(message.key, "missing-key");
        assert_eq!(message.value, "not found");
        assert_eq!(message.plural, None);
    }

    #[test]
    fn test_plural_rules() {
        let catalog = french();
        assert_eq!(catalog.translate_plural("fr", "people", 1), "personne");
        assert_eq!(catalog.translate_plural("fr", "people", 0), "personne");
        assert_eq!(catalog.translate_plural("fr", "people", -5), "personne");
        assert_eq!(catalog.translate_plural("fr", "people", 2), "personnes");
        // no plural registered: singular even for many
        assert_eq!(catalog.translate_plural("fr", "hello", 10), "Bonjour");
        assert_eq!(catalog.translate_plural("fr", "empty-plural", 3), "chat");
        assert_eq!(catalog.translate_plural("fr", "nope", 3), NOT_FOUND);
    }

    #[test]
    fn test_format_variants() {
        let catalog = french();
        assert_eq!(
            catalog
                .translate_format("fr", "greeting", &[Value::from("Ana")])
                .unwrap(),
            "Bonjour Ana"
        );
        assert_eq!(
            catalog
                .translate_format_plural("fr", "items", 3, &[Value::from(3)])
                .unwrap(),
            "3 articles"
        );
        assert!(catalog.translate_format("fr", "greeting", &[]).is_err());
    }

    #[test]
    fn test_later_records_overwrite() {
        let mut catalog = Catalog::new();
        catalog.add_language("fr", [Message::new("k", "first")]);
        catalog.add_language("fr", [Message::new("k", "second")]);
        assert_eq!(catalog.translate("fr", "k"), "second");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_load_from_tree() {
        let tree = EmbeddedTree::new()
            .with("templates/translations/fr.json", r#"[{"key":"hello","value":"Bonjour"}]"#)
            .with("templates/translations/en.json", r#"[{"key":"hello","value":"Hello"}]"#);

        let catalog = Catalog::load(&tree, "templates").unwrap();
        assert_eq!(catalog.translate("fr", "hello"), "Bonjour");
        assert_eq!(catalog.translate("en", "hello"), "Hello");
        assert_eq!(catalog.languages().collect::<Vec<_>>(), ["en", "fr"]);
    }

    #[test]
    fn test_load_without_directory_is_empty() {
        let tree = EmbeddedTree::new().with("templates/app.html", "");
        let catalog = Catalog::load(&tree, "templates").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let tree = EmbeddedTree::new().with("templates/translations/fr.json", "{not json");
        let err = Catalog::load(&tree, "templates").unwrap_err();
        assert!(matches!(err, ParseError::Translation { ref path, .. } if path == "templates/translations/fr.json"));
    }

    #[test]
    fn test_message_serialization_omits_missing_plural() {
        let json = serde_json::to_string(&Message::new("k", "")).unwrap();
        assert_eq!(json, r#"{"key":"k","value":""}"#);

        let json = serde_json::to_string(&Message::new("k", "v").with_plural("vs")).unwrap();
        assert_eq!(json, r#"{"key":"k","value":"v","plural":"vs"}"#);
    }
}
