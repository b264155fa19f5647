//! Adding missing keys to a language's translation file.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use trellis::file_loader::TRANSLATIONS_DIR;
use trellis::Message;

/// Path of the translation file for `lang` under a templates root.
pub fn translation_file(root: &Path, lang: &str) -> PathBuf {
    root.join(TRANSLATIONS_DIR).join(format!("{lang}.json"))
}

/// Appends a record with an empty value for every key not yet in `messages`.
/// Existing records are never removed or changed. Returns how many were added.
pub fn merge(messages: &mut Vec<Message>, keys: &BTreeSet<String>) -> usize {
    let known: HashSet<String> = messages.iter().map(|m| m.key.clone()).collect();
    let before = messages.len();
    messages.extend(
        keys.iter()
            .filter(|key| !known.contains(*key))
            .map(|key| Message::new(key.as_str(), "")),
    );
    messages.len() - before
}

/// Reads `path`, merges `keys` in and writes it back pretty-printed. A missing
/// file starts out empty.
pub fn sync_file(path: &Path, keys: &BTreeSet<String>) -> Result<usize> {
    let mut messages: Vec<Message> = if path.exists() {
        let content =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?
    } else {
        Vec::new()
    };

    let added = merge(&mut messages, keys);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(&messages).context("serialize translations")?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;

    Ok(added)
}
