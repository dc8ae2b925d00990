/*!
 * Vocabulary entries ("colloquialisms") and the lookup the parser resolves tags against.
 */

use std::collections::HashMap;

use anyhow::Result;
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::VocabularyError;

/// A known term, unique per (type, language, normalized value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Store-assigned identifier
    pub id: i64,

    /// Tag type, e.g. `tangata`
    #[serde(rename = "type")]
    pub tag_type: String,

    /// Language code
    pub language: String,

    /// Value as first written
    pub display_value: String,

    /// Case-insensitive key derived from `display_value`
    pub normalized_value: String,

    /// Editor supplied meaning
    #[serde(default)]
    pub meaning: String,

    /// Whether the term may be inserted by auto-tagging
    pub allow_auto_tag: bool,
}

impl VocabularyEntry {
    pub fn new(id: i64, tag_type: &str, language: &str, value: &str) -> Self {
        Self {
            id,
            tag_type: tag_type.to_string(),
            language: language.to_string(),
            display_value: value.to_string(),
            normalized_value: normalize_value(value),
            meaning: String::new(),
            allow_auto_tag: true,
        }
    }
}

/// Derive the lookup key for a display value
pub fn normalize_value(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A (value, type) pair handed to the auto-tagger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSpec {
    pub value: String,
    pub tag_type: String,
}

impl TermSpec {
    pub fn new(value: impl Into<String>, tag_type: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tag_type: tag_type.into(),
        }
    }
}

impl From<&VocabularyEntry> for TermSpec {
    fn from(entry: &VocabularyEntry) -> Self {
        TermSpec::new(entry.display_value.clone(), entry.tag_type.clone())
    }
}

/// Get-or-create access to vocabulary entries.
///
/// Implementations must make the operation atomic: two callers asking for the
/// same (type, language, normalized value) get the same entry.
pub trait VocabularyLookup {
    fn get_or_create(&self, tag_type: &str, language: &str, value: &str) -> Result<VocabularyEntry>;
}

type VocabularyKey = (String, String, String);

/// Process-local vocabulary store
#[derive(Default)]
pub struct InMemoryVocabulary {
    entries: Mutex<HashMap<VocabularyKey, VocabularyEntry>>,
}

impl InMemoryVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing entries
    pub fn with_entries(entries: impl IntoIterator<Item = VocabularyEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(|e| ((e.tag_type.clone(), e.language.clone(), e.normalized_value.clone()), e))
            .collect();

        Self {
            entries: Mutex::new(map),
        }
    }

    /// Snapshot of all entries, ordered by id
    pub fn entries(&self) -> Vec<VocabularyEntry> {
        let mut entries: Vec<VocabularyEntry> = self.entries.lock().values().cloned().collect();
        entries.sort_by_key(|e| e.id);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VocabularyLookup for InMemoryVocabulary {
    fn get_or_create(&self, tag_type: &str, language: &str, value: &str) -> Result<VocabularyEntry> {
        let value = value.trim();
        if value.is_empty() {
            return Err(VocabularyError::EmptyValue(tag_type.to_string()).into());
        }

        let key = (tag_type.to_string(), language.to_string(), normalize_value(value));
        let mut entries = self.entries.lock();
        let next_id = entries.values().map(|e| e.id).max().unwrap_or(0) + 1;

        let entry = entries.entry(key).or_insert_with(|| {
            debug!("Creating vocabulary entry {}: {} ({})", next_id, value, tag_type);
            VocabularyEntry::new(next_id, tag_type, language, value)
        });

        Ok(entry.clone())
    }
}
