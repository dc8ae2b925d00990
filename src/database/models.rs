/*!
 * Database entity models and DTOs.
 *
 * These structures map rows of the tag tables to typed values.
 */

use serde::{Deserialize, Serialize};

use crate::transcript::Transcript;
use crate::uniqueness::HistoryEntry;
use crate::vocabulary::VocabularyEntry;

/// A stored tag joined with its vocabulary entry and transcript title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: i64,
    pub transcript_id: i64,
    pub transcript_title: String,
    pub vocabulary: VocabularyEntry,
    /// Start of the cue the tag opened in, in ms
    pub start_ms: u64,
    /// Interpolated time of the tag, in ms
    pub exact_ms: u64,
}

impl TagRecord {
    /// Exact time in seconds
    pub fn time_secs(&self) -> f64 {
        self.exact_ms as f64 / 1000.0
    }

    pub fn to_history(&self) -> HistoryEntry {
        HistoryEntry::new(self.vocabulary.id, self.vocabulary.tag_type.clone(), self.exact_ms)
    }
}

/// Result of importing a transcript
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub transcript: Transcript,
    /// False when identical content was already stored
    pub created: bool,
}

/// Partial update of a vocabulary entry
#[derive(Debug, Clone, Default)]
pub struct VocabularyUpdate {
    pub meaning: Option<String>,
    pub allow_auto_tag: Option<bool>,
}

impl VocabularyUpdate {
    pub fn is_empty(&self) -> bool {
        self.meaning.is_none() && self.allow_auto_tag.is_none()
    }
}
