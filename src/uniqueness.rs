use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Serialize};

// @module: Temporal novelty score for tag occurrences within one transcript

/// One stored occurrence, as needed for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub vocabulary_id: i64,
    pub tag_type: String,
    pub exact_ms: u64,
}

impl HistoryEntry {
    pub fn new(vocabulary_id: i64, tag_type: impl Into<String>, exact_ms: u64) -> Self {
        Self {
            vocabulary_id,
            tag_type: tag_type.into(),
            exact_ms,
        }
    }
}

/// Scores occurrences by how long ago the same term last appeared, relative
/// to how long ago any term appeared.
///
/// For an occurrence at `t` of a term seen `count` times:
/// - `count <= 1` scores 1.0
/// - the first occurrence of the term scores `1 / count`
/// - otherwise, with `tau_value = t - previous same term` and
///   `tau_tag = t - previous any term`, `x = (tau_value - tau_tag) / tau_tag`
///   and the score is `(1 / count) * (1 - e^(-x / 10))`
///
/// "Previous" always means strictly earlier: occurrences sharing a timestamp
/// do not see each other.
#[derive(Debug, Clone, Default)]
pub struct UniquenessScorer {
    counts: HashMap<i64, usize>,
}

impl UniquenessScorer {
    /// Count occurrences per vocabulary entry from the history itself
    pub fn from_history(history: &[HistoryEntry]) -> Self {
        let mut counts = HashMap::new();
        for entry in history {
            *counts.entry(entry.vocabulary_id).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Use externally supplied counts, e.g. across every transcript
    pub fn with_counts(counts: HashMap<i64, usize>) -> Self {
        Self { counts }
    }

    pub fn count(&self, vocabulary_id: i64) -> usize {
        self.counts.get(&vocabulary_id).copied().unwrap_or(0)
    }

    /// Score every entry of the history.
    ///
    /// Scores are returned in the order of `history`, which does not need to
    /// be sorted.
    pub fn score(&self, history: &[HistoryEntry]) -> Vec<f64> {
        let mut order: Vec<usize> = (0..history.len()).collect();
        order.sort_by_key(|&i| history[i].exact_ms);

        let mut scores = vec![0.0; history.len()];
        let mut last_seen: HashMap<i64, u64> = HashMap::new();
        let mut last_any: Option<u64> = None;

        for group in order.chunk_by(|&a, &b| history[a].exact_ms == history[b].exact_ms) {
            for &i in group {
                let entry = &history[i];
                scores[i] = self.score_one(entry, last_seen.get(&entry.vocabulary_id).copied(), last_any);
                trace!("Uniqueness of {} at {}: {}", entry.vocabulary_id, entry.exact_ms, scores[i]);
            }

            for &i in group {
                last_seen.insert(history[i].vocabulary_id, history[i].exact_ms);
            }
            last_any = Some(history[group[0]].exact_ms);
        }

        scores
    }

    fn score_one(&self, entry: &HistoryEntry, value_time: Option<u64>, tag_time: Option<u64>) -> f64 {
        let count = self.count(entry.vocabulary_id);
        if count <= 1 {
            return 1.0;
        }
        let base = 1.0 / count as f64;

        let (Some(value_time), Some(tag_time)) = (value_time, tag_time) else {
            return base;
        };

        let t = entry.exact_ms as f64 / 1000.0;
        let tau_value = t - value_time as f64 / 1000.0;
        let tau_tag = t - tag_time as f64 / 1000.0;
        let x = (tau_value - tau_tag) / tau_tag;

        (base * (1.0 - (-x / 10.0).exp())).clamp(0.0, 1.0)
    }
}

/// Score a history using counts derived from it
pub fn score_uniqueness(history: &[HistoryEntry]) -> Vec<f64> {
    UniquenessScorer::from_history(history).score(history)
}
