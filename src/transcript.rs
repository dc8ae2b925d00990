/*!
 * Transcripts and the tagging workflow run against them.
 *
 * A transcript is a titled, language-tagged subtitle source. The workflow
 * auto-tags its cues with known vocabulary, then parses the tagged cues into
 * occurrences, which an `OccurrenceSink` can store in place of earlier results.
 */

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::database::models::TagRecord;
use crate::errors::{AppError, TranscriptError};
use crate::subtitle_processor::{write_vtt_string, Cue, CueSource, SubtitleDocument};
use crate::tagging::{parse_cues, AutoTagger, Occurrence, ParseOutcome};
use crate::vocabulary::{TermSpec, VocabularyLookup};

/// A stored transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: i64,

    #[serde(default)]
    pub title: String,

    /// Language code of the spoken content
    pub language: String,

    /// WebVTT or SRT text; `None` when nothing has been attached yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// SHA-256 of `source`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl Transcript {
    pub fn new(id: i64, title: &str, language: &str) -> Self {
        Transcript {
            id,
            title: title.to_string(),
            language: language.to_string(),
            source: None,
            content_hash: None,
        }
    }

    /// Attach subtitle text
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn has_source(&self) -> bool {
        self.source.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Auto-tag the cues and render them as WebVTT
    pub fn tagged_transcript(&self, terms: &[TermSpec]) -> Result<String, AppError> {
        let tagged = self.tagged_cues(terms)?;
        Ok(write_vtt_string(&tagged))
    }

    /// Auto-tag the cues, then parse the tagged result.
    ///
    /// Fails before any tagging when no source is attached.
    pub fn parse_transcript<L, S>(
        &self,
        terms: &[TermSpec],
        valid_types: &[S],
        lookup: &L,
    ) -> Result<ParseOutcome, AppError>
    where
        L: VocabularyLookup + ?Sized,
        S: AsRef<str>,
    {
        let tagged = self.tagged_cues(terms)?;
        let outcome = parse_cues(&tagged, &self.language, valid_types, lookup)?;

        info!(
            "{}: {} tags, {} errors",
            self,
            outcome.occurrences.len(),
            outcome.errors.len()
        );
        Ok(outcome)
    }

    fn tagged_cues(&self, terms: &[TermSpec]) -> Result<Vec<Cue>, AppError> {
        let cues = self.cues()?;
        let tagger = AutoTagger::new(terms.iter().cloned())?;
        debug!("Auto-tagging {} cues with {} terms", cues.len(), tagger.term_count());

        Ok(tagger.tag_cues(&cues))
    }
}

impl CueSource for Transcript {
    fn cues(&self) -> Result<Vec<Cue>, AppError> {
        match self.source.as_deref() {
            Some(source) if !source.trim().is_empty() => {
                Ok(SubtitleDocument::parse(source)?.cues)
            }
            _ => Err(TranscriptError::MissingSource(self.id).into()),
        }
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "Transcript {}", self.id)
        } else {
            write!(f, "{}", self.title)
        }
    }
}

/// Counts reported after replacing a transcript's stored tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceSummary {
    pub deleted: usize,
    pub inserted: usize,
}

impl fmt::Display for ReplaceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tags deleted, {} tags added.", self.deleted, self.inserted)
    }
}

/// Destination for parsed occurrences.
///
/// `replace_all` must delete the transcript's previous occurrences and insert
/// the new ones as a single all-or-nothing step.
#[async_trait]
pub trait OccurrenceSink {
    async fn replace_all(&self, transcript_id: i64, occurrences: Vec<Occurrence>) -> Result<ReplaceSummary>;
}

// @struct: One appearance, as exposed in the summary JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceTime {
    /// Seconds from the start of the transcript
    pub time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelatedTranscript {
    pub title: String,
    pub occurrences: Vec<OccurrenceTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryItem {
    pub meaning: String,
    pub related: BTreeMap<i64, RelatedTranscript>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryType {
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub items: BTreeMap<String, SummaryItem>,
}

/// Tags of one transcript grouped by type and term, with the other
/// transcripts each term also appears in
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TagSummary {
    pub types: BTreeMap<String, SummaryType>,
}

impl TagSummary {
    /// Group `own` tags and attach `related` ones.
    ///
    /// Related tags whose term does not occur in `own` are ignored.
    pub fn build(own: &[TagRecord], related: &[TagRecord], type_labels: &HashMap<String, String>) -> Self {
        let mut summary = TagSummary::default();

        for tag in own {
            let vocabulary = &tag.vocabulary;
            let entry = summary
                .types
                .entry(vocabulary.tag_type.clone())
                .or_insert_with(|| SummaryType {
                    display_name: type_labels
                        .get(&vocabulary.tag_type)
                        .cloned()
                        .unwrap_or_else(|| vocabulary.tag_type.clone()),
                    items: BTreeMap::new(),
                });

            entry
                .items
                .entry(vocabulary.normalized_value.clone())
                .or_insert_with(|| SummaryItem {
                    meaning: vocabulary.meaning.clone(),
                    related: BTreeMap::new(),
                });
        }

        for tag in related {
            let vocabulary = &tag.vocabulary;
            let Some(item) = summary
                .types
                .get_mut(&vocabulary.tag_type)
                .and_then(|t| t.items.get_mut(&vocabulary.normalized_value))
            else {
                continue;
            };

            item.related
                .entry(tag.transcript_id)
                .or_insert_with(|| RelatedTranscript {
                    title: tag.transcript_title.clone(),
                    occurrences: Vec::new(),
                })
                .occurrences
                .push(OccurrenceTime { time: tag.time_secs() });
        }

        summary
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
