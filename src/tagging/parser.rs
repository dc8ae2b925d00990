/*!
 * Transcript parsing: turns tag markup across a cue sequence into timestamped
 * occurrences of vocabulary entries.
 *
 * A tag left open at the end of a cue carries over to the following cues until
 * a closing marker appears before any other tag opens. Only one open tag is
 * tracked at a time; nesting is not supported. A tag still open when the cues
 * run out is dropped.
 */

use std::collections::HashSet;
use std::fmt;

use anyhow::Result;
use log::{debug, warn};
use serde::Serialize;

use super::markup::{text_before_first_tag, TAG_CLOSE};
use super::scanner::scan_tags;
use crate::subtitle_processor::{format_timestamp, Cue};
use crate::vocabulary::{VocabularyEntry, VocabularyLookup};

/// Message recorded for tags whose type is not configured
pub const INVALID_TAG_TYPE: &str = "Invalid tag type";

/// Message recorded for tags whose value is blank
pub const EMPTY_TAG_VALUE: &str = "Empty tag value";

/// A timestamped appearance of a vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub vocabulary: VocabularyEntry,

    /// Start of the cue the tag opened in
    pub cue_start_ms: u64,

    /// Interpolated time of the tag within that cue
    pub exact_ms: u64,
}

/// A non-fatal problem with one tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub cue_start_ms: u64,
    pub tag_type: String,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} - {}",
            self.message,
            format_timestamp(self.cue_start_ms),
            self.tag_type
        )
    }
}

/// Everything a parse pass produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutcome {
    /// In the order tags were finalized
    pub occurrences: Vec<Occurrence>,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A tag opened in an earlier cue and not yet closed
#[derive(Debug)]
struct PendingTag {
    tag_type: String,
    value: String,
    cue_start_ms: u64,
    exact_ms: u64,
}

/// Parses tag markup across an ordered cue sequence
pub struct TranscriptParser<'a, L: VocabularyLookup + ?Sized> {
    language: String,
    valid_types: HashSet<String>,
    lookup: &'a L,
}

impl<'a, L: VocabularyLookup + ?Sized> TranscriptParser<'a, L> {
    pub fn new<I, S>(language: &str, valid_types: I, lookup: &'a L) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            language: language.to_string(),
            valid_types: valid_types.into_iter().map(|t| t.as_ref().to_string()).collect(),
            lookup,
        }
    }

    /// Parse all cues.
    ///
    /// Invalid tag types and blank values are collected as errors and skipped.
    /// Only a failing vocabulary lookup aborts the parse.
    pub fn parse(&self, cues: &[Cue]) -> Result<ParseOutcome> {
        let mut outcome = ParseOutcome::default();
        let mut unclosed: Option<PendingTag> = None;

        for cue in cues {
            if let Some(mut pending) = unclosed.take() {
                let head = text_before_first_tag(&cue.text);
                match head.find(TAG_CLOSE) {
                    Some(close) => {
                        let rest = head[..close].trim();
                        if pending.value.is_empty() {
                            pending.value = rest.to_string();
                        } else if !rest.is_empty() {
                            pending.value = format!("{} {}", pending.value, rest);
                        }
                        debug!(
                            "Closing {} tag '{}' opened at {}",
                            pending.tag_type, pending.value, pending.cue_start_ms
                        );
                        self.finalize(pending, &mut outcome)?;
                    }
                    None => unclosed = Some(pending),
                }
            }

            let duration_ms = cue.duration_ms();

            for tag in scan_tags(&cue.text) {
                if !self.valid_types.contains(&tag.tag_type) {
                    warn!(
                        "Invalid tag type '{}' at {}",
                        tag.tag_type,
                        format_timestamp(cue.start_ms)
                    );
                    outcome.errors.push(ParseError {
                        cue_start_ms: cue.start_ms,
                        tag_type: tag.tag_type,
                        message: INVALID_TAG_TYPE.to_string(),
                    });
                    continue;
                }

                let exact_ms = cue.start_ms + (duration_ms as f64 * tag.position).floor() as u64;
                let pending = PendingTag {
                    tag_type: tag.tag_type,
                    value: tag.value,
                    cue_start_ms: cue.start_ms,
                    exact_ms,
                };

                if tag.closed {
                    if let Some(stale) = unclosed.take() {
                        debug!("Discarding unclosed {} tag '{}'", stale.tag_type, stale.value);
                    }
                    self.finalize(pending, &mut outcome)?;
                } else if let Some(previous) = unclosed.replace(pending) {
                    debug!("Replacing unclosed {} tag '{}'", previous.tag_type, previous.value);
                }
            }
        }

        if let Some(pending) = unclosed {
            debug!(
                "Dropping {} tag '{}' still open at end of transcript",
                pending.tag_type, pending.value
            );
        }

        Ok(outcome)
    }

    /// Resolve a closed tag into an occurrence, or record a blank value
    fn finalize(&self, pending: PendingTag, outcome: &mut ParseOutcome) -> Result<()> {
        if pending.value.is_empty() {
            warn!(
                "Empty {} tag at {}",
                pending.tag_type,
                format_timestamp(pending.cue_start_ms)
            );
            outcome.errors.push(ParseError {
                cue_start_ms: pending.cue_start_ms,
                tag_type: pending.tag_type,
                message: EMPTY_TAG_VALUE.to_string(),
            });
            return Ok(());
        }

        let vocabulary = self
            .lookup
            .get_or_create(&pending.tag_type, &self.language, &pending.value)?;

        outcome.occurrences.push(Occurrence {
            vocabulary,
            cue_start_ms: pending.cue_start_ms,
            exact_ms: pending.exact_ms,
        });
        Ok(())
    }
}

/// Parse a cue sequence in one call
pub fn parse_cues<L, I, S>(
    cues: &[Cue],
    language: &str,
    valid_types: I,
    lookup: &L,
) -> Result<ParseOutcome>
where
    L: VocabularyLookup + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    TranscriptParser::new(language, valid_types, lookup).parse(cues)
}
