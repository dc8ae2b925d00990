/*!
 * Tag scanning within a single cue.
 */

use log::trace;

use super::markup::{find_tag_at, strip_tags, strip_voice_spans};

/// A tag found in cue text
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedTag {
    /// Tag type, as written in the markup
    pub tag_type: String,

    /// Tag value, trimmed
    pub value: String,

    /// Fraction of the stripped cue text preceding the tag, in [0, 1],
    /// rounded to 5 decimal places
    pub position: f64,

    /// False when the tag is not closed within this cue
    pub closed: bool,
}

/// Lazily yields the tags of one cue's text, in order.
///
/// Voice spans are removed up front. Positions are measured in characters of
/// the tag-stripped text.
pub struct TagScanner {
    text: String,
    stripped_len: usize,
    cursor: usize,
}

impl TagScanner {
    /// Prepare a scanner over raw cue text
    pub fn new(raw_text: &str) -> Self {
        let text = strip_voice_spans(raw_text);
        let stripped_len = strip_tags(&text).chars().count();

        TagScanner {
            text,
            stripped_len,
            cursor: 0,
        }
    }

    fn position_of(&self, offset: usize) -> f64 {
        if self.stripped_len == 0 {
            return 0.0;
        }

        let preceding = strip_tags(&self.text[..offset]).chars().count();
        round_position(preceding as f64 / self.stripped_len as f64)
    }
}

impl Iterator for TagScanner {
    type Item = ScannedTag;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.text.len() {
            return None;
        }

        let span = find_tag_at(&self.text, self.cursor)?;
        self.cursor = span.end;

        let tag = ScannedTag {
            tag_type: span.tag_type.to_string(),
            value: span.value.trim().to_string(),
            position: self.position_of(span.start),
            closed: span.closed,
        };
        trace!("Scanned tag {:?}", tag);

        Some(tag)
    }
}

/// Scan raw cue text for tags
pub fn scan_tags(raw_text: &str) -> TagScanner {
    TagScanner::new(raw_text)
}

fn round_position(position: f64) -> f64 {
    (position * 100_000.0).round() / 100_000.0
}
