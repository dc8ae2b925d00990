/*!
 * Cue text markup: voice spans, colloquialism tags and word characters.
 *
 * Two kinds of in-line markup are recognised inside cue text:
 * - voice attribution `<v NAME>...</v>`
 * - colloquialism tags `<c.TYPE>value</c>`
 *
 * Both strip operations keep the inner content and are idempotent, so character
 * offsets computed against stripped text are stable.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Vowels with macrons. Treated as word characters in every boundary check.
pub const MACRON_VOWELS: &str = "āēīōūĀĒĪŌŪ";

/// Length of the `</c>` closing marker, in characters
pub const TAG_CLOSE_LEN: usize = 4;

/// Closing marker of a colloquialism tag
pub const TAG_CLOSE: &str = "</c>";

/// Voice span closed within the same line: `<v NAME>...</v>`
static VOICE_SPAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<v ([\wāēīōūĀĒĪŌŪ]+)>(.+)</v>?").expect("Invalid voice span regex")
});

/// Voice span opening the cue whose closing tag lives in a later cue
static INITIAL_VOICE_SPAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^<v ([\wāēīōūĀĒĪŌŪ]+)>\s*").expect("Invalid initial voice span regex")
});

/// Tag opener `<c.TYPE>`
static TAG_OPEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<c\.([A-Za-z0-9_]+)>").expect("Invalid tag opener regex")
});

/// One tag located in text, by byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TagSpan<'a> {
    /// Start of the opener
    pub start: usize,

    /// End of the closer, or of the value when the tag is unclosed
    pub end: usize,

    pub tag_type: &'a str,

    /// Raw value, untrimmed
    pub value: &'a str,

    pub closed: bool,
}

/// Find the first tag opening at or after byte offset `from`.
///
/// The value runs up to the first `</c>`, the next opener or the end of the
/// text, whichever comes first. Only the first case closes the tag.
pub(crate) fn find_tag_at(text: &str, from: usize) -> Option<TagSpan<'_>> {
    let caps = TAG_OPEN_REGEX.captures_at(text, from)?;
    let opener = caps.get(0)?;
    let tag_type = caps.get(1)?.as_str();

    let value_start = opener.end();
    let rest = &text[value_start..];
    let close = rest.find(TAG_CLOSE);
    let next_open = TAG_OPEN_REGEX.find(rest).map(|m| m.start());

    let (value_len, closed) = match (close, next_open) {
        (Some(close), Some(open)) if open < close => (open, false),
        (Some(close), _) => (close, true),
        (None, Some(open)) => (open, false),
        (None, None) => (rest.len(), false),
    };

    let value_end = value_start + value_len;
    Some(TagSpan {
        start: opener.start(),
        end: if closed { value_end + TAG_CLOSE.len() } else { value_end },
        tag_type,
        value: &text[value_start..value_end],
        closed,
    })
}

/// Iterate the tags of `text` in order
fn tag_spans(text: &str) -> impl Iterator<Item = TagSpan<'_>> {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        let span = find_tag_at(text, cursor)?;
        cursor = span.end;
        Some(span)
    })
}

/// Whether `c` counts as part of a word
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || MACRON_VOWELS.contains(c)
}

/// Whether `tag_type` can be written as `<c.TYPE>`
pub fn is_valid_tag_type(tag_type: &str) -> bool {
    !tag_type.is_empty() && tag_type.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `value` survives a round trip through tag markup
pub fn is_taggable_value(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.contains(TAG_CLOSE) && !TAG_OPEN_REGEX.is_match(value)
}

/// Remove voice attribution markup, keeping the spoken content.
///
/// Spans closed on the same line are replaced by their trimmed content. A span
/// that opens the text but closes in a later cue only loses its opening tag.
pub fn strip_voice_spans(text: &str) -> String {
    let closed = VOICE_SPAN_REGEX.replace_all(text, |caps: &Captures| caps[2].trim().to_string());
    INITIAL_VOICE_SPAN_REGEX.replace(&closed, "").into_owned()
}

/// Remove tag markup, keeping each tag's trimmed value
pub fn strip_tags(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut last = 0;

    for span in tag_spans(text) {
        stripped.push_str(&text[last..span.start]);
        stripped.push_str(span.value.trim());
        last = span.end;
    }
    stripped.push_str(&text[last..]);

    stripped
}

/// Text preceding the first tag opener
pub(crate) fn text_before_first_tag(text: &str) -> &str {
    match TAG_OPEN_REGEX.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Split text around complete tags.
///
/// The result always has odd length: even indices hold untagged text (possibly
/// empty), odd indices hold complete tags, so the first and last elements are
/// the untagged head and tail of the text.
pub fn split_tagged(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut last = 0;

    for span in tag_spans(text).filter(|span| span.closed) {
        parts.push(&text[last..span.start]);
        parts.push(&text[span.start..span.end]);
        last = span.end;
    }
    parts.push(&text[last..]);

    parts
}
