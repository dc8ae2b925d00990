/*!
 * Auto-tagging: wraps known vocabulary terms found in plain cue text in tag markup.
 *
 * Terms are applied one at a time in the order given. Text already inside a
 * complete tag is never touched, so a term processed earlier wins any overlap
 * with one processed later.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use regex::{Captures, Regex};

use super::markup::{is_taggable_value, is_valid_tag_type, is_word_char, split_tagged, TAG_CLOSE_LEN};
use crate::subtitle_processor::Cue;
use crate::vocabulary::TermSpec;

/// One term with its compiled matcher.
///
/// The pattern captures one character either side of the match so the
/// boundary check can look at them.
struct TermMatcher {
    term: TermSpec,
    regex: Regex,
}

impl TermMatcher {
    fn new(term: TermSpec) -> Result<Self> {
        let pattern = format!(r"(?i)(.?)\b({})\b(.?)", regex::escape(term.value.trim()));
        let regex = Regex::new(&pattern)
            .with_context(|| format!("Failed to build matcher for term '{}'", term.value))?;

        Ok(Self { term, regex })
    }

    /// Wrap every free-standing match outside existing tags
    fn wrap(&self, text: &str) -> String {
        split_tagged(text)
            .into_iter()
            .enumerate()
            .map(|(i, part)| {
                if i % 2 == 1 {
                    part.to_string()
                } else {
                    self.wrap_untagged(part)
                }
            })
            .collect()
    }

    fn wrap_untagged(&self, text: &str) -> String {
        self.regex
            .replace_all(text, |caps: &Captures| {
                let before = &caps[1];
                let after = &caps[3];

                // a word character on either side means the match sits inside a longer word
                let inside_word = before.chars().next().is_some_and(is_word_char)
                    || after.chars().next().is_some_and(is_word_char);
                if inside_word {
                    return caps[0].to_string();
                }

                format!("{}<c.{}>{}</c>{}", before, self.term.tag_type, &caps[2], after)
            })
            .into_owned()
    }
}

/// Inserts tag markup for a fixed, ordered list of terms
pub struct AutoTagger {
    matchers: Vec<TermMatcher>,
}

impl AutoTagger {
    /// Compile matchers for the terms, keeping their order.
    ///
    /// Terms that cannot be represented in tag markup are skipped.
    pub fn new<I>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = TermSpec>,
    {
        let mut matchers = Vec::new();

        for term in terms {
            if !is_taggable_value(&term.value) || !is_valid_tag_type(&term.tag_type) {
                warn!("Skipping term '{}' ({}): not representable as a tag", term.value, term.tag_type);
                continue;
            }
            matchers.push(TermMatcher::new(term)?);
        }

        debug!("Auto-tagger ready with {} terms", matchers.len());
        Ok(Self { matchers })
    }

    pub fn term_count(&self) -> usize {
        self.matchers.len()
    }

    /// Apply every term to the text, in order
    pub fn tag_text(&self, text: &str) -> String {
        self.matchers
            .iter()
            .fold(text.to_string(), |text, matcher| matcher.wrap(&text))
    }

    /// Tag each cue, then tag terms split across adjacent cues.
    ///
    /// For each adjacent pair the untagged tail of the previous cue and the
    /// untagged head of the current cue are joined with a space and tagged
    /// again. When that inserts markup, the result is split back assuming a
    /// single tag whose closing marker lands in the current cue.
    pub fn tag_cues(&self, cues: &[Cue]) -> Vec<Cue> {
        let mut tagged: Vec<Cue> = cues
            .iter()
            .map(|cue| Cue::new(cue.start_ms, cue.end_ms, self.tag_text(&cue.text)))
            .collect();

        for i in 1..tagged.len() {
            let (head, tail) = tagged.split_at_mut(i);
            self.stitch(&mut head[i - 1], &mut tail[0]);
        }

        tagged
    }

    fn stitch(&self, previous: &mut Cue, current: &mut Cue) {
        let mut previous_parts: Vec<String> = split_tagged(&previous.text).into_iter().map(String::from).collect();
        let mut current_parts: Vec<String> = split_tagged(&current.text).into_iter().map(String::from).collect();

        let previous_tail = previous_parts.last().map(String::as_str).unwrap_or_default();
        let span = format!("{} {}", previous_tail, current_parts[0]);
        let joined = self.tag_text(&span);

        let joined_len = joined.chars().count();
        if joined_len <= span.chars().count() {
            return;
        }

        let current_len = current_parts[0].chars().count() + TAG_CLOSE_LEN;
        let split_at = joined
            .char_indices()
            .nth(joined_len.saturating_sub(current_len))
            .map(|(idx, _)| idx)
            .unwrap_or(joined.len());

        debug!("Tagged term across cues at {} ms", current.start_ms);

        if let Some(last) = previous_parts.last_mut() {
            *last = joined[..split_at].to_string();
        }
        current_parts[0] = joined[split_at..].to_string();

        previous.text = previous_parts.concat().trim().to_string();
        current.text = current_parts.concat().trim().to_string();
    }
}

/// Wrap one term wherever it appears as a whole word outside existing tags
pub fn wrap_term(text: &str, term_value: &str, term_type: &str) -> Result<String> {
    let tagger = AutoTagger::new([TermSpec::new(term_value, term_type)])?;
    Ok(tagger.tag_text(text))
}

/// Apply each term in order to plain text
pub fn auto_tag_text(text: &str, terms: &[TermSpec]) -> Result<String> {
    Ok(AutoTagger::new(terms.iter().cloned())?.tag_text(text))
}

/// Tag a cue sequence, including terms split across cue boundaries
pub fn auto_tag_cues(cues: &[Cue], terms: &[TermSpec]) -> Result<Vec<Cue>> {
    Ok(AutoTagger::new(terms.iter().cloned())?.tag_cues(cues))
}
