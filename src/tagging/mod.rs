/*!
 * Colloquialism tagging for subtitle transcripts.
 *
 * Tags are written in cue text as `<c.TYPE>value</c>`. This module is split
 * into several submodules:
 *
 * - `markup`: Stripping voice spans and tags, word characters
 * - `scanner`: Finding tags and their relative positions within one cue
 * - `parser`: Turning tags across a cue sequence into timestamped occurrences
 * - `auto_tag`: Inserting tags for known vocabulary terms
 */

// Re-export main types for easier usage
pub use self::auto_tag::{auto_tag_cues, auto_tag_text, wrap_term, AutoTagger};
pub use self::markup::{split_tagged, strip_tags, strip_voice_spans};
pub use self::parser::{parse_cues, Occurrence, ParseError, ParseOutcome, TranscriptParser};
pub use self::scanner::{scan_tags, ScannedTag, TagScanner};

// Submodules
pub mod auto_tag;
pub mod markup;
pub mod parser;
pub mod scanner;
