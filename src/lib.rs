/*!
 * # Colloquial - tagging proper nouns and colloquialisms in transcripts
 *
 * A Rust library for marking up subtitle transcripts with typed tags such as
 * `<c.tangata>Hohepa</c>`, collecting every tagged term with its timestamp, and
 * scoring how unusual each occurrence is.
 *
 * ## Features
 *
 * - Read WebVTT and SRT subtitle files
 * - Auto-tag known vocabulary, including terms split across two cues
 * - Parse tags into timed occurrences, collecting per-tag errors
 * - Score occurrence uniqueness from the tag history
 * - Persist vocabulary, transcripts and tags in SQLite
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `tagging`: markup handling, tag scanning, transcript parsing and auto-tagging
 * - `uniqueness`: occurrence uniqueness scores
 * - `vocabulary`: vocabulary entries and the lookup seam
 * - `transcript`: the tagging workflow for a stored transcript and tag summaries
 * - `subtitle_processor`: subtitle file handling
 * - `database`: SQLite persistence
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod subtitle_processor;
pub mod tagging;
pub mod transcript;
pub mod uniqueness;
pub mod vocabulary;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use subtitle_processor::{Cue, CueSource, SubtitleDocument};
pub use tagging::{AutoTagger, Occurrence, ParseError, ParseOutcome, TranscriptParser};
pub use transcript::{TagSummary, Transcript};
pub use uniqueness::{score_uniqueness, HistoryEntry, UniquenessScorer};
pub use vocabulary::{InMemoryVocabulary, TermSpec, VocabularyEntry, VocabularyLookup};
pub use language_utils::{language_codes_match, normalize_language_code, get_language_name};
pub use errors::{AppError, SubtitleError, TranscriptError, VocabularyError};
