/*!
 * Error types for the colloquial library.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Per-tag problems found while parsing a transcript are not errors in this sense:
 * they are collected as `ParseError` values (see `tagging::parser`) and parsing
 * continues.
 */

use thiserror::Error;

/// Errors raised while reading a subtitle source.
///
/// Any of these aborts the whole parse: no partial results are returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// The content does not start with a `WEBVTT` signature
    #[error("Invalid WebVTT header: {0}")]
    InvalidHeader(String),

    /// A timing line could not be parsed
    #[error("Invalid cue timing at line {line}: {content}")]
    InvalidTiming {
        /// 1-based line number in the source
        line: usize,
        /// The offending line
        content: String,
    },

    /// A cue ends before it starts
    #[error("Cue at line {line} ends before it starts ({start_ms} > {end_ms})")]
    InvertedTiming {
        /// 1-based line number in the source
        line: usize,
        /// Start time in ms
        start_ms: u64,
        /// End time in ms
        end_ms: u64,
    },
}

/// Errors raised before a transcript can be processed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscriptError {
    /// The transcript has no underlying text to parse
    #[error("No transcript file for transcript {0}")]
    MissingSource(i64),

    /// No transcript with this id exists
    #[error("Transcript {0} not found")]
    NotFound(i64),
}

/// Errors raised by vocabulary lookups
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VocabularyError {
    /// A tag value that is empty once trimmed
    #[error("Empty value for tag type '{0}'")]
    EmptyValue(String),

    /// No vocabulary entry with this id exists
    #[error("Vocabulary entry {0} not found")]
    NotFound(i64),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from transcript handling
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Error from vocabulary handling
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    /// Recover a typed error from the chain, otherwise keep the full context chain
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<AppError>() {
            Ok(app) => return app,
            Err(error) => error,
        };
        let error = match error.downcast::<SubtitleError>() {
            Ok(subtitle) => return Self::Subtitle(subtitle),
            Err(error) => error,
        };
        let error = match error.downcast::<TranscriptError>() {
            Ok(transcript) => return Self::Transcript(transcript),
            Err(error) => error,
        };
        match error.downcast::<VocabularyError>() {
            Ok(vocabulary) => Self::Vocabulary(vocabulary),
            Err(error) => Self::Unknown(format!("{:#}", error)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
