/*!
 * Tests for error types
 */

use colloquial::errors::{AppError, SubtitleError, TranscriptError, VocabularyError};

/// Test messages of structural errors
#[test]
fn test_subtitleError_display_shouldNameLine() {
    let error = SubtitleError::InvalidTiming {
        line: 4,
        content: "bad".to_string(),
    };

    assert_eq!(error.to_string(), "Invalid cue timing at line 4: bad");
}

/// Test conversions into the umbrella error
#[test]
fn test_appError_fromVariousErrors_shouldWrapSource() {
    let error: AppError = TranscriptError::MissingSource(3).into();
    assert!(matches!(error, AppError::Transcript(TranscriptError::MissingSource(3))));
    assert_eq!(error.to_string(), "Transcript error: No transcript file for transcript 3");

    let error: AppError = VocabularyError::EmptyValue("tangata".to_string()).into();
    assert!(matches!(error, AppError::Vocabulary(_)));

    let error: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(error, AppError::File(_)));

    let error: AppError = anyhow::anyhow!("other").into();
    assert!(matches!(error, AppError::Unknown(message) if message == "other"));
}

/// Test typed errors survive a trip through anyhow
#[test]
fn test_appError_fromAnyhowWithTypedSource_shouldKeepVariant() {
    let source = anyhow::Error::from(VocabularyError::EmptyValue("kainga".to_string()))
        .context("Resolving tag at 00:00:10.681");
    let error: AppError = source.into();
    assert!(matches!(
        error,
        AppError::Vocabulary(VocabularyError::EmptyValue(ref tag_type)) if tag_type == "kainga"
    ));

    let error: AppError = anyhow::Error::from(TranscriptError::MissingSource(7)).into();
    assert!(matches!(error, AppError::Transcript(TranscriptError::MissingSource(7))));
}

/// Test untyped errors keep their context chain
#[test]
fn test_appError_fromAnyhowWithContext_shouldKeepChain() {
    let source = anyhow::anyhow!("disk full").context("Failed to save tags");
    let error: AppError = source.into();

    assert!(matches!(error, AppError::Unknown(ref message) if message == "Failed to save tags: disk full"));
}
