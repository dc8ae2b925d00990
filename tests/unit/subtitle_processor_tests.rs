/*!
 * Tests for subtitle file reading and writing
 */

use anyhow::Result;

use colloquial::errors::SubtitleError;
use colloquial::subtitle_processor::{Cue, CueSource, SubtitleDocument, SubtitleFormat};
use crate::common;

/// Test reading a file and writing it back unchanged
#[test]
fn test_fromFile_withNumberedVtt_shouldWriteBackIdentically() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "korero.vtt", common::TAGGED_VTT)?;
    let output = temp_dir.path().join("copy/korero.vtt");

    let document = SubtitleDocument::from_file(&input)?;
    document.write_to_vtt(&output)?;

    assert_eq!(document.format, SubtitleFormat::WebVtt);
    assert_eq!(document.cues.len(), 3);
    assert_eq!(std::fs::read_to_string(output)?, common::TAGGED_VTT);
    Ok(())
}

/// Test header metadata, comment blocks and a byte order mark are skipped
#[test]
fn test_parse_withBomAndCommentBlocks_shouldOnlyReadCues() -> Result<()> {
    let content = "\u{feff}WEBVTT - Kōrero\nKind: captions\n\nSTYLE\n::cue { color: white }\n\nNOTE reviewed\n\n00:01.000 --> 00:02.000 line:0\nKia ora\n";

    let document = SubtitleDocument::parse(content)?;

    assert_eq!(document.cues, vec![Cue::new(1_000, 2_000, "Kia ora")]);
    Ok(())
}

/// Test an SRT file converts to numbered WebVTT
#[test]
fn test_parse_withSrt_shouldRenderAsVtt() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:04,000\nKo Hohepa tēnei\n\n2\n00:00:05,000 --> 00:00:09,000\nNō Panguru\n";

    let document = SubtitleDocument::parse(content)?;

    assert_eq!(document.format, SubtitleFormat::Srt);
    assert_eq!(
        document.to_vtt(),
        "WEBVTT\n\n1\n00:00:01.000 --> 00:00:04.000\nKo Hohepa tēnei\n\n2\n00:00:05.000 --> 00:00:09.000\nNō Panguru\n"
    );
    Ok(())
}

/// Test one bad timing line fails the whole file
#[test]
fn test_parse_withOneBadCue_shouldReturnNoPartialResult() {
    let content = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nKia ora\n\n00:00:xx.000 --> 00:00:03.000\nKa kite\n";

    let result = SubtitleDocument::parse(content);

    assert!(matches!(result, Err(SubtitleError::InvalidTiming { line: 6, .. })));
}

/// Test the document is a cue source
#[test]
fn test_cues_fromDocument_shouldReturnFileOrder() -> Result<()> {
    let document = SubtitleDocument::parse(common::PLAIN_VTT)?;

    let cues = document.cues()?;

    let starts: Vec<u64> = cues.iter().map(|c| c.start_ms).collect();
    assert_eq!(starts, vec![92, 10_681, 15_975]);
    Ok(())
}
