/*!
 * Integration tests for auto-tagging and parsing whole transcripts
 */

use anyhow::Result;

use colloquial::subtitle_processor::SubtitleDocument;
use colloquial::tagging::{auto_tag_cues, parse_cues, strip_tags, AutoTagger};
use colloquial::transcript::Transcript;
use colloquial::uniqueness::{score_uniqueness, HistoryEntry};
use colloquial::vocabulary::{InMemoryVocabulary, VocabularyLookup};
use crate::common;

const TYPES: [&str; 3] = ["tangata", "iwihapu", "kainga"];

/// Test auto-tagging a plain file produces the hand-tagged file
#[test]
fn test_autoTag_withPlainTranscript_shouldMatchTaggedTranscript() -> Result<()> {
    common::init_logging();
    let document = SubtitleDocument::parse(common::PLAIN_VTT)?;

    let tagged = auto_tag_cues(&document.cues, &common::sample_terms())?;

    assert_eq!(SubtitleDocument::from_cues(tagged).to_vtt(), common::TAGGED_VTT);
    Ok(())
}

/// Test auto-tagging an already tagged file changes nothing
#[test]
fn test_autoTag_withTaggedTranscript_shouldBeIdempotent() -> Result<()> {
    let document = SubtitleDocument::parse(common::TAGGED_VTT)?;
    let tagger = AutoTagger::new(common::sample_terms())?;

    let tagged = tagger.tag_cues(&document.cues);

    assert_eq!(tagged, document.cues);
    Ok(())
}

/// Test stripping tags restores the plain file
#[test]
fn test_stripTags_withTaggedTranscript_shouldRestorePlainText() {
    assert_eq!(strip_tags(common::TAGGED_VTT), common::PLAIN_VTT);
}

/// Test parsing collects every tag with its time
#[test]
fn test_parseCues_withTaggedTranscript_shouldCollectTimedOccurrences() -> Result<()> {
    let document = SubtitleDocument::parse(common::TAGGED_VTT)?;
    let vocabulary = InMemoryVocabulary::new();

    let outcome = parse_cues(&document.cues, "mi", TYPES, &vocabulary)?;

    let found: Vec<(&str, &str, u64, u64)> = outcome
        .occurrences
        .iter()
        .map(|o| (o.vocabulary.tag_type.as_str(), o.vocabulary.display_value.as_str(), o.cue_start_ms, o.exact_ms))
        .collect();
    assert_eq!(
        found,
        vec![
            ("tangata", "Hohepa Tipene", 92, 378),
            ("iwihapu", "Te Rārawa", 92, 6_578),
            ("kainga", "Panguru", 10_681, 13_857),
        ]
    );
    assert!(outcome.errors.is_empty());
    assert_eq!(vocabulary.len(), 3);
    Ok(())
}

/// Test an unknown tag type is reported and the rest still parses
#[test]
fn test_parseCues_withUnknownType_shouldReportAndContinue() -> Result<()> {
    let document = SubtitleDocument::parse(common::TAGGED_VTT)?;
    let vocabulary = InMemoryVocabulary::new();

    let outcome = parse_cues(&document.cues, "mi", ["tangata", "kainga"], &vocabulary)?;

    assert_eq!(outcome.occurrences.len(), 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].to_string(), "Invalid tag type at 00:00:00.092 - iwihapu");
    Ok(())
}

/// Test reparsing reuses vocabulary entries
#[test]
fn test_parseCues_twice_shouldReuseVocabulary() -> Result<()> {
    let document = SubtitleDocument::parse(common::TAGGED_VTT)?;
    let vocabulary = InMemoryVocabulary::new();

    let first = parse_cues(&document.cues, "mi", TYPES, &vocabulary)?;
    let second = parse_cues(&document.cues, "mi", TYPES, &vocabulary)?;

    let ids = |o: &colloquial::ParseOutcome| o.occurrences.iter().map(|o| o.vocabulary.id).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(vocabulary.get_or_create("kainga", "mi", "PANGURU")?.id, first.occurrences[2].vocabulary.id);
    Ok(())
}

/// Test the transcript workflow from plain text to scores
#[test]
fn test_transcriptWorkflow_fromPlainText_shouldScoreOccurrences() -> Result<()> {
    let vocabulary = InMemoryVocabulary::new();
    let transcript = Transcript::new(1, "Kōrero", "mi").with_source(common::PLAIN_VTT);

    let outcome = transcript.parse_transcript(&common::sample_terms(), &TYPES, &vocabulary)?;

    let history: Vec<HistoryEntry> = outcome
        .occurrences
        .iter()
        .map(|o| HistoryEntry::new(o.vocabulary.id, o.vocabulary.tag_type.clone(), o.exact_ms))
        .collect();
    assert_eq!(history.len(), 3);
    assert_eq!(score_uniqueness(&history), vec![1.0, 1.0, 1.0]);
    Ok(())
}
