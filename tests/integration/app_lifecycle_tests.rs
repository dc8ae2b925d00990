/*!
 * Integration tests for the controller over a SQLite database file
 */

use anyhow::Result;

use colloquial::app_config::Config;
use colloquial::database::models::VocabularyUpdate;
use colloquial::errors::TranscriptError;
use colloquial::vocabulary::VocabularyLookup;
use colloquial::Controller;
use crate::common;

fn create_controller(dir: &std::path::Path) -> Result<Controller> {
    let config = Config {
        database_path: Some(dir.join("data/colloquial.db").to_string_lossy().to_string()),
        ..Config::default()
    };
    Controller::with_config(config)
}

/// Test import, tagging, storage and reporting end to end
#[tokio::test]
async fn test_controller_fullLifecycle_shouldPersistAcrossReopen() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "korero.vtt", common::PLAIN_VTT)?;

    let transcript_id = {
        let controller = create_controller(temp_dir.path())?;
        for term in common::sample_terms() {
            controller.repository().get_or_create(&term.tag_type, "mi", &term.value)?;
        }

        let imported = controller.import(&input, Some("Kōrero"), Some("mao")).await?;
        assert!(imported.created);
        assert_eq!(imported.transcript.language, "mi");

        let report = controller.process_transcript(imported.transcript.id, true).await?;
        let saved = report.saved.expect("tags should be saved");
        assert_eq!((saved.deleted, saved.inserted), (0, 3));

        imported.transcript.id
    };

    let controller = create_controller(temp_dir.path())?;

    let transcripts = controller.list_transcripts().await?;
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0].title, "Kōrero");

    let scored = controller.scores(transcript_id).await?;
    assert_eq!(scored.len(), 3);
    assert!(scored.iter().all(|s| s.uniqueness == 1.0));

    let summary = controller.summary(transcript_id).await?;
    assert_eq!(summary.types["iwihapu"].display_name, "Iwi / Hapū");
    assert!(summary.types["iwihapu"].items.contains_key("te rārawa"));
    Ok(())
}

/// Test related transcripts show up in the summary
#[tokio::test]
async fn test_summary_withSharedVocabulary_shouldListRelatedTranscripts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_test_file(temp_dir.path(), "tuatahi.vtt", common::TAGGED_VTT)?;
    let second = common::create_test_file(
        temp_dir.path(),
        "tuarua.vtt",
        "WEBVTT\n\n00:00:02.000 --> 00:00:04.000\n<c.kainga>Panguru</c> tōku kāinga\n",
    )?;
    let controller = create_controller(temp_dir.path())?;

    let first_id = controller.import(&first, None, None).await?.transcript.id;
    let second_id = controller.import(&second, None, None).await?.transcript.id;
    controller.process_transcript(first_id, true).await?;
    controller.process_transcript(second_id, true).await?;

    let summary = controller.summary(first_id).await?;

    let related = &summary.types["kainga"].items["panguru"].related;
    assert_eq!(related.len(), 1);
    assert_eq!(related[&second_id].title, "tuarua");
    assert_eq!(related[&second_id].occurrences[0].time, 2.0);
    assert!(summary.types["tangata"].items["hohepa tipene"].related.is_empty());
    Ok(())
}

/// Test disabling auto-tag for an entry keeps it out of the next run
#[tokio::test]
async fn test_updateVocabulary_withAutoTagDisabled_shouldSkipEntryWhenProcessing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "korero.vtt", common::PLAIN_VTT)?;
    let controller = create_controller(temp_dir.path())?;
    let panguru = controller.repository().get_or_create("kainga", "mi", "Panguru")?;

    let updated = controller
        .update_vocabulary(panguru.id, VocabularyUpdate { meaning: Some("he kāinga".to_string()), allow_auto_tag: Some(false) })
        .await?;
    let id = controller.import(&input, None, None).await?.transcript.id;
    let report = controller.process_transcript(id, false).await?;

    assert_eq!(updated.meaning, "he kāinga");
    assert!(!updated.allow_auto_tag);
    assert!(report.outcome.occurrences.is_empty());
    assert_eq!(controller.list_vocabulary(Some("kainga")).await?.len(), 1);
    Ok(())
}

/// Test a transcript without stored text cannot be processed
#[tokio::test]
async fn test_processTranscript_withMissingTranscript_shouldReportNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = create_controller(temp_dir.path())?;

    let err = controller.process_transcript(9, true).await.unwrap_err();

    assert!(matches!(err.downcast_ref::<TranscriptError>(), Some(TranscriptError::NotFound(9))));
    Ok(())
}
