/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::PathBuf;

use colloquial::file_utils::FileManager;
use crate::common;

/// Test subtitle extension detection
#[test]
fn test_isSubtitleFile_withVariousExtensions_shouldMatchVttAndSrt() {
    assert!(FileManager::is_subtitle_file("korero.vtt"));
    assert!(FileManager::is_subtitle_file("KORERO.SRT"));
    assert!(!FileManager::is_subtitle_file("korero.txt"));
    assert!(!FileManager::is_subtitle_file("korero"));
}

/// Test the output name of an auto-tagged copy
#[test]
fn test_generateTaggedPath_withSrtInput_shouldWriteVttNextToInput() {
    let path = FileManager::generate_tagged_path("/data/korero.srt");
    assert_eq!(path, PathBuf::from("/data/korero.tagged.vtt"));
}

/// Test recursive subtitle discovery
#[test]
fn test_findSubtitleFiles_withNestedDirectories_shouldReturnSortedSubtitles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "b.vtt", common::PLAIN_VTT)?;
    common::create_test_file(root, "nested/a.srt", "")?;
    common::create_test_file(root, "notes.txt", "")?;

    let files = FileManager::find_subtitle_files(root)?;

    assert_eq!(files, vec![root.join("b.vtt"), root.join("nested/a.srt")]);
    Ok(())
}

/// Test writing creates missing parent directories
#[test]
fn test_writeToFile_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out/tagged/korero.vtt");

    FileManager::write_to_file(&path, "WEBVTT\n")?;

    assert!(FileManager::file_exists(&path));
    assert_eq!(FileManager::read_to_string(&path)?, "WEBVTT\n");
    Ok(())
}

/// Test reading a missing file
#[test]
fn test_readToString_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(FileManager::read_to_string(temp_dir.path().join("missing.vtt")).is_err());
    Ok(())
}
