/*!
 * Tests for file and folder utilities
 */

use std::path::PathBuf;
use anyhow::Result;
use audiodesc::file_utils::{FileManager, FileType};
use crate::common;

#[test]
fn test_generate_output_path_shouldInsertLocaleAndExtension() {
    let path = FileManager::generate_output_path(
        PathBuf::from("/captions/lesson.ttml"),
        PathBuf::from("/out"),
        "en-US",
        "wav",
    );

    assert_eq!(path, PathBuf::from("/out/lesson.en-US.wav"));
}

#[test]
fn test_ensure_dir_shouldCreateMissingDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    assert!(!FileManager::dir_exists(&nested));
    FileManager::ensure_dir(&nested)?;
    assert!(FileManager::dir_exists(&nested));

    Ok(())
}

#[test]
fn test_find_files_shouldMatchExtensionsCaseInsensitively() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    common::create_test_file(&dir, "one.ttml", "<tt/>")?;
    common::create_test_file(&dir, "two.DFXP", "<tt/>")?;
    common::create_test_file(&dir, "three.txt", "not timed text")?;

    let mut found = FileManager::find_files(&dir, &["ttml", "dfxp"])?;
    found.sort();

    assert_eq!(found.len(), 2);
    Ok(())
}

#[test]
fn test_read_write_roundTrip_shouldPreserveContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("doc.ttml");

    FileManager::write_to_file(&path, common::SAMPLE_DOCUMENT)?;
    let content = FileManager::read_to_string(&path)?;

    assert_eq!(content, common::SAMPLE_DOCUMENT);
    Ok(())
}

#[test]
fn test_detect_file_type_withTimedTextExtension_shouldDetect() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let path = common::create_test_document(&dir, "doc.ttml")?;
    assert_eq!(FileManager::detect_file_type(&path)?, FileType::TimedText);

    Ok(())
}

#[test]
fn test_detect_file_type_withUnknownExtension_shouldSniffContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let timed = common::create_test_file(&dir, "doc.sub", common::SAMPLE_DOCUMENT)?;
    assert_eq!(FileManager::detect_file_type(&timed)?, FileType::TimedText);

    let plain = common::create_test_file(&dir, "notes.txt", "just some notes")?;
    assert_eq!(FileManager::detect_file_type(&plain)?, FileType::Unknown);

    Ok(())
}

#[test]
fn test_detect_file_type_withWavExtension_shouldDetectWaveform() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let path = common::create_test_file(&dir, "audio.wav", "")?;
    assert_eq!(FileManager::detect_file_type(&path)?, FileType::Waveform);

    Ok(())
}

#[test]
fn test_detect_file_type_withMissingFile_shouldFail() {
    assert!(FileManager::detect_file_type("/no/such/file.ttml").is_err());
}
