/*!
 * Tests for file and folder utilities
 */

use anyhow::Result;

use subspell::file_utils::FileManager;
use crate::common;

#[test]
fn test_find_subtitle_files_withMixedFolder_shouldReturnSortedSubtitles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "b.srt", common::SAMPLE_SRT)?;
    common::create_test_file(dir, "a.ASS", common::SAMPLE_ASS)?;
    common::create_test_file(dir, "nested/c.ssa", common::SAMPLE_ASS)?;
    common::create_test_file(dir, "notes.txt", "бележки")?;
    common::create_test_file(dir, "b_corrected.srt", common::SAMPLE_SRT)?;

    let files = FileManager::find_subtitle_files(dir)?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(dir).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.ASS", "b.srt", "nested/c.ssa"]);
    Ok(())
}

#[test]
fn test_append_to_log_file_withTwoCalls_shouldKeepBothEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let log_path = temp_dir.path().join("logs").join("run.issues.log");

    FileManager::append_to_log_file(&log_path, &["първи".to_string()])?;
    FileManager::append_to_log_file(&log_path, &["втори".to_string(), "трети".to_string()])?;

    let content = FileManager::read_to_string(&log_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with('[') && lines[0].ends_with("] първи"));
    assert!(lines[2].ends_with("трети"));
    Ok(())
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("deep").join("file.srt");

    FileManager::write_to_file(&path, "съдържание")?;
    assert!(FileManager::file_exists(&path));
    assert_eq!(FileManager::read_to_string(&path)?, "съдържание");
    Ok(())
}

#[test]
fn test_remove_file_if_exists_withMissingFile_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "movie_corrected.srt.issues.log", "стар запис")?;

    assert!(FileManager::remove_file_if_exists(&path)?);
    assert!(!path.exists());
    assert!(!FileManager::remove_file_if_exists(&path)?);
    Ok(())
}
