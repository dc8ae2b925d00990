/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;

use colloquial::app_config::{Config, LogLevel, TagTypeConfig};
use crate::common;

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.language, "mi");
    assert_eq!(config.valid_types(), vec!["tangata", "iwihapu", "kainga", "ingoaarohe", "kirehu", "korerorero"]);
    assert_eq!(config.auto_tag_types(), config.valid_types());
    assert!(config.abort_on_errors);
    assert!(config.database_path().is_none());
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_configValidation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.language = "mao".to_string();
    assert!(config.validate().is_ok());

    config.tag_types.push(TagTypeConfig::new("tangata", "Again"));
    assert!(config.validate().is_err());
    config.tag_types.pop();

    config.tag_types.push(TagTypeConfig::new("wāhi", ""));
    assert!(config.validate().is_err());
    config.tag_types.pop();

    config.tag_types.clear();
    assert!(config.validate().is_err());
}

/// Test labels and auto-tag eligibility
#[test]
fn test_tagTypes_withDisabledAutoTag_shouldExcludeFromAutoTagTypes() {
    let mut config = Config::default();
    config.tag_types = vec![TagTypeConfig::new("tangata", "Tangata"), TagTypeConfig::new("kirehu", "")];
    config.tag_types[1].auto_tag = false;

    assert_eq!(config.auto_tag_types(), vec!["tangata"]);
    assert_eq!(config.type_label("tangata"), "Tangata");
    assert_eq!(config.type_label("kirehu"), "kirehu");
    assert_eq!(config.type_label("unknown"), "unknown");
}

/// Test a missing file is created with defaults and read back
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded.language, created.language);
    assert_eq!(loaded.tag_types, created.tag_types);
    Ok(())
}

/// Test missing fields fall back to defaults
#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "language": "en", "tag_types": [{ "name": "place" }], "log_level": "debug" }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.language, "en");
    assert_eq!(config.tag_types[0].label(), "place");
    assert!(config.tag_types[0].auto_tag);
    assert!(config.abort_on_errors);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Test an unreadable file is an error
#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}
