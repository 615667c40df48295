// Integration tests for loading practice settings from disk

use std::fs;

use rudiment_trainer::config::ConfigError;
use rudiment_trainer::{PracticeConfig, RampCycles};
use tempfile::tempdir;

#[test]
fn test_load_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("practice.ron");
    fs::write(
        &path,
        r#"(
    bpm: 90,
    sound_enabled: true,
    kick_enabled: true,
    auto_ramp: (enabled: true, cycles: 8),
)"#,
    )
    .unwrap();

    let config = PracticeConfig::load(&path).unwrap();
    assert_eq!(config.tempo().bpm(), 90);
    assert!(config.gate().click_enabled);
    assert!(config.gate().sound_enabled);
    assert!(config.kick_enabled);
    assert_eq!(config.ramp_state().cycles_threshold, RampCycles::Eight);
    assert!(config.ramp_state().enabled);
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.ron");

    let config = PracticeConfig {
        bpm: 150,
        include_rest: true,
        ..PracticeConfig::default()
    };
    config.save(&path).unwrap();

    assert_eq!(PracticeConfig::load(&path).unwrap(), config);
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = PracticeConfig::load(dir.path().join("absent.ron")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    fs::write(&path, "(bpm: 90, click_enabled: maybe)").unwrap();

    let err = PracticeConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
