//! Tests for loading game configuration from JSON files.

use delve::{DelveError, GameConfig, GameState, GeneratorVariant, MovementMode};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_config_fills_defaults() {
    let file = write_config(
        r#"{
            "variant": "maze",
            "movement": "four_way",
            "generation": { "seed": 9, "width": 31, "height": 21 }
        }"#,
    );

    let config = GameConfig::load(file.path()).unwrap();
    assert_eq!(config.variant, GeneratorVariant::Maze);
    assert_eq!(config.movement, MovementMode::FourWay);
    assert_eq!(config.generation.seed, 9);
    assert_eq!(config.generation.width, 31);
    assert_eq!(config.view_width, GameConfig::default().view_width);

    let state = GameState::new(config).unwrap();
    assert_eq!(state.level.width(), 31);
}

#[test]
fn test_saved_config_loads_back() {
    let mut config = GameConfig::new(4);
    config.cast_range = 6.0;
    let file = write_config(&serde_json::to_string_pretty(&config).unwrap());

    assert_eq!(GameConfig::load(file.path()).unwrap(), config);
}

#[test]
fn test_malformed_config_is_an_error() {
    let file = write_config("{ not json");
    assert!(matches!(
        GameConfig::load(file.path()),
        Err(DelveError::Serde(_))
    ));
}

#[test]
fn test_invalid_values_are_rejected() {
    let file = write_config(r#"{ "generation": { "room_min_size": 4 } }"#);
    assert!(matches!(
        GameConfig::load(file.path()),
        Err(DelveError::InvalidConfig(_))
    ));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");

    assert!(matches!(GameConfig::load(&missing), Err(DelveError::Io(_))));
    assert_eq!(
        GameConfig::load_or_default(Some(&missing), 17),
        GameConfig::new(17)
    );
}
