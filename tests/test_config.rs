use std::io::Write;
use std::time::Duration;

use avoid_the_police::config::*;
use avoid_the_police::entities::Rgb;

#[test]
fn defaults_match_the_classic_layout() {
    let c = GameConfig::default();
    assert_eq!((c.field.width, c.field.height), (800, 600));
    assert_eq!(c.fps, 60);
    assert_eq!(c.starting_lives, 5);
    assert_eq!((c.obstacle_speed, c.bonus_speed), (3, 2));
    assert_eq!((c.obstacle_odds, c.bonus_odds), (20, 30));
    assert_eq!(c.flash_frames, 20);
    assert_eq!(c.players[0].color, Rgb(0, 0, 255));
    assert_eq!(c.players[1].color, Rgb(173, 216, 230));
    assert!(c.validate().is_ok());
}

#[test]
fn frame_duration_follows_fps() {
    let c = GameConfig {
        fps: 50,
        ..GameConfig::default()
    };
    assert_eq!(c.frame_duration(), Duration::from_millis(20));
}

#[test]
fn partial_ron_keeps_other_defaults() {
    let c = GameConfig::from_ron_str("(obstacle_odds: 5, fps: 30)").unwrap();
    assert_eq!(c.obstacle_odds, 5);
    assert_eq!(c.fps, 30);
    assert_eq!(c.bonus_odds, 30);
    assert_eq!(c.players[0].name, "Player 1");
}

#[test]
fn ron_round_trip_preserves_config() {
    let mut c = GameConfig::default();
    c.players[1].name = "Blue Car".to_string();
    let text = c.to_ron_string().unwrap();
    assert_eq!(GameConfig::from_ron_str(&text).unwrap(), c);
}

#[test]
fn load_reads_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "(flash_frames: 40)").unwrap();
    let c = GameConfig::load(file.path()).unwrap();
    assert_eq!(c.flash_frames, 40);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GameConfig::load(&dir.path().join("nope.ron")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn malformed_ron_is_parse_error() {
    let err = GameConfig::from_ron_str("(fps: ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn zero_odds_are_rejected() {
    let err = GameConfig::from_ron_str("(bonus_odds: 0)").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn zero_fps_is_rejected() {
    let c = GameConfig {
        fps: 0,
        ..GameConfig::default()
    };
    assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn oversized_entity_is_rejected() {
    let c = GameConfig {
        obstacle_size: Size {
            width: 900,
            height: 10,
        },
        ..GameConfig::default()
    };
    let err = c.validate().unwrap_err();
    assert!(err.to_string().contains("obstacle"), "{}", err);
}

#[test]
fn start_outside_field_is_rejected() {
    let mut c = GameConfig::default();
    c.players[0].start_y = 560;
    assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn non_positive_falling_speeds_are_rejected() {
    for (obstacle_speed, bonus_speed) in [(-3, 2), (0, 2), (3, 0), (3, -1)] {
        let c = GameConfig {
            obstacle_speed,
            bonus_speed,
            ..GameConfig::default()
        };
        assert!(
            matches!(c.validate(), Err(ConfigError::Invalid(_))),
            "accepted obstacle {} bonus {}",
            obstacle_speed,
            bonus_speed
        );
    }
}

#[test]
fn negative_player_speed_is_rejected() {
    let c = GameConfig {
        player_vertical_speed: -5,
        ..GameConfig::default()
    };
    assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));

    let c = GameConfig {
        player_horizontal_speed: 0,
        ..GameConfig::default()
    };
    assert!(c.validate().is_ok());
}
