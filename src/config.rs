/// Game configuration.
///
/// Every tunable value lives in one immutable `GameConfig` that the game loop
/// receives at construction. Defaults reproduce the classic 800×600 layout;
/// any subset of fields can be overridden from a RON file.
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entities::{Playfield, Rgb};

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const WIDTH: i32 = 800;
pub const HEIGHT: i32 = 600;
pub const FPS: u32 = 60;

pub const PLAYER_WIDTH: i32 = 40;
pub const PLAYER_HEIGHT: i32 = 80;
pub const PLAYER_SPEED: i32 = 5;
pub const STARTING_LIVES: u32 = 5;

pub const OBSTACLE_WIDTH: i32 = 40;
pub const OBSTACLE_HEIGHT: i32 = 80;
pub const OBSTACLE_SPEED: i32 = 3;
/// One obstacle spawns when a roll in `1..=OBSTACLE_ODDS` comes up 1.
pub const OBSTACLE_ODDS: u32 = 20;

pub const BONUS_SIZE: i32 = 30;
pub const BONUS_SPEED: i32 = 2;
pub const BONUS_ODDS: u32 = 30;

pub const FLASH_FRAMES: u32 = 20;

pub const BLUE: Rgb = Rgb(0, 0, 255);
pub const LIGHT_BLUE: Rgb = Rgb(173, 216, 230);

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub color: Rgb,
    /// Top-left corner at match start and after a restart.
    pub start_x: i32,
    pub start_y: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field: Playfield,
    pub fps: u32,
    pub player_size: Size,
    pub player_horizontal_speed: i32,
    pub player_vertical_speed: i32,
    pub starting_lives: u32,
    pub obstacle_size: Size,
    pub obstacle_speed: i32,
    pub obstacle_odds: u32,
    pub bonus_size: Size,
    pub bonus_speed: i32,
    pub bonus_odds: u32,
    /// Frames the collision flash stays up.
    pub flash_frames: u32,
    pub players: [PlayerConfig; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        // Players start centred 60 px either side of the middle, 120 px
        // above the bottom edge.
        let start = |center_x: i32| PlayerConfig {
            name: String::new(),
            color: BLUE,
            start_x: center_x - PLAYER_WIDTH / 2,
            start_y: HEIGHT - 120 - PLAYER_HEIGHT / 2,
        };
        Self {
            field: Playfield {
                width: WIDTH,
                height: HEIGHT,
            },
            fps: FPS,
            player_size: Size {
                width: PLAYER_WIDTH,
                height: PLAYER_HEIGHT,
            },
            player_horizontal_speed: PLAYER_SPEED,
            player_vertical_speed: PLAYER_SPEED,
            starting_lives: STARTING_LIVES,
            obstacle_size: Size {
                width: OBSTACLE_WIDTH,
                height: OBSTACLE_HEIGHT,
            },
            obstacle_speed: OBSTACLE_SPEED,
            obstacle_odds: OBSTACLE_ODDS,
            bonus_size: Size {
                width: BONUS_SIZE,
                height: BONUS_SIZE,
            },
            bonus_speed: BONUS_SPEED,
            bonus_odds: BONUS_ODDS,
            flash_frames: FLASH_FRAMES,
            players: [
                PlayerConfig {
                    name: "Player 1".to_string(),
                    ..start(WIDTH / 2 - 60)
                },
                PlayerConfig {
                    name: "Player 2".to_string(),
                    color: LIGHT_BLUE,
                    ..start(WIDTH / 2 + 60)
                },
            ],
        }
    }
}

impl GameConfig {
    /// Parse a RON document. Fields left out keep their defaults.
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be positive".into()));
        }
        if self.obstacle_odds == 0 || self.bonus_odds == 0 {
            return Err(ConfigError::Invalid("spawn odds must be positive".into()));
        }
        if self.obstacle_speed <= 0 || self.bonus_speed <= 0 {
            return Err(ConfigError::Invalid("falling speeds must be positive".into()));
        }
        if self.player_horizontal_speed < 0 || self.player_vertical_speed < 0 {
            return Err(ConfigError::Invalid("player speeds must not be negative".into()));
        }
        let sizes = [
            ("player", self.player_size),
            ("obstacle", self.obstacle_size),
            ("bonus", self.bonus_size),
        ];
        for (what, size) in sizes {
            if size.width <= 0 || size.height <= 0 {
                return Err(ConfigError::Invalid(format!("{} size must be positive", what)));
            }
            if size.width > self.field.width || size.height > self.field.height {
                return Err(ConfigError::Invalid(format!(
                    "{} ({}x{}) does not fit the {}x{} playfield",
                    what, size.width, size.height, self.field.width, self.field.height
                )));
            }
        }
        for p in &self.players {
            let max_x = self.field.width - self.player_size.width;
            let max_y = self.field.height - self.player_size.height;
            if !(0..=max_x).contains(&p.start_x) || !(0..=max_y).contains(&p.start_y) {
                return Err(ConfigError::Invalid(format!(
                    "{} starts outside the playfield at ({}, {})",
                    p.name, p.start_x, p.start_y
                )));
            }
        }
        Ok(())
    }

    /// Wall-clock budget of one frame.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}
