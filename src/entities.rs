/// All game entity types — pure data, no logic.
use serde::{Deserialize, Serialize};

/// An opaque RGB colour. The front end decides how to show it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Width and height of the area every entity lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: i32,
    pub height: i32,
}

/// Top-left position plus bounding box. Every entity is one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    /// The named player ran out of lives.
    GameOver(PlayerSlot),
    Terminated,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub slot: PlayerSlot,
    pub rect: Rect,
    /// Top-left corner restored by `reset`.
    pub start: (i32, i32),
    pub horizontal_speed: i32,
    pub vertical_speed: i32,
    pub lives: u32,
    /// Lives restored by `reset`.
    pub starting_lives: u32,
    pub name: String,
    pub color: Rgb,
}

// ── Falling objects ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallingKind {
    /// Costs a life on contact; scores a point when it leaves the bottom.
    Obstacle,
    /// Grants a life to every player touching it.
    Bonus,
}

/// An obstacle or a bonus. Only `rect.y` changes after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Falling {
    pub kind: FallingKind,
    pub rect: Rect,
    /// Downward movement per frame.
    pub speed: i32,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Movement keys held by one player during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Directions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Everything the loop needs to know about the keyboard for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub players: [Directions; 2],
    /// Window-close equivalent.
    pub quit: bool,
    /// Exit-to-desktop.
    pub exit: bool,
    pub restart: bool,
}

// ── Master match state ────────────────────────────────────────────────────────

/// The entire state of one match, owned by the game loop.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchState {
    pub players: [Player; 2],
    /// Active obstacles, oldest first.
    pub obstacles: Vec<Falling>,
    /// Active bonuses, oldest first.
    pub bonuses: Vec<Falling>,
    /// Obstacles that made it past the bottom edge.
    pub score: u32,
    /// Frames of collision flash left to show.
    pub flash_frames: u32,
    /// Colour of the player hit most recently.
    pub flash_color: Option<Rgb>,
    pub status: GameStatus,
    pub frame: u64,
}
