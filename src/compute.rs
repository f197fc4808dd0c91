/// Per-frame game rules.
///
/// Player movement and life bookkeeping, falling-object spawning and motion,
/// off-screen cleanup and collision resolution. Nothing here touches the
/// terminal; all randomness comes through an injected `Rng`.
use rand::Rng;
use tracing::debug;

use crate::config::GameConfig;
use crate::entities::{
    Directions, Falling, FallingKind, GameStatus, MatchState, Player, PlayerSlot, Playfield,
    Rect,
};

// ── Geometry ─────────────────────────────────────────────────────────────────

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict axis-aligned overlap: rectangles that only share an edge do
    /// not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

impl Player {
    pub fn new(slot: PlayerSlot, config: &GameConfig) -> Self {
        let pc = &config.players[slot.index()];
        Player {
            slot,
            rect: Rect::new(
                pc.start_x,
                pc.start_y,
                config.player_size.width,
                config.player_size.height,
            ),
            start: (pc.start_x, pc.start_y),
            horizontal_speed: config.player_horizontal_speed,
            vertical_speed: config.player_vertical_speed,
            lives: config.starting_lives,
            starting_lives: config.starting_lives,
            name: pc.name.clone(),
            color: pc.color,
        }
    }

    /// Apply each axis of the displacement only if that axis stays inside
    /// the playfield. A rejected x does not block y, and vice versa.
    pub fn move_by(&mut self, dx: i32, dy: i32, field: Playfield) {
        // An overflowing sum is as out of bounds as any other.
        if let Some(new_x) = self.rect.x.checked_add(dx) {
            if (0..=field.width - self.rect.width).contains(&new_x) {
                self.rect.x = new_x;
            }
        }
        if let Some(new_y) = self.rect.y.checked_add(dy) {
            if (0..=field.height - self.rect.height).contains(&new_y) {
                self.rect.y = new_y;
            }
        }
    }

    /// No-op at zero lives.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn gain_life(&mut self) {
        self.lives += 1;
    }

    pub fn reset(&mut self) {
        self.rect.x = self.start.0;
        self.rect.y = self.start.1;
        self.lives = self.starting_lives;
    }

    /// Turn held direction keys into moves, one axis step per key.
    pub fn steer(&mut self, keys: &Directions, field: Playfield) {
        if keys.left {
            self.move_by(-self.horizontal_speed, 0, field);
        }
        if keys.right {
            self.move_by(self.horizontal_speed, 0, field);
        }
        if keys.up {
            self.move_by(0, -self.vertical_speed, field);
        }
        if keys.down {
            self.move_by(0, self.vertical_speed, field);
        }
    }
}

// ── Falling objects ──────────────────────────────────────────────────────────

impl Falling {
    /// A new obstacle at a random column along the top edge.
    pub fn obstacle(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let size = config.obstacle_size;
        let x = rng.gen_range(0..=config.field.width - size.width);
        Falling {
            kind: FallingKind::Obstacle,
            rect: Rect::new(x, 0, size.width, size.height),
            speed: config.obstacle_speed,
        }
    }

    /// A new bonus anywhere in the upper half of the playfield.
    pub fn bonus(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let size = config.bonus_size;
        let x = rng.gen_range(0..=config.field.width - size.width);
        let y = rng.gen_range(0..=config.field.height / 2);
        Falling {
            kind: FallingKind::Bonus,
            rect: Rect::new(x, y, size.width, size.height),
            speed: config.bonus_speed,
        }
    }

    pub fn update(&mut self) {
        self.rect.y += self.speed;
    }

    /// True once the top edge has passed the bottom of the playfield.
    pub fn is_offscreen(&self, field: Playfield) -> bool {
        self.rect.y > field.height
    }
}

// ── Match state ──────────────────────────────────────────────────────────────

impl MatchState {
    pub fn new(config: &GameConfig) -> Self {
        MatchState {
            players: [
                Player::new(PlayerSlot::One, config),
                Player::new(PlayerSlot::Two, config),
            ],
            obstacles: Vec::new(),
            bonuses: Vec::new(),
            score: 0,
            flash_frames: 0,
            flash_color: None,
            status: GameStatus::Running,
            frame: 0,
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> &Player {
        &self.players[slot.index()]
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut Player {
        &mut self.players[slot.index()]
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    /// Back to a fresh match: players reset, field cleared, score zeroed.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.reset();
        }
        self.obstacles.clear();
        self.bonuses.clear();
        self.score = 0;
        self.flash_frames = 0;
        self.flash_color = None;
        self.status = GameStatus::Running;
        self.frame = 0;
    }
}

// ── Per-frame steps ──────────────────────────────────────────────────────────

pub fn apply_input(state: &mut MatchState, players: &[Directions; 2], field: Playfield) {
    for (player, keys) in state.players.iter_mut().zip(players) {
        player.steer(keys, field);
    }
}

/// Which kinds spawned during one `spawn_step`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Spawned {
    pub obstacle: bool,
    pub bonus: bool,
}

/// Roll independently for an obstacle and a bonus; each spawns when its
/// roll in `1..=odds` comes up 1.
pub fn spawn_step(state: &mut MatchState, config: &GameConfig, rng: &mut impl Rng) -> Spawned {
    let mut spawned = Spawned::default();
    if rng.gen_range(1..=config.obstacle_odds) == 1 {
        let obstacle = Falling::obstacle(config, rng);
        debug!(x = obstacle.rect.x, "obstacle spawned");
        state.obstacles.push(obstacle);
        spawned.obstacle = true;
    }
    if rng.gen_range(1..=config.bonus_odds) == 1 {
        let bonus = Falling::bonus(config, rng);
        debug!(x = bonus.rect.x, y = bonus.rect.y, "bonus spawned");
        state.bonuses.push(bonus);
        spawned.bonus = true;
    }
    spawned
}

pub fn move_falling(state: &mut MatchState) {
    for object in state.obstacles.iter_mut().chain(state.bonuses.iter_mut()) {
        object.update();
    }
}

/// Drop everything below the bottom edge. Each escaped obstacle is worth a
/// point; escaped bonuses are simply lost. Returns the points scored.
pub fn remove_offscreen(state: &mut MatchState, field: Playfield) -> u32 {
    let before = state.obstacles.len();
    state.obstacles.retain(|o| !o.is_offscreen(field));
    let escaped = (before - state.obstacles.len()) as u32;
    state.score += escaped;

    state.bonuses.retain(|b| !b.is_offscreen(field));
    escaped
}

/// What one collision pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// One entry per obstacle removed, naming the player it hit.
    pub hits: Vec<PlayerSlot>,
    /// One entry per (bonus, player) claim.
    pub claims: Vec<PlayerSlot>,
    /// First player to reach zero lives during the pass.
    pub loser: Option<PlayerSlot>,
}

/// Resolve player contact with obstacles and bonuses.
///
/// Every object is evaluated exactly once against the players' positions as
/// they stand, and removals happen after the pass. An obstacle is consumed
/// by the first player (in slot order) it overlaps, so it can cost at most
/// one life. A bonus is granted to every player it overlaps and removed
/// once. Once a player hits zero lives the match is decided; bonuses are
/// not handed out after that.
pub fn resolve_collisions(state: &mut MatchState, flash_frames: u32) -> CollisionReport {
    let mut report = CollisionReport::default();

    let hits: Vec<(usize, PlayerSlot)> = state
        .obstacles
        .iter()
        .enumerate()
        .filter_map(|(i, obstacle)| {
            state
                .players
                .iter()
                .find(|p| p.rect.overlaps(&obstacle.rect))
                .map(|p| (i, p.slot))
        })
        .collect();

    for &(_, slot) in &hits {
        let player = state.player_mut(slot);
        player.lose_life();
        let (lives, color) = (player.lives, player.color);
        debug!(?slot, lives, "obstacle hit");

        state.flash_frames = flash_frames;
        state.flash_color = Some(color);
        report.hits.push(slot);

        if lives == 0 && report.loser.is_none() {
            report.loser = Some(slot);
        }
    }
    remove_indices(&mut state.obstacles, hits.iter().map(|&(i, _)| i));

    if report.loser.is_some() {
        return report;
    }

    let mut claimed = Vec::new();
    for (i, bonus) in state.bonuses.iter().enumerate() {
        let mut taken = false;
        for player in &state.players {
            if player.rect.overlaps(&bonus.rect) {
                report.claims.push(player.slot);
                taken = true;
            }
        }
        if taken {
            claimed.push(i);
        }
    }
    for &slot in &report.claims {
        state.player_mut(slot).gain_life();
        debug!(?slot, "bonus collected");
    }
    remove_indices(&mut state.bonuses, claimed.into_iter());

    report
}

/// Remove the given (ascending, unique) indices in one pass.
fn remove_indices(items: &mut Vec<Falling>, indices: impl Iterator<Item = usize>) {
    let mut doomed = indices.peekable();
    let mut i = 0;
    items.retain(|_| {
        let keep = doomed.peek() != Some(&i);
        if !keep {
            doomed.next();
        }
        i += 1;
        keep
    });
}
