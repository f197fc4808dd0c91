/// Rendering layer — all terminal output lives here.
///
/// Playfield coordinates are scaled onto whatever terminal size we have:
/// the top `HUD_ROWS` rows hold the score and lives, the rest is the road.
/// No game logic is performed; this module only translates state into
/// terminal commands.
use std::io::Write;
use std::path::Path;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use avoid_the_police::assets::{load_sprite_or_blank, Sprite};
use avoid_the_police::config::{GameConfig, Size};
use avoid_the_police::entities::{
    GameStatus, MatchState, Player, PlayerSlot, Playfield, Rgb,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_ROAD: Color = Color::Rgb { r: 48, g: 48, b: 52 };
const C_ROAD_MARKS: Color = Color::Rgb { r: 200, g: 200, b: 200 };
const C_OBSTACLE: Color = Color::Red;
const C_BONUS: Color = Color::Yellow;
const C_HUD_SCORE: Color = Color::White;
const C_GAME_OVER_BG: Rgb = Rgb(169, 169, 169);
const C_GAME_OVER_TITLE: Rgb = Rgb(128, 0, 0);
const C_GAME_OVER_HINT: Rgb = Rgb(0, 0, 0);

pub const HUD_ROWS: u16 = 3;

fn rgb(c: Rgb) -> Color {
    Color::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── Playfield → terminal mapping ──────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    fn play_rows(&self) -> i32 {
        self.rows.saturating_sub(HUD_ROWS).max(1) as i32
    }

    pub fn col(&self, x: i32, field: Playfield) -> i32 {
        x * self.cols as i32 / field.width
    }

    pub fn row(&self, y: i32, field: Playfield) -> i32 {
        HUD_ROWS as i32 + y * self.play_rows() / field.height
    }

    /// Cell footprint of an entity, never smaller than one cell.
    pub fn cells(&self, size: Size, field: Playfield) -> (usize, usize) {
        let w = (size.width * self.cols as i32 / field.width).max(1);
        let h = (size.height * self.play_rows() / field.height).max(1);
        (w as usize, h as usize)
    }
}

// ── Sprites ───────────────────────────────────────────────────────────────────

pub struct SpriteSet {
    pub players: [Sprite; 2],
    pub obstacle: Sprite,
    pub bonus: Sprite,
    pub background: Sprite,
}

impl SpriteSet {
    /// Load every sprite at the size it will be drawn on this viewport.
    pub fn load(dir: &Path, config: &GameConfig, view: Viewport) -> Self {
        let field = config.field;
        let (pw, ph) = view.cells(config.player_size, field);
        let (ow, oh) = view.cells(config.obstacle_size, field);
        let (bw, bh) = view.cells(config.bonus_size, field);
        SpriteSet {
            players: [
                load_sprite_or_blank(&dir.join("player1.txt"), pw, ph),
                load_sprite_or_blank(&dir.join("player2.txt"), pw, ph),
            ],
            obstacle: load_sprite_or_blank(&dir.join("obstacle.txt"), ow, oh),
            bonus: load_sprite_or_blank(&dir.join("bonus.txt"), bw, bh),
            background: load_sprite_or_blank(
                &dir.join("background.txt"),
                view.cols as usize,
                view.play_rows() as usize,
            ),
        }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &MatchState,
    config: &GameConfig,
    sprites: &SpriteSet,
    view: Viewport,
) -> std::io::Result<()> {
    out.queue(style::ResetColor)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    match state.status {
        GameStatus::GameOver(loser) => draw_game_over(out, state.player(loser), view)?,
        _ => {
            let road = draw_road(out, state, sprites, view)?;
            let field = config.field;
            for obstacle in &state.obstacles {
                let (c, r) = (view.col(obstacle.rect.x, field), view.row(obstacle.rect.y, field));
                draw_sprite(out, &sprites.obstacle, c, r, C_OBSTACLE, road, view)?;
            }
            for bonus in &state.bonuses {
                let (c, r) = (view.col(bonus.rect.x, field), view.row(bonus.rect.y, field));
                draw_sprite(out, &sprites.bonus, c, r, C_BONUS, road, view)?;
            }
            for player in &state.players {
                draw_player(out, player, &sprites.players[player.slot.index()], field, road, view)?;
            }
            out.queue(style::ResetColor)?;
            draw_hud(out, state)?;
        }
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Road ──────────────────────────────────────────────────────────────────────

/// Fill the playfield and return the background colour entities sit on.
/// While the collision flash is up the whole road turns the hit player's
/// colour.
fn draw_road<W: Write>(
    out: &mut W,
    state: &MatchState,
    sprites: &SpriteSet,
    view: Viewport,
) -> std::io::Result<Color> {
    let flash = match (state.flash_frames, state.flash_color) {
        (n, Some(color)) if n > 0 => Some(rgb(color)),
        _ => None,
    };
    let bg = flash.unwrap_or(C_ROAD);
    let blank_row = " ".repeat(view.cols as usize);

    out.queue(style::SetBackgroundColor(bg))?;
    out.queue(style::SetForegroundColor(C_ROAD_MARKS))?;
    let mut marks = sprites.background.rows();
    for row in HUD_ROWS..view.rows {
        out.queue(cursor::MoveTo(0, row))?;
        match marks.next() {
            Some(line) if flash.is_none() => {
                out.queue(Print(line.iter().collect::<String>()))?;
            }
            _ => {
                out.queue(Print(&blank_row))?;
            }
        }
    }
    Ok(bg)
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// Draw `sprite` with its top-left cell at (`col`, `row`), clipped to the
/// playfield. A placeholder sprite is drawn as a solid block of `color`.
fn draw_sprite<W: Write>(
    out: &mut W,
    sprite: &Sprite,
    col: i32,
    row: i32,
    color: Color,
    bg: Color,
    view: Viewport,
) -> std::io::Result<()> {
    for (dy, line) in sprite.rows().enumerate() {
        let r = row + dy as i32;
        if r < HUD_ROWS as i32 || r >= view.rows as i32 {
            continue;
        }
        for (dx, &ch) in line.iter().enumerate() {
            let c = col + dx as i32;
            if c < 0 || c >= view.cols as i32 {
                continue;
            }
            if sprite.is_placeholder() {
                out.queue(cursor::MoveTo(c as u16, r as u16))?;
                out.queue(style::SetBackgroundColor(color))?;
                out.queue(Print(' '))?;
                out.queue(style::SetBackgroundColor(bg))?;
            } else if ch != ' ' {
                out.queue(cursor::MoveTo(c as u16, r as u16))?;
                out.queue(style::SetForegroundColor(color))?;
                out.queue(Print(ch))?;
            }
        }
    }
    Ok(())
}

fn draw_player<W: Write>(
    out: &mut W,
    player: &Player,
    sprite: &Sprite,
    field: Playfield,
    bg: Color,
    view: Viewport,
) -> std::io::Result<()> {
    let col = view.col(player.rect.x, field);
    let row = view.row(player.rect.y, field);
    let color = rgb(player.color);
    draw_sprite(out, sprite, col, row, color, bg, view)?;

    // Name tag centred one row above the car
    let name_row = row - 1;
    if name_row >= HUD_ROWS as i32 {
        let len = player.name.chars().count() as i32;
        let name_col = (col + sprite.width() as i32 / 2 - len / 2)
            .clamp(0, (view.cols as i32 - len).max(0));
        out.queue(cursor::MoveTo(name_col as u16, name_row as u16))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(&player.name))?;
    }
    Ok(())
}

// ── HUD (top rows) ────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &MatchState) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {}", state.score)))?;

    for slot in PlayerSlot::ALL {
        let player = state.player(slot);
        out.queue(cursor::MoveTo(1, 1 + slot.index() as u16))?;
        out.queue(style::SetForegroundColor(rgb(player.color)))?;
        out.queue(Print(format!("{} lives: {}", player.name, player.lives)))?;
    }
    Ok(())
}

// ── Game-over screen ──────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, loser: &Player, view: Viewport) -> std::io::Result<()> {
    let blank_row = " ".repeat(view.cols as usize);
    out.queue(style::SetBackgroundColor(rgb(C_GAME_OVER_BG)))?;
    for row in 0..view.rows {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print(&blank_row))?;
    }

    let title = format!("{} lost!", loser.name);
    let lines: [(&str, Rgb, i32); 3] = [
        (title.as_str(), C_GAME_OVER_TITLE, -3),
        ("Press R to restart", C_GAME_OVER_HINT, 1),
        ("Press Esc to exit", C_GAME_OVER_HINT, 2),
    ];
    let cx = view.cols as i32 / 2;
    let cy = view.rows as i32 / 2;
    for (text, color, offset) in lines {
        let col = (cx - text.chars().count() as i32 / 2).max(0);
        let row = (cy + offset).clamp(0, view.rows.saturating_sub(1) as i32);
        out.queue(cursor::MoveTo(col as u16, row as u16))?;
        out.queue(style::SetForegroundColor(rgb(color)))?;
        out.queue(Print(text))?;
    }
    Ok(())
}
