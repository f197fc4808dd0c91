/// Text-art sprite loading.
///
/// Sprites are plain text files, one row of glyphs per line, scaled
/// nearest-neighbour to whatever cell size the screen needs. Loading is
/// never fatal: `load_sprite_or_blank` swaps a failed sprite for a blank
/// placeholder of the requested size.
use std::fmt;
use std::path::Path;

use tracing::warn;

#[derive(Debug)]
pub enum AssetError {
    Io(std::io::Error),
    /// The file had no visible glyphs.
    Empty,
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::Io(e)
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io(e) => write!(f, "IO error: {}", e),
            AssetError::Empty => write!(f, "sprite has no visible glyphs"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(e) => Some(e),
            AssetError::Empty => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    width: usize,
    height: usize,
    /// Row-major glyphs; `' '` is transparent.
    cells: Vec<char>,
    placeholder: bool,
}

impl Sprite {
    /// A sprite with nothing in it, standing in for one that failed to load.
    pub fn blank(width: usize, height: usize) -> Self {
        Sprite {
            width,
            height,
            cells: vec![' '; width * height],
            placeholder: true,
        }
    }

    /// Build a sprite from text art, scaled to `width` × `height` cells.
    /// Short lines are padded with transparent cells.
    pub fn from_art(art: &str, width: usize, height: usize) -> Result<Self, AssetError> {
        let rows: Vec<Vec<char>> = art
            .lines()
            .map(|line| line.trim_end().chars().collect())
            .collect();
        let src_w = rows.iter().map(Vec::len).max().unwrap_or(0);
        let src_h = rows.len();
        if src_w == 0 || rows.iter().flatten().all(|c| c.is_whitespace()) {
            return Err(AssetError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = &rows[y * src_h / height];
            for x in 0..width {
                cells.push(row.get(x * src_w / width).copied().unwrap_or(' '));
            }
        }
        Ok(Sprite {
            width,
            height,
            cells,
            placeholder: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        // chunks() panics on 0; an empty sprite has no rows anyway.
        self.cells.chunks(self.width.max(1))
    }
}

pub fn load_sprite(path: &Path, width: usize, height: usize) -> Result<Sprite, AssetError> {
    let art = std::fs::read_to_string(path)?;
    Sprite::from_art(&art, width, height)
}

/// Like `load_sprite`, but a failure is logged and replaced with
/// `Sprite::blank` of the requested size.
pub fn load_sprite_or_blank(path: &Path, width: usize, height: usize) -> Sprite {
    match load_sprite(path, width, height) {
        Ok(sprite) => sprite,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "sprite failed to load, using blank");
            Sprite::blank(width, height)
        }
    }
}
