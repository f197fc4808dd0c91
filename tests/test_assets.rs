use std::fs;

use avoid_the_police::assets::*;

fn rows(sprite: &Sprite) -> Vec<String> {
    sprite.rows().map(|r| r.iter().collect()).collect()
}

#[test]
fn art_at_native_size_is_unchanged() {
    let s = Sprite::from_art("ab\ncd\n", 2, 2).unwrap();
    assert_eq!(rows(&s), vec!["ab", "cd"]);
    assert!(!s.is_placeholder());
}

#[test]
fn art_scales_up_nearest_neighbour() {
    let s = Sprite::from_art("ab\ncd", 4, 4).unwrap();
    assert_eq!(rows(&s), vec!["aabb", "aabb", "ccdd", "ccdd"]);
}

#[test]
fn art_scales_down_nearest_neighbour() {
    let s = Sprite::from_art("abcd\nefgh\nijkl\nmnop", 2, 2).unwrap();
    assert_eq!(rows(&s), vec!["ac", "ik"]);
}

#[test]
fn short_lines_are_padded() {
    let s = Sprite::from_art("abc\na", 3, 2).unwrap();
    assert_eq!(rows(&s), vec!["abc", "a  "]);
}

#[test]
fn whitespace_only_art_is_empty() {
    assert!(matches!(Sprite::from_art("  \n \n", 2, 2), Err(AssetError::Empty)));
    assert!(matches!(Sprite::from_art("", 2, 2), Err(AssetError::Empty)));
}

#[test]
fn blank_has_requested_size() {
    let s = Sprite::blank(3, 2);
    assert_eq!((s.width(), s.height()), (3, 2));
    assert!(s.is_placeholder());
    assert_eq!(rows(&s), vec!["   ", "   "]);
}

#[test]
fn load_sprite_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("car.txt");
    fs::write(&path, "/\\\n||\n").unwrap();
    let s = load_sprite(&path, 2, 2).unwrap();
    assert_eq!(rows(&s), vec!["/\\", "||"]);
}

#[test]
fn missing_file_falls_back_to_blank() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt");
    assert!(matches!(load_sprite(&path, 4, 8), Err(AssetError::Io(_))));

    let s = load_sprite_or_blank(&path, 4, 8);
    assert_eq!(s, Sprite::blank(4, 8));
}

#[test]
fn bundled_sprites_load() {
    for name in ["player1", "player2", "obstacle", "bonus", "background"] {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join(format!("{}.txt", name));
        let s = load_sprite(&path, 5, 4).unwrap();
        assert_eq!((s.width(), s.height()), (5, 4), "{}", name);
    }
}
