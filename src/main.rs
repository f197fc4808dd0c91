mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use avoid_the_police::config::GameConfig;
use avoid_the_police::entities::{Directions, InputFrame, MatchState};
use avoid_the_police::game::{Frontend, GameLoop};

use display::{SpriteSet, Viewport};

#[derive(Parser)]
#[command(name = "avoid-the-police")]
#[command(about = "Two-player terminal dodging game")]
struct Args {
    /// RON file overriding the default game settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the spawn RNG (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding the text-art sprites
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Where log output goes; the terminal itself is taken by the game
    #[arg(long, default_value = "avoid_the_police.log")]
    log_file: PathBuf,

    /// Print the effective configuration as RON and exit
    #[arg(long)]
    dump_config: bool,
}

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A key counts as held if its last press/repeat event arrived within this
/// many frames. Covers terminals that never send key-release events: the
/// OS key-repeat rate refreshes the entry before it expires.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

/// W/A/S/D for player 1, arrow keys for player 2.
fn directions(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> [Directions; 2] {
    let letter = |c: char| [KeyCode::Char(c), KeyCode::Char(c.to_ascii_uppercase())];
    [
        Directions {
            up: any_held(key_frame, &letter('w'), frame),
            down: any_held(key_frame, &letter('s'), frame),
            left: any_held(key_frame, &letter('a'), frame),
            right: any_held(key_frame, &letter('d'), frame),
        },
        Directions {
            up: is_held(key_frame, &KeyCode::Up, frame),
            down: is_held(key_frame, &KeyCode::Down, frame),
            left: is_held(key_frame, &KeyCode::Left, frame),
            right: is_held(key_frame, &KeyCode::Right, frame),
        },
    ]
}

// ── Terminal front end ────────────────────────────────────────────────────────

struct TerminalFrontend<'a, W: Write> {
    out: &'a mut W,
    rx: &'a mpsc::Receiver<Event>,
    /// Maps each held key → the frame it was last seen (press or repeat).
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    view: Viewport,
    sprites: SpriteSet,
    assets: PathBuf,
    config: GameConfig,
}

impl<'a, W: Write> TerminalFrontend<'a, W> {
    fn new(
        out: &'a mut W,
        rx: &'a mpsc::Receiver<Event>,
        assets: PathBuf,
        config: GameConfig,
    ) -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size().context("reading terminal size")?;
        let view = Viewport { cols, rows };
        let sprites = SpriteSet::load(&assets, &config, view);
        Ok(TerminalFrontend {
            out,
            rx,
            key_frame: HashMap::new(),
            frame: 0,
            view,
            sprites,
            assets,
            config,
        })
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.view = Viewport { cols, rows };
        self.sprites = SpriteSet::load(&self.assets, &self.config, self.view);
        info!(cols, rows, "terminal resized");
    }
}

impl<W: Write> Frontend for TerminalFrontend<'_, W> {
    /// Drain all pending terminal events (non-blocking) and report which
    /// keys are held this frame plus any one-shot commands.
    fn poll_input(&mut self) -> anyhow::Result<InputFrame> {
        self.frame += 1;
        let frame = self.frame;
        let mut input = InputFrame::default();

        while let Ok(ev) = self.rx.try_recv() {
            let KeyEvent {
                code,
                kind,
                modifiers,
                ..
            } = match ev {
                Event::Key(key) => key,
                Event::Resize(cols, rows) => {
                    self.resize(cols, rows);
                    continue;
                }
                _ => continue,
            };
            match kind {
                KeyEventKind::Press => {
                    self.key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            input.quit = true;
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') => input.quit = true,
                        KeyCode::Esc => input.exit = true,
                        KeyCode::Char('r') | KeyCode::Char('R') => input.restart = true,
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    self.key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    self.key_frame.remove(&code);
                }
            }
        }

        input.players = directions(&self.key_frame, frame);
        Ok(input)
    }

    fn render(&mut self, state: &MatchState, config: &GameConfig) -> anyhow::Result<()> {
        display::render(&mut *self.out, state, config, &self.sprites, self.view)?;
        Ok(())
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<GameConfig> {
    match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_ron_string()?);
        return Ok(());
    }

    init_logging(&args.log_file)?;

    let rng = match args.seed {
        Some(seed) => {
            info!(seed, "seeded RNG");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut game = GameLoop::new(config.clone(), rng).context("invalid game config")?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to HOLD_WINDOW.
    let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
        && out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();
    if !keyboard_enhanced {
        warn!("terminal lacks key-release events, using hold window");
    }

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = TerminalFrontend::new(&mut out, &rx, args.assets.clone(), config)
        .and_then(|mut frontend| game.run(&mut frontend));

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        tracing::error!(error = %e, "game aborted");
    }
    result
}
