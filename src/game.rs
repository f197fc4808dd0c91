/// The frame-stepped game loop.
///
/// `GameLoop` owns the configuration, the match state and the RNG. Each
/// frame it reads one `InputFrame` from a `Frontend`, advances the
/// simulation, hands the result back to the front end for drawing and then
/// sleeps off whatever is left of the frame budget.
use std::thread;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::compute::{apply_input, move_falling, remove_offscreen, resolve_collisions, spawn_step};
use crate::config::{ConfigError, GameConfig};
use crate::entities::{GameStatus, InputFrame, MatchState};

/// The I/O side of the game: a keyboard to read and a screen to draw on.
pub trait Frontend {
    /// Input gathered since the previous call.
    fn poll_input(&mut self) -> anyhow::Result<InputFrame>;

    /// Draw the current state. Called once per frame in every state except
    /// `Terminated`.
    fn render(&mut self, state: &MatchState, config: &GameConfig) -> anyhow::Result<()>;
}

pub struct GameLoop<R: Rng> {
    config: GameConfig,
    state: MatchState,
    rng: R,
}

impl<R: Rng> GameLoop<R> {
    /// Fails if `config` is one the simulation cannot run with.
    pub fn new(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = MatchState::new(&config);
        Ok(GameLoop { config, state, rng })
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// Advance one frame of simulation, without drawing or ticking down the
    /// collision flash.
    pub fn step(&mut self, input: &InputFrame) -> GameStatus {
        match self.state.status {
            GameStatus::Running => self.step_running(input),
            GameStatus::GameOver(_) => self.step_game_over(input),
            GameStatus::Terminated => {}
        }
        self.state.status
    }

    fn step_running(&mut self, input: &InputFrame) {
        if input.quit || input.exit {
            self.terminate();
            return;
        }
        let field = self.config.field;
        self.state.frame += 1;

        apply_input(&mut self.state, &input.players, field);
        spawn_step(&mut self.state, &self.config, &mut self.rng);
        move_falling(&mut self.state);
        let escaped = remove_offscreen(&mut self.state, field);
        if escaped > 0 {
            debug!(escaped, score = self.state.score, "obstacles escaped");
        }

        let report = resolve_collisions(&mut self.state, self.config.flash_frames);
        if let Some(loser) = report.loser {
            info!(
                loser = %self.state.player(loser).name,
                score = self.state.score,
                frame = self.state.frame,
                "game over"
            );
            self.state.status = GameStatus::GameOver(loser);
        }
    }

    fn step_game_over(&mut self, input: &InputFrame) {
        if input.restart {
            self.restart();
        } else if input.quit || input.exit {
            self.terminate();
        }
    }

    /// Start a fresh match with the same players.
    pub fn restart(&mut self) {
        self.state.reset();
        info!("match restarted");
    }

    fn terminate(&mut self) {
        info!(score = self.state.score, frame = self.state.frame, "terminated");
        self.state.status = GameStatus::Terminated;
    }

    /// Housekeeping after the frame has been drawn.
    pub fn end_frame(&mut self) {
        self.state.flash_frames = self.state.flash_frames.saturating_sub(1);
    }

    /// Run until the player quits. Frames are paced to the configured rate
    /// but never hurried: a slow frame simply delays the next one.
    pub fn run<F: Frontend>(&mut self, frontend: &mut F) -> anyhow::Result<()> {
        let frame_budget = self.config.frame_duration();
        info!(fps = self.config.fps, "match started");

        loop {
            let frame_start = Instant::now();

            let input = frontend.poll_input()?;
            if self.step(&input) == GameStatus::Terminated {
                return Ok(());
            }
            frontend.render(&self.state, &self.config)?;
            self.end_frame();

            let elapsed = frame_start.elapsed();
            if elapsed < frame_budget {
                thread::sleep(frame_budget - elapsed);
            }
        }
    }
}
