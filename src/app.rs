//! Game loop
//!
//! Wires the frame clock, the input source, the fixed-step simulation and the
//! renderer together. Real frame time feeds an accumulator that is drained in
//! whole simulation ticks, so the run does not depend on the frame rate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;

use crate::config::Config;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, MIN_HEIGHT, MIN_WIDTH};
use crate::error::GameError;
use crate::highscores::{HighScores, RunRecord};
use crate::platform::{Controller, FrameClock, InputSource};
use crate::renderer::{Frame, Renderer, Tint, scene};
use crate::sim::{GameEvent, GamePhase, GameState, Layout, TickInput, tick};

/// Whether the loop keeps going after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Check a terminal size against the minimum playable field
pub fn check_size(width: u16, height: u16) -> Result<Layout, GameError> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(GameError::TerminalTooSmall {
            width,
            height,
            min_width: MIN_WIDTH,
            min_height: MIN_HEIGHT,
        });
    }
    Ok(Layout::new(width, height))
}

/// The running game: one session, possibly many runs
pub struct GameLoop<R: Renderer, I: InputSource> {
    state: GameState,
    renderer: R,
    input: I,
    controller: Controller,
    clock: FrameClock,
    accumulator: f32,
    /// Keys held at the last poll
    held: TickInput,
    /// Presses not yet seen by a tick
    latched: TickInput,
    highscores: HighScores,
    frame: Frame,
    /// Terminal currently below the minimum size
    too_small: bool,
    /// Raised from outside (termination signals)
    shutdown: Arc<AtomicBool>,
}

impl<R: Renderer, I: InputSource> GameLoop<R, I> {
    pub fn new(config: Config, seed: u64, renderer: R, input: I) -> anyhow::Result<Self> {
        let (width, height) = renderer.size()?;
        let layout = check_size(width, height)?;
        let clock = FrameClock::new(config.fps);
        log::info!(
            "New session: {}x{} field, {} fps, seed {seed}",
            width,
            height,
            config.fps
        );
        Ok(Self {
            state: GameState::new(config, seed, layout),
            renderer,
            input,
            controller: Controller::new(),
            clock,
            accumulator: 0.0,
            held: TickInput::default(),
            latched: TickInput::default(),
            highscores: HighScores::new(),
            frame: Frame::new(width, height),
            too_small: false,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Quit at the next frame once `flag` is raised
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    /// End the session, keeping its leaderboard
    pub fn into_highscores(self) -> HighScores {
        self.highscores
    }

    /// Run until the player quits
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let real_dt = self.clock.tick();
            if self.frame(real_dt)? == Flow::Quit {
                log::info!("Quit requested");
                return Ok(());
            }
        }
    }

    /// One frame: poll input, follow the terminal size, simulate, draw
    pub fn frame(&mut self, real_dt: f32) -> anyhow::Result<Flow> {
        if self.shutdown.load(Ordering::Relaxed) {
            log::info!("Termination signal received");
            return Ok(Flow::Quit);
        }
        let keys = self.input.poll().context("failed to read input")?;
        let command = self.controller.update(keys);
        if command.quit {
            return Ok(Flow::Quit);
        }
        self.held = TickInput {
            jump: command.input.jump,
            shoot: command.input.shoot,
            turbo: command.input.turbo,
            ..Default::default()
        };
        self.latched.jump |= command.input.jump;
        self.latched.shoot |= command.input.shoot;
        self.latched.pause |= command.input.pause;
        self.latched.restart |= command.input.restart;

        let (width, height) = self.renderer.size()?;
        match check_size(width, height) {
            Ok(layout) => {
                if self.too_small {
                    log::info!("Terminal large enough again ({width}x{height})");
                }
                self.too_small = false;
                self.state.resize(layout);
                self.step(real_dt);
                scene::draw(&self.state, &self.highscores, &mut self.frame);
            }
            Err(err) => {
                if !self.too_small {
                    log::warn!("{err}");
                }
                self.too_small = true;
                self.accumulator = 0.0;
                self.draw_too_small(width, height);
            }
        }

        self.renderer.present(&self.frame)?;
        Ok(Flow::Continue)
    }

    /// Drain the accumulator in fixed ticks
    fn step(&mut self, real_dt: f32) {
        let dt = self.state.config.dt();
        self.accumulator += real_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= dt && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                jump: self.held.jump || self.latched.jump,
                shoot: self.held.shoot || self.latched.shoot,
                turbo: self.held.turbo,
                pause: self.latched.pause,
                restart: self.latched.restart,
            };
            tick(&mut self.state, &input, dt);
            self.accumulator -= dt;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.latched = TickInput::default();
            self.record_finished_run();
        }
    }

    fn record_finished_run(&mut self) {
        let finished = self.state.events.iter().any(|e| {
            matches!(
                e,
                GameEvent::PhaseChanged {
                    to: GamePhase::GameOver,
                    ..
                }
            )
        });
        if finished {
            let record = RunRecord::from_state(&self.state);
            log::info!(
                "Run over: total {} (score {}, distance {}, seed {})",
                record.total,
                record.score,
                record.distance,
                record.seed
            );
            self.highscores.add_run(record);
        }
    }

    fn draw_too_small(&mut self, width: u16, height: u16) {
        self.frame.reset(width, height);
        let lines = [
            format!("terminal {width}x{height}"),
            format!("need {MIN_WIDTH}x{MIN_HEIGHT}"),
        ];
        for (i, line) in lines.iter().enumerate() {
            self.frame.put_str(0, i as i32, line, Tint::Banner);
        }
    }
}
