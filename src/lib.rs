//! Lunar Buggy - a side-scrolling moon buggy runner for the terminal
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `renderer`: Character-grid frames and the crossterm presenter
//! - `platform`: Terminal session, key polling and frame pacing
//! - `config`: Tunables resolved once at startup
//! - `app`: The frame loop tying the pieces together

pub mod app;
pub mod config;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use app::GameLoop;
pub use config::Config;
pub use error::{ConfigError, GameError};
pub use highscores::HighScores;

/// Game configuration constants
pub mod consts {
    /// Maximum simulation ticks per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest real frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Buggy sprite size in cells
    pub const CAR_W: usize = 6;
    pub const CAR_H: usize = 3;

    /// Fly sprite size in cells
    pub const ENEMY_W: usize = 9;
    pub const ENEMY_H: usize = 3;
    /// Flies hover this many rows above the surface they spawned on
    pub const ENEMY_HOVER: f32 = 1.0;

    /// Rows under the road base: a bedrock row, then the HUD line
    pub const GROUND_PAD: u16 = 2;
    /// Rows needed above the highest step for the car, a jump and a fly
    pub const HEADROOM: u16 = 7;

    /// Smallest playable terminal
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 12;

    /// Tolerance when comparing the player's height with the ground
    pub const GROUND_EPSILON: f32 = 1e-3;
}
