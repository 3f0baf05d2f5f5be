//! Game tunables
//!
//! Resolved once at startup (defaults, then an optional JSON file, then CLI
//! overrides) and handed by value to the simulation. Nothing reads it from a
//! global.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Every tunable the game reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Timing ===
    /// Simulation and render rate (ticks per second)
    pub fps: u32,

    // === Physics ===
    /// Downward acceleration (rows/s²)
    pub gravity: f32,
    /// Initial upward velocity of a jump (rows/s)
    pub jump_vel: f32,
    /// Starting scroll speed (columns/s)
    pub base_speed: f32,
    /// Scroll speed added on every speed-up (columns/s)
    pub speed_step: f32,
    /// Seconds of play between speed-ups
    pub speed_up_every_sec: f32,
    /// Scroll multiplier while turbo is held
    pub boost_multiplier: f32,

    // === Course ===
    /// Minimum gap between hazards, in jump lengths
    pub spacing_factor: f32,
    /// Grace period with no spawning at the start of a run
    pub safe_start_sec: f32,
    /// Highest step level above the base road
    pub max_elev: u8,
    /// Chance a step climbs rather than descends
    pub step_up_bias: f32,
    /// Per-column spawn probabilities
    pub pit_rate: f32,
    pub cone_rate: f32,
    pub enemy_rate: f32,
    pub step_rate: f32,
    /// Pit width range (columns)
    pub pit_min: u16,
    pub pit_max: u16,
    /// Cone-free columns after a pit or step edge
    pub edge_buffer: u32,

    // === Shooting ===
    /// Projectile speed (columns/s), independent of scroll
    pub bullet_speed: f32,
    /// Minimum time between shots
    pub bullet_cooldown_sec: f32,
    /// Points for destroying a fly
    pub enemy_score: u64,
    /// Sideways sway of flies, alternating each tick (columns)
    pub enemy_shimmy: f32,

    // === Run ===
    /// Lives at the start of a run
    pub lives: u8,
    /// Player column as a fraction of the field width
    pub car_x_fraction: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: 30,

            gravity: 22.0,
            jump_vel: 10.0,
            base_speed: 30.0,
            speed_step: 1.5,
            speed_up_every_sec: 14.0,
            boost_multiplier: 2.0,

            spacing_factor: 1.2,
            safe_start_sec: 2.0,
            max_elev: 10,
            step_up_bias: 0.55,
            pit_rate: 0.010,
            cone_rate: 0.014,
            enemy_rate: 0.010,
            step_rate: 0.012,
            pit_min: 3,
            pit_max: 9,
            edge_buffer: 4,

            bullet_speed: 90.0,
            bullet_cooldown_sec: 0.10,
            enemy_score: 25,
            enemy_shimmy: 0.35,

            lives: 3,
            car_x_fraction: 0.14,
        }
    }
}

impl Config {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write as pretty JSON, a starting point for `--config`
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Encode)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 || self.fps > 240 {
            return Err(ConfigError::invalid("fps", self.fps, "must be between 1 and 240"));
        }

        let positive = [
            ("gravity", self.gravity),
            ("jump_vel", self.jump_vel),
            ("base_speed", self.base_speed),
            ("spacing_factor", self.spacing_factor),
            ("bullet_speed", self.bullet_speed),
            ("speed_up_every_sec", self.speed_up_every_sec),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(field, value, "must be a positive number"));
            }
        }

        let non_negative = [
            ("speed_step", self.speed_step),
            ("safe_start_sec", self.safe_start_sec),
            ("bullet_cooldown_sec", self.bullet_cooldown_sec),
            ("enemy_shimmy", self.enemy_shimmy),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, value, "must not be negative"));
            }
        }

        let probabilities = [
            ("pit_rate", self.pit_rate),
            ("cone_rate", self.cone_rate),
            ("enemy_rate", self.enemy_rate),
            ("step_rate", self.step_rate),
            ("step_up_bias", self.step_up_bias),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(field, value, "must be within 0.0..=1.0"));
            }
        }

        if !self.boost_multiplier.is_finite() || self.boost_multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "boost_multiplier",
                self.boost_multiplier,
                "must be at least 1.0",
            ));
        }
        if self.pit_min == 0 {
            return Err(ConfigError::invalid("pit_min", self.pit_min, "must be at least 1"));
        }
        if self.pit_min > self.pit_max {
            return Err(ConfigError::invalid("pit_max", self.pit_max, "must not be below pit_min"));
        }
        if self.lives == 0 {
            return Err(ConfigError::invalid("lives", self.lives, "must be at least 1"));
        }
        if !(0.0..0.8).contains(&self.car_x_fraction) {
            return Err(ConfigError::invalid(
                "car_x_fraction",
                self.car_x_fraction,
                "must be within 0.0..0.8",
            ));
        }

        Ok(())
    }

    /// Fixed simulation timestep (seconds)
    #[inline]
    pub fn dt(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Whole ticks covering `secs`, rounded up
    pub fn ticks_for(&self, secs: f32) -> u32 {
        // Shave float noise so 0.1 s at 30 fps is 3 ticks, not 4
        ((secs * self.fps as f32 - 1e-4).ceil()).max(0.0) as u32
    }

    /// Time from takeoff to landing on flat ground
    pub fn air_time(&self) -> f32 {
        2.0 * self.jump_vel / self.gravity
    }

    /// Columns a jump covers at `speed`, with a 10% safety margin
    pub fn max_jump_columns(&self, speed: f32) -> u32 {
        ((speed * self.air_time() * 0.9) as u32).max(3)
    }

    /// Minimum gap between consecutive hazards at `speed`
    pub fn min_spacing(&self, speed: f32) -> u32 {
        (self.max_jump_columns(speed) as f32 * self.spacing_factor) as u32
    }
}
