//! Procedural hazard generation
//!
//! The spawner is asked for one new course column at a time as the world
//! scrolls. It decides the column's elevation and whether a hazard starts
//! there. Every hazard is followed by a cooldown of at least
//! [`Config::min_spacing`] flat columns, so any gap can be cleared with a jump.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::ObstacleKind;
use crate::config::Config;
use crate::consts::CAR_W;

/// What the spawner produced for one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpawn {
    /// World column index (monotonic over the run)
    pub column: u64,
    /// Elevation of the new column
    pub elev: u8,
    /// Hazard starting at this column, if any
    pub obstacle: Option<ObstacleKind>,
}

/// Seeded column generator
#[derive(Debug, Clone)]
pub struct Spawner {
    config: Config,
    rng: Pcg32,
    /// Elevation of the most recently generated column
    pub elev: u8,
    /// Highest elevation the current field can show
    pub max_elev: u8,
    /// Next world column to generate
    pub column: u64,
    /// Remaining columns of the pit in progress
    pit_left: u16,
    /// Flat columns still owed after the last hazard
    cooldown: u32,
    /// Columns right after a pit or step edge where cones may not sit
    edge_protect: u32,
}

impl Spawner {
    pub fn new(config: &Config, seed: u64, max_elev: u8, first_column: u64) -> Self {
        Self {
            config: config.clone(),
            rng: Pcg32::seed_from_u64(seed),
            elev: 0,
            max_elev,
            column: first_column,
            pit_left: 0,
            cooldown: 0,
            edge_protect: 0,
        }
    }

    /// Generate the next column at the given scroll speed
    ///
    /// While `suppressed` only flat ground comes out and no random numbers are
    /// drawn.
    pub fn next_column(&mut self, speed: f32, suppressed: bool) -> ColumnSpawn {
        let column = self.column;
        self.column += 1;
        let obstacle = if suppressed {
            self.cooldown = self.cooldown.saturating_sub(1);
            self.edge_protect = self.edge_protect.saturating_sub(1);
            None
        } else {
            self.roll(speed)
        };
        ColumnSpawn {
            column,
            elev: self.elev,
            obstacle,
        }
    }

    fn roll(&mut self, speed: f32) -> Option<ObstacleKind> {
        // Pit in progress: keep emitting pit columns, then start the cooldown
        if self.pit_left > 0 {
            self.pit_left -= 1;
            if self.pit_left == 0 {
                self.after_edge(speed);
            }
            return None;
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
            self.edge_protect = self.edge_protect.saturating_sub(1);
            return None;
        }

        // One draw per category every eligible column keeps the stream stable
        let pit_roll: f32 = self.rng.random();
        let step_roll: f32 = self.rng.random();
        let cone_roll: f32 = self.rng.random();
        let enemy_roll: f32 = self.rng.random();

        // Priority: Pit > Step > Cone > Enemy
        if pit_roll < self.config.pit_rate {
            let cap = self.pit_cap(speed);
            let width = self.rng.random_range(self.config.pit_min..=cap);
            if width > 1 {
                self.pit_left = width - 1;
            } else {
                self.after_edge(speed);
            }
            return Some(ObstacleKind::Pit { width });
        }

        if step_roll < self.config.step_rate && self.max_elev > 0 {
            let from = self.elev;
            let up = if from == 0 {
                true
            } else if from >= self.max_elev {
                false
            } else {
                self.rng.random::<f32>() < self.config.step_up_bias
            };
            self.elev = if up { from + 1 } else { from - 1 };
            self.after_edge(speed);
            return Some(ObstacleKind::Step { from, to: self.elev });
        }

        if cone_roll < self.config.cone_rate && self.edge_protect == 0 {
            self.cooldown = self.config.min_spacing(speed);
            return Some(ObstacleKind::Cone);
        }

        if enemy_roll < self.config.enemy_rate {
            self.cooldown = self.config.min_spacing(speed);
            return Some(ObstacleKind::Enemy { sway: 1.0 });
        }

        self.edge_protect = self.edge_protect.saturating_sub(1);
        None
    }

    /// Widest pit the whole buggy can still clear at `speed`
    fn pit_cap(&self, speed: f32) -> u16 {
        let jump = self
            .config
            .max_jump_columns(speed)
            .saturating_sub(CAR_W as u32);
        (jump.min(u16::MAX as u32) as u16).clamp(self.config.pit_min, self.config.pit_max)
    }

    fn after_edge(&mut self, speed: f32) {
        self.cooldown = self.config.min_spacing(speed);
        self.edge_protect = self.config.edge_buffer;
    }

    /// Restart generation after the field was cleared and levelled to `elev`
    pub fn reset_after_respawn(&mut self, elev: u8, speed: f32) {
        // Skip the rest of an interrupted pit as flat ground
        let owed = self.pit_left as u32;
        self.pit_left = 0;
        self.elev = elev;
        self.cooldown = self.config.min_spacing(speed) + owed;
        self.edge_protect = self.config.edge_buffer;
    }
}
