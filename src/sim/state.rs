//! World state and core simulation types
//!
//! Everything a run owns lives here. Restart throws the whole thing away and
//! builds a fresh one.

use glam::Vec2;

use super::collision::{Hazard, Hitbox};
use super::course::Course;
use super::physics::Physics;
use super::projectile::Projectile;
use super::spawner::Spawner;
use crate::config::Config;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Grace period: the world scrolls but nothing spawns
    SafeStart,
    /// Active gameplay
    Playing,
    /// Simulation frozen, input still read
    Paused,
    /// Run ended; only Restart (or Quit) does anything
    GameOver,
}

/// Field dimensions in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
}

impl Layout {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Screen row of the base road (elevation 0)
    pub fn ground_row(&self) -> u16 {
        self.height.saturating_sub(1 + GROUND_PAD)
    }

    /// Highest step level that still leaves room for the car, a jump and a fly
    pub fn max_elev(&self, configured: u8) -> u8 {
        let room = self.ground_row().saturating_sub(HEADROOM);
        configured.min(room.min(u8::MAX as u16) as u8)
    }

    /// Player's left edge column
    pub fn car_x(&self, fraction: f32) -> f32 {
        let max_x = (self.width as usize).saturating_sub(CAR_W) as f32;
        ((self.width as f32 * fraction) as u32 as f32).min(max_x)
    }
}

/// Vertical state of the buggy: exactly one holds at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Grounded,
    Airborne,
}

/// The player's buggy
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Left edge column (fixed while the world scrolls)
    pub x: f32,
    /// Wheel height in rows above the base road
    pub y: f32,
    /// Vertical velocity (rows/s, up-positive)
    pub vy: f32,
    pub motion: Motion,
    /// Ticks until the gun can fire again
    pub fire_cooldown: u32,
}

impl Player {
    pub fn new(x: f32, ground: f32) -> Self {
        Self {
            x,
            y: ground,
            vy: 0.0,
            motion: Motion::Grounded,
            fire_cooldown: 0,
        }
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.motion == Motion::Grounded
    }

    /// Front-wheel column: the ground under the player is read here
    pub fn cell(&self) -> usize {
        self.x as usize + CAR_W - 1
    }

    /// Rear-wheel column
    pub fn rear_cell(&self) -> usize {
        self.x as usize
    }

    /// Put the buggy down on `ground`
    pub fn land(&mut self, ground: f32) {
        self.y = ground;
        self.vy = 0.0;
        self.motion = Motion::Grounded;
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.x, self.y, CAR_W as f32, CAR_H as f32)
    }
}

/// Hazard types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleKind {
    /// Hole in the road surface
    Pit { width: u16 },
    /// One-cell cone on the surface
    Cone,
    /// Hovering fly; `sway` is the direction of its next shimmy
    Enemy { sway: f32 },
    /// Elevation change; `x` is the first column at the new level
    Step { from: u8, to: u8 },
}

impl ObstacleKind {
    /// Course columns the hazard occupies
    pub fn span(&self) -> u16 {
        match self {
            ObstacleKind::Pit { width } => *width,
            _ => 1,
        }
    }

    pub fn hazard(&self) -> Hazard {
        match self {
            ObstacleKind::Pit { .. } => Hazard::Pit,
            ObstacleKind::Cone => Hazard::Cone,
            ObstacleKind::Enemy { .. } => Hazard::Enemy,
            ObstacleKind::Step { .. } => Hazard::Step,
        }
    }
}

/// A hazard on the course
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Left edge column on screen
    pub x: f32,
    /// Course elevation the hazard sits on
    pub base: u8,
    /// World column where it spawned
    pub column: u64,
    /// Simulation tick of the spawn
    pub spawned_tick: u64,
}

impl Obstacle {
    /// Horizontal extent in columns
    pub fn width(&self) -> f32 {
        match self.kind {
            ObstacleKind::Enemy { .. } => ENEMY_W as f32,
            kind => kind.span() as f32,
        }
    }

    /// Column just past the right edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width()
    }

    pub fn hitbox(&self) -> Hitbox {
        let base = self.base as f32;
        match self.kind {
            ObstacleKind::Pit { width } => Hitbox::new(self.x, base, width as f32, 0.0),
            ObstacleKind::Cone => Hitbox::new(self.x, base, 1.0, 1.0),
            ObstacleKind::Enemy { .. } => Hitbox::new(
                self.x,
                base + ENEMY_HOVER,
                ENEMY_W as f32,
                ENEMY_H as f32,
            ),
            ObstacleKind::Step { from, to } => {
                // The riser face between the two levels
                let lo = from.min(to) as f32;
                Hitbox::new(self.x, lo, 1.0, from.abs_diff(to) as f32)
            }
        }
    }
}

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jumped,
    Landed { impact_vy: f32 },
    Fired { id: u32 },
    Spawned { id: u32, kind: ObstacleKind, column: u64 },
    EnemyDestroyed { id: u32, points: u64 },
    ConeHit { id: u32 },
    LifeLost { cause: Hazard, lives_left: u8 },
    SpeedUp { speed: f32 },
    PhaseChanged { from: GamePhase, to: GamePhase },
    Restarted { seed: u64 },
}

/// Complete state of one run (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: Config,
    /// Run seed for reproducibility
    pub seed: u64,
    pub layout: Layout,
    /// Current phase
    pub phase: GamePhase,
    /// Phase to return to when unpausing
    pub(crate) resume_phase: GamePhase,
    /// SafeStart ticks remaining
    pub safe_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks spent in Playing (drives the speed ramp)
    pub playing_ticks: u64,
    pub lives: u8,
    /// Points from scoring events
    pub score: u64,
    /// Columns travelled
    pub distance: u64,
    /// Base scroll speed before turbo (columns/s)
    pub speed: f32,
    /// Turbo held during the last tick
    pub turbo: bool,
    /// Fractional scroll not yet applied
    pub scroll_acc: f32,
    pub physics: Physics,
    pub player: Player,
    pub course: Course,
    pub spawner: Spawner,
    /// Active hazards, ordered by `x`
    pub obstacles: Vec<Obstacle>,
    /// Shots in flight, ordered by id
    pub projectiles: Vec<Projectile>,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new run with the given seed on a field of `layout`
    pub fn new(config: Config, seed: u64, layout: Layout) -> Self {
        let width = layout.width as usize;
        let max_elev = layout.max_elev(config.max_elev);
        let safe_ticks = config.ticks_for(config.safe_start_sec);
        let phase = if safe_ticks > 0 {
            GamePhase::SafeStart
        } else {
            GamePhase::Playing
        };
        let player = Player::new(layout.car_x(config.car_x_fraction), 0.0);

        Self {
            seed,
            layout,
            phase,
            resume_phase: phase,
            safe_ticks,
            time_ticks: 0,
            playing_ticks: 0,
            lives: config.lives,
            score: 0,
            distance: 0,
            speed: config.base_speed,
            turbo: false,
            scroll_acc: 0.0,
            physics: Physics::new(&config),
            player,
            course: Course::flat(width, 0),
            spawner: Spawner::new(&config, seed, max_elev, width as u64),
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
            config,
        }
    }

    /// Discard this run and start a new one, seeded from the old seed
    pub fn restart(&mut self) {
        let seed = next_seed(self.seed);
        *self = GameState::new(self.config.clone(), seed, self.layout);
        self.events.push(GameEvent::Restarted { seed });
        log::info!("Run restarted with seed {seed}");
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Switch phase and record the transition
    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
        log::info!("Phase {from:?} -> {to:?} at tick {}", self.time_ticks);
    }

    /// Place a hazard at screen column `x` on elevation `base`
    pub fn spawn_obstacle(&mut self, kind: ObstacleKind, x: f32, base: u8, column: u64) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            kind,
            x,
            base,
            column,
            spawned_tick: self.time_ticks,
        });
        self.events.push(GameEvent::Spawned { id, kind, column });
        log::debug!("Spawned {kind:?} at column {column}");
        self.normalize_order();
        id
    }

    /// Fire from the buggy's nose
    pub fn spawn_projectile(&mut self) -> u32 {
        let id = self.next_entity_id();
        let muzzle = Vec2::new(
            self.player.x + CAR_W as f32,
            self.player.y + (CAR_H - 1) as f32,
        );
        self.projectiles.push(Projectile::new(id, muzzle));
        self.events.push(GameEvent::Fired { id });
        id
    }

    /// Ground height under the player's cell
    pub fn ground_under_player(&self) -> f32 {
        self.course.elevation(self.player.cell()) as f32
    }

    /// Scroll speed this tick, turbo included
    pub fn scroll_speed(&self) -> f32 {
        self.physics.scroll_speed(self.speed, self.turbo)
    }

    /// Score plus distance: what the leaderboard ranks
    pub fn total(&self) -> u64 {
        self.score + self.distance
    }

    /// Keep hazards sorted by position and shots by id
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by(|a, b| a.x.total_cmp(&b.x));
        self.projectiles.sort_by_key(|p| p.id);
    }

    /// Re-lay out the run for a new terminal size
    pub fn resize(&mut self, layout: Layout) {
        if layout == self.layout {
            return;
        }
        let width = layout.width as usize;
        let max_elev = layout.max_elev(self.config.max_elev);

        self.layout = layout;
        self.course.resize(width);
        self.course.clamp_max(max_elev);
        self.spawner.max_elev = max_elev;
        self.spawner.elev = self.course.last();
        self.obstacles
            .retain(|o| o.x < layout.width as f32 && o.base <= max_elev);
        self.projectiles.retain(|p| p.pos.x < layout.width as f32);

        self.player.x = layout.car_x(self.config.car_x_fraction);
        let ground = self.ground_under_player();
        if self.player.is_grounded() || self.player.y < ground {
            self.player.land(ground);
        }
        log::info!("Field resized to {}x{}", layout.width, layout.height);
    }
}

/// Derive the next run's seed (64-bit LCG step)
pub fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}
