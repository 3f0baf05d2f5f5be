//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (owned by the spawner)
//! - Stable iteration order (obstacles by position, shots by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod course;
pub mod physics;
pub mod projectile;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Contact, Hazard, Hit, Hitbox, obstacle_contact, player_hit, projectile_hits};
pub use course::Course;
pub use physics::Physics;
pub use projectile::Projectile;
pub use spawner::{ColumnSpawn, Spawner};
pub use state::{
    GameEvent, GamePhase, GameState, Layout, Motion, Obstacle, ObstacleKind, Player, next_seed,
};
pub use tick::{TickInput, tick};
