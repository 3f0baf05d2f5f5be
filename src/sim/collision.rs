//! Collision detection between the buggy, hazards and shots
//!
//! Everything is an axis-aligned box in field units: x in columns, y in rows
//! above the base road. Boxes are half-open, so touching edges do not collide.

use glam::Vec2;

use super::projectile::Projectile;
use super::state::{Obstacle, ObstacleKind, Player};
use crate::consts::GROUND_EPSILON;

/// Axis-aligned box, `min` inclusive and `max` exclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    #[inline]
    pub fn overlaps_x(&self, other: &Hitbox) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x
    }

    #[inline]
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.overlaps_x(other) && self.min.y < other.max.y && other.min.y < self.max.y
    }
}

/// What the player ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hazard {
    Pit,
    Cone,
    Enemy,
    /// A step riser or any terrain the buggy ended up inside
    Step,
}

/// Severity of a contact, ordered from harmless to fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Contact {
    None,
    /// Costs a life; the run carries on from where it is
    Damaging,
    /// Costs a life and resets the field
    Lethal,
}

/// The worst contact found for the player this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Obstacle responsible, `None` for bare terrain
    pub obstacle: Option<u32>,
    pub hazard: Hazard,
    pub contact: Contact,
}

/// How the player touches one obstacle
///
/// `scrolled` is how many columns the world moved this tick. Cones and flies
/// are stretched back over the cells they jumped across, so a fast scroll
/// cannot carry them through the buggy between two ticks.
pub fn obstacle_contact(player: &Player, obstacle: &Obstacle, scrolled: f32) -> Contact {
    let body = player.hitbox();
    let mut hitbox = obstacle.hitbox();
    if matches!(obstacle.kind, ObstacleKind::Cone | ObstacleKind::Enemy { .. }) {
        hitbox.max.x += (scrolled - 1.0).max(0.0);
    }
    match obstacle.kind {
        ObstacleKind::Pit { .. } => {
            if player.is_grounded() && body.overlaps_x(&hitbox) {
                Contact::Lethal
            } else {
                Contact::None
            }
        }
        ObstacleKind::Cone => {
            if body.overlaps(&hitbox) {
                Contact::Damaging
            } else {
                Contact::None
            }
        }
        ObstacleKind::Enemy { .. } => {
            if body.overlaps(&hitbox) {
                Contact::Lethal
            } else {
                Contact::None
            }
        }
        ObstacleKind::Step { from, to } => {
            // Only a rising riser is a wall; dropping off a ledge is fine
            if to > from && body.overlaps(&hitbox) {
                Contact::Lethal
            } else {
                Contact::None
            }
        }
    }
}

/// Find the most severe contact for the player
///
/// `obstacles` must be sorted by `x`. `ground` is the surface height under the
/// player's wheel cell and `scrolled` the columns moved this tick. On equal
/// severity the leftmost obstacle wins, and an obstacle wins over bare terrain.
pub fn player_hit(
    player: &Player,
    obstacles: &[Obstacle],
    ground: f32,
    scrolled: f32,
) -> Option<Hit> {
    let body = player.hitbox();
    let mut worst: Option<Hit> = None;

    for obstacle in obstacles.iter().take_while(|o| o.x < body.max.x) {
        let contact = obstacle_contact(player, obstacle, scrolled);
        if contact == Contact::None {
            continue;
        }
        if worst.is_none_or(|w| contact > w.contact) {
            worst = Some(Hit {
                obstacle: Some(obstacle.id),
                hazard: obstacle.kind.hazard(),
                contact,
            });
        }
    }

    // Sunk below the surface: a riser swept into the wheels
    if player.y < ground - GROUND_EPSILON && worst.is_none_or(|w| w.contact < Contact::Lethal) {
        worst = Some(Hit {
            obstacle: None,
            hazard: Hazard::Step,
            contact: Contact::Lethal,
        });
    }

    worst
}

/// Pair shots with the flies they hit
///
/// Each shot takes out at most one fly and each fly absorbs at most one shot.
/// Shots are matched in id order, flies left to right. Returns
/// `(projectile id, obstacle id)` pairs.
pub fn projectile_hits(projectiles: &[Projectile], obstacles: &[Obstacle]) -> Vec<(u32, u32)> {
    let mut hits: Vec<(u32, u32)> = Vec::new();
    for shot in projectiles {
        let shot_box = shot.hitbox();
        let target = obstacles.iter().find(|o| {
            matches!(o.kind, ObstacleKind::Enemy { .. })
                && !hits.iter().any(|&(_, id)| id == o.id)
                && shot_box.overlaps(&o.hitbox())
        });
        if let Some(enemy) = target {
            hits.push((shot.id, enemy.id));
        }
    }
    hits
}
