//! Vertical motion of the buggy
//!
//! Semi-implicit Euler: velocity first, then position, once per fixed step.
//! Horizontal motion is the world scrolling, so only the scroll rate lives
//! here.

use super::state::{Motion, Player};
use crate::config::Config;
use crate::consts::GROUND_EPSILON;

/// Physics constants for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub gravity: f32,
    pub jump_vel: f32,
    pub boost: f32,
}

impl Physics {
    pub fn new(config: &Config) -> Self {
        Self {
            gravity: config.gravity,
            jump_vel: config.jump_vel,
            boost: config.boost_multiplier,
        }
    }

    /// Start a jump; ignored unless the buggy is on the ground
    pub fn jump(&self, player: &mut Player) -> bool {
        if !player.is_grounded() {
            return false;
        }
        player.vy = self.jump_vel;
        player.motion = Motion::Airborne;
        true
    }

    /// Advance the buggy one step against the surface height `ground`
    ///
    /// Returns the vertical velocity at touchdown when the buggy lands. A
    /// grounded buggy whose surface drops away starts falling. One whose
    /// surface rises is left where it is, below the new surface.
    pub fn integrate(&self, player: &mut Player, ground: f32, dt: f32) -> Option<f32> {
        if player.is_grounded() {
            if ground < player.y - GROUND_EPSILON {
                player.vy = 0.0;
                player.motion = Motion::Airborne;
            } else {
                if ground <= player.y + GROUND_EPSILON {
                    player.y = ground;
                }
                return None;
            }
        }

        let prev_y = player.y;
        player.vy -= self.gravity * dt;
        player.y += player.vy * dt;

        // Land only when coming down onto the surface from above it
        if player.vy <= 0.0 && player.y <= ground && prev_y >= ground - GROUND_EPSILON {
            let impact = player.vy;
            player.land(ground);
            return Some(impact);
        }
        None
    }

    /// Scroll rate in columns per second
    #[inline]
    pub fn scroll_speed(&self, speed: f32, turbo: bool) -> f32 {
        if turbo { speed * self.boost } else { speed }
    }
}
