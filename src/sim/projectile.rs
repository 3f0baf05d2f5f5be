//! Shots fired by the buggy

use glam::Vec2;

use super::collision::Hitbox;

/// A shot in flight, moving right at a fixed speed independent of scroll
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self { id, pos }
    }

    /// Advance by one step
    pub fn advance(&mut self, speed: f32, dt: f32) {
        self.pos.x += speed * dt;
    }

    /// Whether the shot has left a field `width` columns wide
    pub fn is_off_field(&self, width: u16) -> bool {
        self.pos.x >= width as f32
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.pos.x, self.pos.y, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_ignores_scroll() {
        let mut shot = Projectile::new(1, Vec2::new(10.0, 2.0));
        shot.advance(90.0, 1.0 / 30.0);
        assert!((shot.pos.x - 13.0).abs() < 1e-4);
        assert_eq!(shot.pos.y, 2.0);
    }

    #[test]
    fn test_off_field_at_right_edge() {
        let shot = Projectile::new(1, Vec2::new(79.9, 0.0));
        assert!(!shot.is_off_field(80));
        let shot = Projectile::new(1, Vec2::new(80.0, 0.0));
        assert!(shot.is_off_field(80));
    }
}
