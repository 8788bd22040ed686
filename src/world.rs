use macroquad::prelude::*;

use crate::config;

/// Screen rectangle plus the circular play boundary and the tray band below it.
#[derive(Clone, Debug)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub boundary_center: Vec2,
    pub boundary_radius: f32,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            boundary_center: vec2(width * 0.5, height * config::BOUNDARY_CENTER_Y_FRACTION),
            boundary_radius: width.min(height) * config::BOUNDARY_RADIUS_FRACTION,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.boundary_center
    }

    /// Top edge of the supply tray band.
    pub fn tray_top(&self) -> f32 {
        self.height - config::SUPPLY_BOX_HEIGHT - config::SUPPLY_BOTTOM_MARGIN
    }

    pub fn distance_from_center(&self, pos: Vec2) -> f32 {
        pos.distance(self.boundary_center)
    }

    /// Loosely inside the boundary circle; used for population counting.
    pub fn in_bounds(&self, pos: Vec2) -> bool {
        self.distance_from_center(pos) <= self.boundary_radius * config::IN_BOUNDS_RADIUS_FACTOR
    }

    /// Far outside both the boundary circle and the screen rectangle.
    pub fn is_lost(&self, pos: Vec2) -> bool {
        let margin = config::OUT_OF_BOUNDS_SCREEN_MARGIN;
        let far_from_circle = self.distance_from_center(pos)
            > self.boundary_radius * config::OUT_OF_BOUNDS_RADIUS_FACTOR;
        let off_screen = pos.x < -margin
            || pos.x > self.width + margin
            || pos.y < -margin
            || pos.y > self.height + margin;
        far_from_circle && off_screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_sits_in_upper_part_of_screen() {
        let world = World::new(1000.0, 800.0);
        assert_eq!(world.boundary_center, vec2(500.0, 320.0));
        assert_eq!(world.boundary_radius, 320.0);
        assert!(world.tray_top() > world.boundary_center.y);
    }

    #[test]
    fn lost_requires_leaving_circle_and_screen() {
        let world = World::new(1000.0, 800.0);
        assert!(!world.is_lost(vec2(500.0, 320.0)));
        // Off screen but the circle margin still covers it.
        assert!(!world.is_lost(vec2(500.0, -149.0)));
        assert!(world.is_lost(vec2(-500.0, 320.0)));
        assert!(world.is_lost(vec2(500.0, 2000.0)));
    }
}
