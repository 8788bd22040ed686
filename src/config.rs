// All tunable simulation constants in one place.
//
// Units are pixels and ticks: velocities are px/tick, and a force applied to a
// body accelerates it by `force / mass` px/tick² for the tick it was applied in.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

// Window
pub const DEFAULT_SCREEN_WIDTH: f32 = 1280.0;
pub const DEFAULT_SCREEN_HEIGHT: f32 = 900.0;

// Boundary
pub const BOUNDARY_RADIUS_FRACTION: f32 = 0.4;
pub const BOUNDARY_CENTER_Y_FRACTION: f32 = 0.4;
pub const OUT_OF_BOUNDS_RADIUS_FACTOR: f32 = 1.5;
pub const OUT_OF_BOUNDS_SCREEN_MARGIN: f32 = 100.0;
pub const IN_BOUNDS_RADIUS_FACTOR: f32 = 1.1;

// Supply tray
pub const SUPPLY_BOX_HEIGHT: f32 = 150.0;
pub const SUPPLY_BOTTOM_MARGIN: f32 = 20.0;
pub const SLOT_COLUMNS: usize = 6;
pub const SLOT_ROWS: usize = 2;
pub const SLOT_RELEASE_DISTANCE: f32 = 40.0;
pub const GRAB_SENSOR_FACTOR: f32 = 1.8;
pub const GRAB_SENSOR_MIN_RADIUS: f32 = 30.0;

// Entity factory
pub const MIN_GEM_SIZE: f32 = 12.0;
pub const MAX_GEM_SIZE: f32 = 36.0;
pub const MIN_POLYGON_SIDES: u8 = 3;
pub const MAX_POLYGON_SIDES: u8 = 7;
pub const SUPER_RARE_CHANCE: f64 = 0.0005;
pub const EYE_CHANCE: f64 = 0.005;
pub const GLOWING_CHANCE: f64 = 0.05;
pub const ROD_CHANCE: f64 = 0.15;
pub const CROSS_CHANCE: f64 = 0.05;
pub const SUPER_EYE_SIZE_FACTOR: f32 = 2.0;
pub const ROD_LENGTH_FACTOR: f32 = 2.5;
pub const ROD_WIDTH_FACTOR: f32 = 0.5;
pub const CROSS_ARM_FACTOR: f32 = 2.0;
pub const CROSS_WIDTH_FACTOR: f32 = 0.5;
pub const BASE_DENSITY: f32 = 0.001;
pub const HEAVY_DENSITY_FACTOR: f32 = 5.0;
pub const GEM_RESTITUTION: f32 = 0.6;
pub const MAX_ENTITY_COUNT: usize = 600;

// Physics
pub const FIXED_DT: f32 = 1.0 / 60.0;
pub const GRAVITY_ACCEL: f32 = 0.2;
pub const ANGULAR_DAMPING: f32 = 0.1;
pub const MAX_SPEED: f32 = 40.0;
pub const DRAG_STIFFNESS: f32 = 0.2;
pub const DRAG_DAMPING: f32 = 0.3;
pub const SPATIAL_CELL_SIZE: f32 = 64.0;
pub const SHAKE_ACCEL: f32 = 4.0;

// Agent behavior
pub const BASE_SCAN_RANGE: f32 = 250.0;
pub const STUCK_SPEED: f32 = 0.5;
pub const STUCK_THRESHOLD: u32 = 1000;
pub const STUCK_DECAY: u32 = 2;
pub const ANGRY_DURATION: u32 = 180;
pub const TIRED_DURATION: u32 = 120;
pub const SCARED_DURATION: u32 = 120;
pub const SURPRISED_DURATION: u32 = 120;
pub const SLEEP_DURATION: u32 = 300;
pub const GLOW_DURATION: u32 = 600;
pub const FASCINATION_COOLDOWN: u32 = 900;
pub const FASCINATION_CLOSING_DISTANCE: f32 = 60.0;
pub const SHY_FLEE_RADIUS: f32 = 80.0;
pub const SHY_FLEE_ACCEL: f32 = 0.05;
pub const AGGRESSIVE_CHASE_ACCEL: f32 = 0.02;
pub const SAME_COLOR_ATTRACT_ACCEL: f32 = 0.005;
pub const COMPLEMENTARY_IDEAL_DISTANCE: f32 = 100.0;
pub const COMPLEMENTARY_SPRING: f32 = 0.00005;
pub const SCARED_JITTER_ACCEL: f32 = 0.05;
pub const ANGRY_PUSH_CHANCE: f64 = 0.02;
pub const ANGRY_PUSH_RADIUS: f32 = 150.0;
pub const ANGRY_PUSH_ACCEL: f32 = 0.5;
pub const MOTOR_THRUST: f32 = 0.06;
pub const TURN_GAIN: f32 = 0.002;
pub const SUPER_EYE_TURN_FACTOR: f32 = 5.0;
pub const KICK_FREQUENCY: f32 = 0.05;
pub const MOVING_SPEED: f32 = 0.5;
pub const TIRED_MOOD: f32 = 0.3;

// Collision resolver
pub const GROWTH_SHARE: f32 = 0.5;
pub const AREA_CAP: f32 = 50_000.0;

// Population control
pub const SPAWN_BATCH_CAP: usize = 10;
pub const CULL_BATCH_CAP: usize = 5;
pub const SPAWN_SPREAD: f32 = 50.0;
pub const SPAWN_KICK_MIN: f32 = 1.0;
pub const SPAWN_KICK_MAX: f32 = 3.0;

// Eraser
pub const ERASE_SCARE_RADIUS: f32 = 120.0;

// Particles
pub const MAX_PARTICLES: usize = 300;
pub const PARTICLE_LIFE_DECAY: f32 = 0.02;
pub const PARTICLE_RISE_ACCEL: f32 = 0.05;
pub const GLOW_EMIT_CHANCE: f64 = 0.2;

/// Runtime-tunable parameters. The UI edits its own copy and hands the
/// simulation an immutable snapshot every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Gravity direction from the input adapter, each component in [-1, 1].
    pub gravity_x: f32,
    pub gravity_y: f32,
    pub gravity_scale: f32,
    pub air_friction: f32,
    pub wall_restitution: f32,
    /// Size multiplier applied to gems entering free play.
    pub global_scale: f32,
    pub zero_gravity: bool,
    pub seed: u64,
    pub initial_gem_count: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity_x: 0.0,
            gravity_y: 1.0,
            gravity_scale: 1.0,
            air_friction: 0.05,
            wall_restitution: 0.6,
            global_scale: 1.0,
            zero_gravity: false,
            seed: 42,
            initial_gem_count: 10,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let finite = [
            self.gravity_x,
            self.gravity_y,
            self.gravity_scale,
            self.air_friction,
            self.wall_restitution,
            self.global_scale,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(SimError::InvalidConfig("non-finite value".to_string()));
        }
        if !(0.0..1.0).contains(&self.air_friction) {
            return Err(SimError::InvalidConfig(format!(
                "air_friction {} outside [0, 1)",
                self.air_friction
            )));
        }
        if !(0.0..=1.5).contains(&self.wall_restitution) {
            return Err(SimError::InvalidConfig(format!(
                "wall_restitution {} outside [0, 1.5]",
                self.wall_restitution
            )));
        }
        if self.global_scale <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "global_scale {} must be positive",
                self.global_scale
            )));
        }
        if self.initial_gem_count > MAX_ENTITY_COUNT {
            return Err(SimError::InvalidConfig(format!(
                "initial_gem_count {} exceeds {}",
                self.initial_gem_count, MAX_ENTITY_COUNT
            )));
        }
        Ok(())
    }

    /// Gravity acceleration for this tick, in px/tick².
    pub fn effective_gravity(&self) -> macroquad::prelude::Vec2 {
        if self.zero_gravity {
            return macroquad::prelude::Vec2::ZERO;
        }
        macroquad::prelude::vec2(self.gravity_x, self.gravity_y) * self.gravity_scale * GRAVITY_ACCEL
    }
}
