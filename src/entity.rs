use macroquad::prelude::*;

use crate::agent::{Behavior, EyeAgent};
use crate::config;

/// Stable handle to an entity. The generation field invalidates stale references.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

/// Base fill identity of a gem. Two gems "match" when their RGB is equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GemColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl GemColor {
    pub const RED: GemColor = GemColor::rgb(255, 0, 0);
    pub const GREEN: GemColor = GemColor::rgb(0, 255, 0);
    pub const BLUE: GemColor = GemColor::rgb(0, 0, 255);
    pub const YELLOW: GemColor = GemColor::rgb(255, 255, 0);
    pub const CYAN: GemColor = GemColor::rgb(0, 255, 255);
    pub const MAGENTA: GemColor = GemColor::rgb(255, 0, 255);
    pub const GOLD: GemColor = GemColor::rgb(255, 215, 0);
    pub const WHITE: GemColor = GemColor::rgb(255, 255, 255);

    pub const PALETTE: [GemColor; 6] = [
        GemColor::RED,
        GemColor::GREEN,
        GemColor::BLUE,
        GemColor::YELLOW,
        GemColor::CYAN,
        GemColor::MAGENTA,
    ];

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn complementary(self) -> Self {
        Self::rgb(255 - self.r, 255 - self.g, 255 - self.b)
    }

    pub fn to_color(self, alpha: f32) -> Color {
        Color::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeKind {
    Polygon { sides: u8 },
    /// Long thin bar; `size` is half its length.
    Rectangle,
    /// Two perpendicular bars sharing a center.
    Cross,
}

/// Lifecycle tag. Exactly one holds at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Gem,
    GemSupply,
    GemTransition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RarityTag {
    Normal,
    Glowing,
    Eye,
    SuperEye,
    Rod,
    Cross,
}

impl RarityTag {
    pub fn is_eye(self) -> bool {
        matches!(self, RarityTag::Eye | RarityTag::SuperEye)
    }

    /// Glowing gems and super-eyes attract fascinated stares.
    pub fn is_glowing(self) -> bool {
        matches!(self, RarityTag::Glowing | RarityTag::SuperEye)
    }

    pub fn name(self) -> &'static str {
        match self {
            RarityTag::Normal => "normal",
            RarityTag::Glowing => "glowing",
            RarityTag::Eye => "eye",
            RarityTag::SuperEye => "super_eye",
            RarityTag::Rod => "rod",
            RarityTag::Cross => "cross",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub pos: Vec2,
    pub prev_pos: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    pub force: Vec2,
    pub torque: f32,
    pub shape: ShapeKind,
    /// Characteristic radius of the visible shape.
    pub size: f32,
    pub area: f32,
    pub mass: f32,
    pub restitution: f32,
    pub is_static: bool,
    pub category: Category,
    pub color: GemColor,
    pub complementary: GemColor,
    pub rarity: RarityTag,
    pub behavior: Behavior,
    /// Invisible grab area around tray gems; disabled once dragged out.
    pub grab_sensor: Option<f32>,
}

impl Entity {
    pub fn new(pos: Vec2, shape: ShapeKind, size: f32, color: GemColor, density: f32) -> Self {
        let area = shape_area(shape, size);
        Self {
            pos,
            prev_pos: pos,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            shape,
            size,
            area,
            mass: area * density,
            restitution: config::GEM_RESTITUTION,
            is_static: false,
            category: Category::Gem,
            color,
            complementary: color.complementary(),
            rarity: RarityTag::Normal,
            behavior: Behavior::Inert,
            grab_sensor: None,
        }
    }

    pub fn agent(&self) -> Option<&EyeAgent> {
        self.behavior.as_agent()
    }

    pub fn agent_mut(&mut self) -> Option<&mut EyeAgent> {
        self.behavior.as_agent_mut()
    }

    /// Free-floating and not part of the tray.
    pub fn is_free(&self) -> bool {
        !self.is_static && self.category != Category::GemSupply
    }

    /// Glowing by birth, or temporarily after a power-up.
    pub fn is_glowing(&self) -> bool {
        self.rarity.is_glowing() || self.agent().is_some_and(|a| a.is_glowing())
    }

    /// Radius of the circle with the same area as the shape.
    pub fn collision_radius(&self) -> f32 {
        (self.area / std::f32::consts::PI).sqrt()
    }

    pub fn apply_force(&mut self, force: Vec2) {
        if !self.is_static {
            self.force += force;
        }
    }

    pub fn apply_torque(&mut self, torque: f32) {
        if !self.is_static {
            self.torque += torque;
        }
    }

    /// Uniformly scale the shape. Area follows the square of `factor`; mass is
    /// left for the caller to decide.
    pub fn scale_shape(&mut self, factor: f32) {
        self.size *= factor;
        self.area = shape_area(self.shape, self.size);
        if let Some(sensor) = self.grab_sensor.as_mut() {
            *sensor *= factor;
        }
    }

    pub fn set_density(&mut self, density: f32) {
        self.mass = self.area * density;
    }

    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
        if is_static {
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
            self.force = Vec2::ZERO;
            self.torque = 0.0;
        }
    }

    /// Point-in-shape test against the equal-area circle or the grab sensor.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let radius = self
            .grab_sensor
            .unwrap_or(0.0)
            .max(self.collision_radius());
        self.pos.distance_squared(point) <= radius * radius
    }

    /// Invariant check: a body with non-finite kinematics or non-positive mass
    /// cannot be simulated any further.
    pub fn is_corrupt(&self) -> bool {
        !self.pos.is_finite()
            || !self.velocity.is_finite()
            || !self.angle.is_finite()
            || !self.mass.is_finite()
            || !self.area.is_finite()
            || self.mass <= 0.0
            || self.area <= 0.0
    }

    /// World-space vertex loops of the visible shape (one per convex part).
    pub fn parts(&self) -> Vec<Vec<Vec2>> {
        let rot = Vec2::from_angle(self.angle);
        let place = |local: Vec2| self.pos + rot.rotate(local);
        match self.shape {
            ShapeKind::Polygon { sides } => {
                let n = sides.max(3) as usize;
                let loop_ = (0..n)
                    .map(|i| {
                        let a = i as f32 / n as f32 * std::f32::consts::TAU;
                        place(Vec2::from_angle(a) * self.size)
                    })
                    .collect();
                vec![loop_]
            }
            ShapeKind::Rectangle => {
                let (hl, hw) = rod_half_extents(self.size);
                vec![rect_loop(hl, hw).into_iter().map(place).collect()]
            }
            ShapeKind::Cross => {
                let (hl, hw) = cross_half_extents(self.size);
                vec![
                    rect_loop(hl, hw).into_iter().map(place).collect(),
                    rect_loop(hw, hl).into_iter().map(place).collect(),
                ]
            }
        }
    }
}

fn rod_half_extents(size: f32) -> (f32, f32) {
    (
        size * config::ROD_LENGTH_FACTOR * 0.5,
        size * config::ROD_WIDTH_FACTOR * 0.5,
    )
}

fn cross_half_extents(size: f32) -> (f32, f32) {
    (
        size * config::CROSS_ARM_FACTOR * 0.5,
        size * config::CROSS_WIDTH_FACTOR * 0.5,
    )
}

fn rect_loop(half_x: f32, half_y: f32) -> [Vec2; 4] {
    [
        vec2(-half_x, -half_y),
        vec2(half_x, -half_y),
        vec2(half_x, half_y),
        vec2(-half_x, half_y),
    ]
}

pub fn shape_area(shape: ShapeKind, size: f32) -> f32 {
    match shape {
        ShapeKind::Polygon { sides } => {
            let n = sides.max(3) as f32;
            0.5 * n * size * size * (std::f32::consts::TAU / n).sin()
        }
        ShapeKind::Rectangle => {
            let (hl, hw) = rod_half_extents(size);
            4.0 * hl * hw
        }
        ShapeKind::Cross => {
            let (hl, hw) = cross_half_extents(size);
            // Two bars minus the shared square in the middle.
            2.0 * (4.0 * hl * hw) - 4.0 * hw * hw
        }
    }
}

/// Arena-based entity storage with generational indices and free list.
pub struct EntityArena {
    pub entities: Vec<Option<Entity>>,
    pub generations: Vec<u32>,
    pub free_list: Vec<u32>,
    pub count: usize,
}

impl EntityArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            entities: vec![None; capacity],
            generations: vec![0; capacity],
            free_list: (0..capacity as u32).rev().collect(),
            count: 0,
        }
    }

    /// Insert an entity. Returns None once the registry holds `MAX_ENTITY_COUNT`.
    pub fn spawn(&mut self, entity: Entity) -> Option<EntityId> {
        if self.count >= config::MAX_ENTITY_COUNT {
            return None;
        }
        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.entities[idx] = Some(entity);
            self.count += 1;
            Some(EntityId {
                index,
                generation: self.generations[idx],
            })
        } else {
            // Grow the arena
            let index = self.entities.len() as u32;
            self.entities.push(Some(entity));
            self.generations.push(0);
            self.count += 1;
            Some(EntityId {
                index,
                generation: 0,
            })
        }
    }

    /// Remove an entity and drop every eye's reference to it.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = id.index as usize;
        if idx >= self.entities.len() || self.generations[idx] != id.generation {
            return None;
        }
        let removed = self.entities[idx].take()?;
        self.generations[idx] += 1;
        self.free_list.push(id.index);
        self.count -= 1;
        self.forget(id);
        Some(removed)
    }

    fn forget(&mut self, id: EntityId) {
        for entity in self.entities.iter_mut().flatten() {
            if let Some(agent) = entity.agent_mut() {
                agent.forget(id);
            }
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let idx = id.index as usize;
        if idx < self.entities.len() && self.generations[idx] == id.generation {
            self.entities[idx].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let idx = id.index as usize;
        if idx < self.entities.len() && self.generations[idx] == id.generation {
            self.entities[idx].as_mut()
        } else {
            None
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        self.entities.get(index)?.as_ref()?;
        Some(EntityId {
            index: index as u32,
            generation: self.generations[index],
        })
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index).and_then(|e| e.as_ref())
    }

    pub fn get_mut_by_index(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index).and_then(|e| e.as_mut())
    }

    /// Iterate over (index, &Entity) for every stored entity.
    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (i, e)))
    }

    /// Iterate over (id, &Entity) for every stored entity.
    pub fn iter_ids(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|e| {
                (
                    EntityId {
                        index: i as u32,
                        generation: self.generations[i],
                    },
                    e,
                )
            })
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agent::Personality;

    pub(crate) fn test_gem(pos: Vec2, color: GemColor) -> Entity {
        Entity::new(
            pos,
            ShapeKind::Polygon { sides: 6 },
            20.0,
            color,
            config::BASE_DENSITY,
        )
    }

    pub(crate) fn test_eye(pos: Vec2, color: GemColor, personality: Personality) -> Entity {
        let mut e = test_gem(pos, color);
        e.rarity = RarityTag::Eye;
        e.set_density(config::BASE_DENSITY * config::HEAVY_DENSITY_FACTOR);
        e.behavior = Behavior::EyeAgent(EyeAgent::new(personality, 0.0));
        e
    }

    #[test]
    fn generational_handles_invalidate_after_despawn() {
        let mut arena = EntityArena::new(1);
        let id_a = arena.spawn(test_gem(vec2(0.0, 0.0), GemColor::RED)).unwrap();
        assert!(arena.get(id_a).is_some());

        assert!(arena.despawn(id_a).is_some());
        assert!(arena.get(id_a).is_none());

        let id_b = arena.spawn(test_gem(vec2(1.0, 0.0), GemColor::RED)).unwrap();
        assert_eq!(id_a.index, id_b.index);
        assert_ne!(id_a.generation, id_b.generation);
    }

    #[test]
    fn despawn_clears_fascination_pointing_at_the_removed_entity() {
        let mut arena = EntityArena::new(2);
        let glow = arena.spawn(test_gem(vec2(0.0, 0.0), GemColor::RED)).unwrap();
        let eye = arena
            .spawn(test_eye(vec2(10.0, 0.0), GemColor::BLUE, Personality::Curious))
            .unwrap();
        arena.get_mut(eye).unwrap().agent_mut().unwrap().fascinate(glow);

        arena.despawn(glow);

        let agent = arena.get(eye).unwrap().agent().unwrap();
        assert!(!agent.is_fascinated);
        assert_eq!(agent.fascinated_target, None);
    }

    #[test]
    fn complementary_is_componentwise_inverse() {
        assert_eq!(GemColor::RED.complementary(), GemColor::CYAN);
        assert_eq!(GemColor::BLUE.complementary(), GemColor::YELLOW);
        assert_eq!(GemColor::rgb(10, 20, 30).complementary(), GemColor::rgb(245, 235, 225));
    }

    #[test]
    fn scaling_shape_scales_area_quadratically() {
        let mut gem = test_gem(Vec2::ZERO, GemColor::GREEN);
        let before = gem.area;
        gem.scale_shape(2.0);
        assert!((gem.area - before * 4.0).abs() < 1e-2);
    }

    #[test]
    fn cross_has_two_parts_and_rod_one() {
        let mut gem = test_gem(Vec2::ZERO, GemColor::GREEN);
        gem.shape = ShapeKind::Cross;
        assert_eq!(gem.parts().len(), 2);
        gem.shape = ShapeKind::Rectangle;
        assert_eq!(gem.parts().len(), 1);
        assert_eq!(gem.parts()[0].len(), 4);
    }

    #[test]
    fn nan_position_is_corrupt() {
        let mut gem = test_gem(Vec2::ZERO, GemColor::GREEN);
        assert!(!gem.is_corrupt());
        gem.pos.x = f32::NAN;
        assert!(gem.is_corrupt());
    }

    #[test]
    fn static_bodies_ignore_forces() {
        let mut gem = test_gem(Vec2::ZERO, GemColor::GREEN);
        gem.set_static(true);
        gem.apply_force(vec2(5.0, 0.0));
        assert_eq!(gem.force, Vec2::ZERO);
    }
}
