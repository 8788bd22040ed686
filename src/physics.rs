use std::collections::HashSet;

use macroquad::prelude::*;

use crate::config;
use crate::entity::{Entity, EntityArena, EntityId};
use crate::spatial_hash::SpatialHash;
use crate::world::World;

/// Two bodies that began touching during a step. `a` always sorts before `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    pub a: EntityId,
    pub b: EntityId,
}

impl CollisionPair {
    pub fn new(x: EntityId, y: EntityId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }
}

/// Per-step inputs that come from the tick's config snapshot and input state.
#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    pub gravity: Vec2,
    pub air_friction: f32,
    pub wall_restitution: f32,
    /// Body held by the pointer; it ignores the boundary wall.
    pub held: Option<EntityId>,
}

/// Minimal rigid-body stepper: equal-area circles, a circular wall, and
/// collision-start reporting.
#[derive(Default)]
pub struct Physics {
    contacts: HashSet<CollisionPair>,
}

impl Physics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every dynamic body by one tick. Returns the pairs that started
    /// touching this step, sorted by id so resolution order is reproducible.
    pub fn step(
        &mut self,
        arena: &mut EntityArena,
        spatial: &mut SpatialHash,
        world: &World,
        params: StepParams,
    ) -> Vec<CollisionPair> {
        integrate(arena, params.gravity, params.air_friction);
        constrain_to_boundary(arena, world, params.wall_restitution, params.held);
        spatial.rebuild(arena);
        let touching = resolve_contacts(arena, spatial);

        let mut started: Vec<CollisionPair> = touching
            .iter()
            .filter(|pair| !self.contacts.contains(*pair))
            .copied()
            .collect();
        started.sort();
        self.contacts = touching;
        started
    }

    /// Forget contacts involving removed bodies so a recycled slot reports a
    /// fresh collision.
    pub fn prune(&mut self, arena: &EntityArena) {
        self.contacts
            .retain(|pair| arena.contains(pair.a) && arena.contains(pair.b));
    }
}

/// Integrate forces, gravity and air friction into positions.
pub fn integrate(arena: &mut EntityArena, gravity: Vec2, air_friction: f32) {
    for entity in arena.entities.iter_mut().flatten() {
        entity.prev_pos = entity.pos;
        if entity.is_static {
            entity.force = Vec2::ZERO;
            entity.torque = 0.0;
            continue;
        }

        let accel = gravity + entity.force / entity.mass;
        entity.velocity = (entity.velocity + accel) * (1.0 - air_friction);
        entity.velocity = entity.velocity.clamp_length_max(config::MAX_SPEED);
        entity.pos += entity.velocity;

        entity.angular_velocity += entity.torque / entity.mass;
        entity.angular_velocity *= 1.0 - config::ANGULAR_DAMPING;
        entity.angle += entity.angular_velocity;

        entity.force = Vec2::ZERO;
        entity.torque = 0.0;
    }
}

/// Keep free bodies on their side of the circular wall, bouncing off it.
pub fn constrain_to_boundary(
    arena: &mut EntityArena,
    world: &World,
    restitution: f32,
    held: Option<EntityId>,
) {
    let held_index = held.map(|id| id.index as usize);
    let center = world.boundary_center;
    let wall = world.boundary_radius;

    for (idx, slot) in arena.entities.iter_mut().enumerate() {
        let Some(entity) = slot else { continue };
        if entity.is_static || Some(idx) == held_index {
            continue;
        }

        let offset = entity.pos - center;
        let dist = offset.length();
        if dist < 1e-4 {
            continue;
        }
        let normal = offset / dist;
        let r = entity.collision_radius();

        if dist < wall {
            if dist + r > wall {
                entity.pos = center + normal * (wall - r).max(0.0);
                let vn = entity.velocity.dot(normal);
                if vn > 0.0 {
                    entity.velocity -= normal * vn * (1.0 + restitution);
                }
            }
        } else if dist - r < wall {
            entity.pos = center + normal * (wall + r);
            let vn = entity.velocity.dot(normal);
            if vn < 0.0 {
                entity.velocity -= normal * vn * (1.0 + restitution);
            }
        }
    }
}

/// Separate overlapping bodies and exchange impulses. Returns every pair in
/// contact after this step.
pub fn resolve_contacts(arena: &mut EntityArena, spatial: &SpatialHash) -> HashSet<CollisionPair> {
    let mut touching = HashSet::new();

    // Collect body data first to avoid borrow conflicts
    let bodies: Vec<Option<(Vec2, f32, bool)>> = arena
        .entities
        .iter()
        .map(|slot| {
            slot.as_ref()
                .map(|e| (e.pos, e.collision_radius(), e.is_static))
        })
        .collect();
    let max_radius = bodies
        .iter()
        .flatten()
        .map(|(_, r, _)| *r)
        .fold(0.0f32, f32::max);

    for (idx_a, body_a) in bodies.iter().enumerate() {
        let Some((pos_a, radius_a, static_a)) = *body_a else {
            continue;
        };
        let neighbors =
            spatial.query_radius_excluding(pos_a, radius_a + max_radius, idx_a as u32, arena);

        for idx_b in neighbors {
            let idx_b = idx_b as usize;
            if idx_b <= idx_a {
                continue; // avoid double-processing pairs
            }
            let Some((_, radius_b, static_b)) = bodies[idx_b] else {
                continue;
            };
            if static_a && static_b {
                continue;
            }
            if separate_pair(arena, idx_a, idx_b, radius_a + radius_b) {
                if let (Some(a), Some(b)) = (arena.id_at(idx_a), arena.id_at(idx_b)) {
                    touching.insert(CollisionPair::new(a, b));
                }
            }
        }
    }

    touching
}

fn inverse_mass(e: &Entity) -> f32 {
    if e.is_static {
        0.0
    } else {
        1.0 / e.mass
    }
}

fn separate_pair(arena: &mut EntityArena, idx_a: usize, idx_b: usize, min_dist: f32) -> bool {
    let (Some(a), Some(b)) = (arena.get_by_index(idx_a), arena.get_by_index(idx_b)) else {
        return false;
    };
    let delta = b.pos - a.pos;
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return false;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-4 { delta / dist } else { Vec2::X };
    let inv_a = inverse_mass(a);
    let inv_b = inverse_mass(b);
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return true;
    }

    let overlap = min_dist - dist;
    let correction = normal * (overlap / inv_sum);
    let rel_vel = (b.velocity - a.velocity).dot(normal);
    let restitution = a.restitution.min(b.restitution);
    let impulse = if rel_vel < 0.0 {
        -(1.0 + restitution) * rel_vel / inv_sum
    } else {
        0.0
    };

    if let Some(a) = arena.get_mut_by_index(idx_a) {
        a.pos -= correction * inv_a;
        a.velocity -= normal * impulse * inv_a;
    }
    if let Some(b) = arena.get_mut_by_index(idx_b) {
        b.pos += correction * inv_b;
        b.velocity += normal * impulse * inv_b;
    }
    true
}

/// Spring the held body toward the pointer.
pub fn apply_drag_spring(entity: &mut Entity, target: Vec2) {
    let accel = (target - entity.pos) * config::DRAG_STIFFNESS - entity.velocity * config::DRAG_DAMPING;
    let mass = entity.mass;
    entity.apply_force(accel * mass);
}

/// Push free bodies away from `center`. With a radius, only bodies within it
/// are affected.
pub fn push_outward(
    arena: &mut EntityArena,
    center: Vec2,
    radius: Option<f32>,
    accel: f32,
    exclude: Option<EntityId>,
) -> usize {
    let exclude_index = exclude.map(|id| id.index as usize);
    let mut pushed = 0;
    for (idx, slot) in arena.entities.iter_mut().enumerate() {
        let Some(entity) = slot else { continue };
        if !entity.is_free() || Some(idx) == exclude_index {
            continue;
        }
        let offset = entity.pos - center;
        if radius.is_some_and(|r| offset.length_squared() > r * r) {
            continue;
        }
        let dir = offset.try_normalize().unwrap_or(Vec2::Y);
        let mass = entity.mass;
        entity.apply_force(dir * accel * mass);
        pushed += 1;
    }
    pushed
}

/// All entities whose shape (or grab sensor) contains `point`, nearest first.
pub fn query_point_contains(arena: &EntityArena, point: Vec2) -> Vec<EntityId> {
    let mut hits: Vec<(EntityId, f32)> = arena
        .iter_ids()
        .filter(|(_, e)| e.contains_point(point))
        .map(|(id, e)| (id, e.pos.distance_squared(point)))
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::tests::test_gem;
    use crate::entity::GemColor;

    fn setup() -> (World, SpatialHash, Physics) {
        let world = World::new(1000.0, 800.0);
        let spatial = SpatialHash::new(Vec2::ZERO, world.width, world.height, 64.0);
        (world, spatial, Physics::new())
    }

    fn params(gravity: Vec2) -> StepParams {
        StepParams {
            gravity,
            air_friction: 0.05,
            wall_restitution: 0.6,
            held: None,
        }
    }

    #[test]
    fn gravity_accelerates_free_bodies_only() {
        let (world, mut spatial, mut physics) = setup();
        let mut arena = EntityArena::new(2);
        let free = arena.spawn(test_gem(world.center(), GemColor::RED)).unwrap();
        let mut fixed = test_gem(world.center() + vec2(200.0, 0.0), GemColor::RED);
        fixed.set_static(true);
        let fixed = arena.spawn(fixed).unwrap();

        physics.step(&mut arena, &mut spatial, &world, params(vec2(0.0, 0.2)));

        assert!(arena.get(free).unwrap().velocity.y > 0.0);
        assert_eq!(arena.get(fixed).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn bodies_stay_inside_the_boundary() {
        let (world, mut spatial, mut physics) = setup();
        let mut arena = EntityArena::new(1);
        let id = arena.spawn(test_gem(world.center(), GemColor::RED)).unwrap();

        for _ in 0..600 {
            physics.step(&mut arena, &mut spatial, &world, params(vec2(0.0, 0.2)));
        }

        let e = arena.get(id).unwrap();
        let r = e.collision_radius();
        assert!(world.distance_from_center(e.pos) + r <= world.boundary_radius + 1e-2);
    }

    #[test]
    fn collision_start_is_reported_once_per_contact() {
        let (world, mut spatial, mut physics) = setup();
        let mut arena = EntityArena::new(2);
        let c = world.center();
        let a = arena.spawn(test_gem(c, GemColor::RED)).unwrap();
        let b = arena.spawn(test_gem(c + vec2(10.0, 0.0), GemColor::RED)).unwrap();

        let first = physics.step(&mut arena, &mut spatial, &world, params(Vec2::ZERO));
        assert_eq!(first, vec![CollisionPair::new(a, b)]);

        // Pin them together so they stay in contact.
        for id in [a, b] {
            arena.get_mut(id).unwrap().velocity = Vec2::ZERO;
        }
        let bx = arena.get(a).unwrap().pos.x + 20.0;
        arena.get_mut(b).unwrap().pos.x = bx;
        let second = physics.step(&mut arena, &mut spatial, &world, params(Vec2::ZERO));
        assert!(second.is_empty());
    }

    #[test]
    fn static_bodies_are_not_moved_by_contacts() {
        let (world, mut spatial, mut physics) = setup();
        let mut arena = EntityArena::new(2);
        let c = world.center();
        let mut wall = test_gem(c, GemColor::RED);
        wall.set_static(true);
        let wall = arena.spawn(wall).unwrap();
        let ball = arena.spawn(test_gem(c + vec2(5.0, 0.0), GemColor::RED)).unwrap();

        physics.step(&mut arena, &mut spatial, &world, params(Vec2::ZERO));

        assert_eq!(arena.get(wall).unwrap().pos, c);
        let gap = arena.get(ball).unwrap().pos.distance(c);
        let min = 2.0 * arena.get(ball).unwrap().collision_radius();
        assert!(gap >= min - 1e-3);
    }

    #[test]
    fn point_query_uses_grab_sensor() {
        let mut arena = EntityArena::new(1);
        let mut gem = test_gem(vec2(100.0, 100.0), GemColor::RED);
        let outside = vec2(100.0 + gem.collision_radius() + 5.0, 100.0);
        let id = arena.spawn(gem.clone()).unwrap();
        assert!(query_point_contains(&arena, outside).is_empty());

        gem.grab_sensor = Some(gem.collision_radius() * 2.0);
        *arena.get_mut(id).unwrap() = gem;
        assert_eq!(query_point_contains(&arena, outside), vec![id]);
    }

    #[test]
    fn outward_push_respects_radius() {
        let mut arena = EntityArena::new(2);
        let near = arena.spawn(test_gem(vec2(110.0, 100.0), GemColor::RED)).unwrap();
        let far = arena.spawn(test_gem(vec2(400.0, 100.0), GemColor::RED)).unwrap();

        let pushed = push_outward(&mut arena, vec2(100.0, 100.0), Some(50.0), 1.0, None);

        assert_eq!(pushed, 1);
        assert!(arena.get(near).unwrap().force.x > 0.0);
        assert_eq!(arena.get(far).unwrap().force, Vec2::ZERO);
    }
}
