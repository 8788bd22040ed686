use ::rand::Rng;
use macroquad::prelude::*;

use crate::config;
use crate::entity::{Entity, EntityArena, EntityId};
use crate::particles::ParticleSystem;
use crate::physics::CollisionPair;

/// One successful meal, reported for logging and stats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EatEvent {
    pub predator: EntityId,
    pub prey: EntityId,
    pub prey_pos: Vec2,
    /// False once the predator has reached the area cap.
    pub grew: bool,
    pub powered_up: bool,
}

/// Decide which side of a contact eats the other. The lower id is checked
/// first; only an eye can eat, and only a gem of its own color.
fn pick_predator(a: (EntityId, &Entity), b: (EntityId, &Entity)) -> Option<(EntityId, EntityId)> {
    if a.1.color != b.1.color {
        return None;
    }
    if a.1.rarity.is_eye() {
        Some((a.0, b.0))
    } else if b.1.rarity.is_eye() {
        Some((b.0, a.0))
    } else {
        None
    }
}

/// Area after eating `prey_area`, or None when the eater is already at the cap.
pub fn grown_area(eater_area: f32, prey_area: f32) -> Option<f32> {
    if eater_area >= config::AREA_CAP {
        return None;
    }
    Some((eater_area + prey_area * config::GROWTH_SHARE).min(config::AREA_CAP))
}

/// Resolve every collision that started this step, in pair order.
pub fn resolve_collisions(
    arena: &mut EntityArena,
    pairs: &[CollisionPair],
    particles: &mut ParticleSystem,
    rng: &mut impl Rng,
) -> Vec<EatEvent> {
    let mut events = Vec::new();

    for pair in pairs {
        // Either side may already have been eaten earlier in this batch.
        let (Some(a), Some(b)) = (arena.get(pair.a), arena.get(pair.b)) else {
            continue;
        };
        if a.is_static || b.is_static {
            continue;
        }
        let Some((predator_id, prey_id)) = pick_predator((pair.a, a), (pair.b, b)) else {
            continue;
        };

        let (Some(predator), Some(prey)) = (arena.get(predator_id), arena.get(prey_id)) else {
            continue;
        };
        if predator.agent().is_some_and(|agent| agent.is_asleep()) {
            continue;
        }
        let prey_area = prey.area;
        let prey_pos = prey.pos;
        let prey_color = prey.color;
        let prey_glowing = prey.rarity.is_glowing();

        let Some(predator) = arena.get_mut(predator_id) else { continue };
        let grew = match grown_area(predator.area, prey_area) {
            Some(target) => {
                let factor = (target / predator.area).sqrt();
                predator.scale_shape(factor);
                predator.mass *= factor;
                true
            }
            None => false,
        };
        let mut powered_up = false;
        if prey_glowing {
            if let Some(agent) = predator.agent_mut() {
                agent.power_up();
                powered_up = true;
            }
        }

        particles.emit_pop(prey_pos, prey_color, rng);
        arena.despawn(prey_id);

        tracing::debug!(
            predator = predator_id.index,
            prey = prey_id.index,
            grew,
            powered_up,
            "eye ate a gem"
        );
        events.push(EatEvent {
            predator: predator_id,
            prey: prey_id,
            prey_pos,
            grew,
            powered_up,
        });
    }

    events
}
