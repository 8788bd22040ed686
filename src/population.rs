use ::rand::seq::SliceRandom;
use ::rand::Rng;
use macroquad::prelude::*;

use crate::config::{self, SimulationConfig};
use crate::entity::{Category, EntityArena, EntityId};
use crate::factory;
use crate::particles::ParticleSystem;
use crate::world::World;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopulationReport {
    pub spawned: usize,
    pub culled: usize,
}

/// Steers the number of free gems toward a target.
///
/// While nobody is touching the population control the target follows the
/// live count. Once the user sets a value it is held, and after release it
/// stays pending until the count has caught up.
#[derive(Clone, Debug, Default)]
pub struct PopulationControl {
    pub target: usize,
    held: bool,
    pending: bool,
}

impl PopulationControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&mut self, target: usize) {
        self.target = target.min(config::MAX_ENTITY_COUNT);
        self.held = true;
        self.pending = true;
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn is_steering(&self) -> bool {
        self.held || self.pending
    }

    /// Free gems that count toward the population: dynamic, in bounds, not in the tray.
    pub fn counted(arena: &EntityArena, world: &World) -> Vec<EntityId> {
        arena
            .iter_ids()
            .filter(|(_, e)| {
                !e.is_static && e.category != Category::GemSupply && world.in_bounds(e.pos)
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub fn maintain(
        &mut self,
        arena: &mut EntityArena,
        world: &World,
        config: &SimulationConfig,
        particles: &mut ParticleSystem,
        rng: &mut impl Rng,
    ) -> PopulationReport {
        let counted = Self::counted(arena, world);
        let count = counted.len();
        if !self.is_steering() {
            self.target = count;
            return PopulationReport::default();
        }

        let mut report = PopulationReport::default();
        if count < self.target {
            let wanted = (self.target - count).min(config::SPAWN_BATCH_CAP);
            for _ in 0..wanted {
                let offset = vec2(
                    rng.gen_range(-config::SPAWN_SPREAD..config::SPAWN_SPREAD),
                    rng.gen_range(-config::SPAWN_SPREAD..config::SPAWN_SPREAD),
                );
                let mut gem = factory::create_entity(world.center() + offset, false, false, config, rng);
                let kick = rng.gen_range(config::SPAWN_KICK_MIN..config::SPAWN_KICK_MAX);
                gem.velocity = Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU)) * kick;
                if arena.spawn(gem).is_none() {
                    break;
                }
                report.spawned += 1;
            }
        } else if count > self.target {
            let candidates: Vec<EntityId> = counted
                .into_iter()
                .filter(|&id| {
                    arena.get(id).is_some_and(|e| {
                        !e.rarity.is_eye() && e.category != Category::GemTransition
                    })
                })
                .collect();
            let excess = (count - self.target).min(config::CULL_BATCH_CAP);
            let victims: Vec<EntityId> = candidates.choose_multiple(rng, excess).copied().collect();
            for id in victims {
                if let Some(gem) = arena.despawn(id) {
                    particles.emit_pop(gem.pos, gem.color, rng);
                    report.culled += 1;
                }
            }
            // Only eyes left above target: nothing more can go.
            if candidates.is_empty() && !self.held {
                self.pending = false;
            }
        }

        if count + report.spawned - report.culled == self.target {
            self.pending = false;
        }
        if report != PopulationReport::default() {
            tracing::debug!(
                target = self.target,
                spawned = report.spawned,
                culled = report.culled,
                "population rebalanced"
            );
        }
        report
    }
}

/// Delete free bodies that escaped far past the boundary and the screen.
pub fn cleanup_lost(arena: &mut EntityArena, world: &World) -> usize {
    let lost: Vec<EntityId> = arena
        .iter_ids()
        .filter(|(_, e)| !e.is_static && world.is_lost(e.pos))
        .map(|(id, _)| id)
        .collect();
    for &id in &lost {
        if let Some(e) = arena.despawn(id) {
            tracing::debug!(index = id.index, x = e.pos.x, y = e.pos.y, "removed lost entity");
        }
    }
    lost.len()
}
