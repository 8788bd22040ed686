use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use ::rand::{Rng, SeedableRng};
use macroquad::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::behavior::{self, BehaviorReport};
use crate::collision::{self, EatEvent};
use crate::config::{self, SimulationConfig};
use crate::entity::{Category, EntityArena, EntityId};
use crate::error::SimError;
use crate::factory;
use crate::particles::ParticleSystem;
use crate::physics::{self, Physics, StepParams};
use crate::population::{self, PopulationControl, PopulationReport};
use crate::spatial_hash::SpatialHash;
use crate::supply::{SupplyReport, SupplyTray};
use crate::world::World;

/// Body currently held by the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub id: EntityId,
    pub target: Vec2,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub supply: SupplyReport,
    pub population: PopulationReport,
    pub behavior: BehaviorReport,
    pub eaten: Vec<EatEvent>,
    pub lost: usize,
    pub corrupt: usize,
}

pub struct SimState {
    pub arena: EntityArena,
    pub world: World,
    pub spatial_hash: SpatialHash,
    pub physics: Physics,
    pub particles: ParticleSystem,
    pub supply: SupplyTray,
    pub population: PopulationControl,
    pub rng: ChaCha8Rng,
    pub tick_count: u64,
    pub paused: bool,
    pub eraser: bool,
    pub drag: Option<DragState>,
    pub last_report: TickReport,
    /// Message of the most recent caught tick fault, shown as an overlay.
    pub last_fault: Option<String>,
}

fn spatial_for(world: &World) -> SpatialHash {
    SpatialHash::new(Vec2::ZERO, world.width, world.height, config::SPATIAL_CELL_SIZE)
}

impl SimState {
    pub fn new(width: f32, height: f32, config: &SimulationConfig) -> Self {
        let world = World::new(width, height);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut arena = EntityArena::new(config::MAX_ENTITY_COUNT);

        // A minimized window can report a zero-sized screen.
        let spread = (world.boundary_radius * 0.5).max(1.0);
        for _ in 0..config.initial_gem_count {
            let offset = vec2(rng.gen_range(-spread..spread), rng.gen_range(-spread..spread));
            let gem = factory::create_entity(world.center() + offset, false, false, config, &mut rng);
            if arena.spawn(gem).is_none() {
                break;
            }
        }

        tracing::info!(
            gems = arena.count,
            width,
            height,
            seed = config.seed,
            "simulation created"
        );

        Self {
            arena,
            spatial_hash: spatial_for(&world),
            supply: SupplyTray::new(&world),
            world,
            physics: Physics::new(),
            particles: ParticleSystem::new(),
            population: PopulationControl::new(),
            rng,
            tick_count: 0,
            paused: false,
            eraser: false,
            drag: None,
            last_report: TickReport::default(),
            last_fault: None,
        }
    }

    /// Advance one tick with the given config snapshot.
    pub fn tick(&mut self, config: &SimulationConfig) {
        if self.paused {
            return;
        }
        let mut report = TickReport::default();

        // Maintenance
        report.supply = self.supply.maintain(&mut self.arena, config, &mut self.rng);
        report.population = self.population.maintain(
            &mut self.arena,
            &self.world,
            config,
            &mut self.particles,
            &mut self.rng,
        );

        // Global forces: the drag spring (gravity is applied inside the step)
        if let Some(drag) = self.drag {
            match self.arena.get_mut(drag.id) {
                Some(entity) => physics::apply_drag_spring(entity, drag.target),
                None => self.drag = None,
            }
        }

        // Agents
        self.spatial_hash.rebuild(&self.arena);
        report.behavior = behavior::update_agents(
            &mut self.arena,
            &self.spatial_hash,
            config,
            self.tick_count,
            &mut self.particles,
            &mut self.rng,
        );

        // Physics
        let started = self.physics.step(
            &mut self.arena,
            &mut self.spatial_hash,
            &self.world,
            StepParams {
                gravity: config.effective_gravity(),
                air_friction: config.air_friction,
                wall_restitution: config.wall_restitution,
                held: self.drag.map(|d| d.id),
            },
        );

        // Collisions
        report.eaten = collision::resolve_collisions(
            &mut self.arena,
            &started,
            &mut self.particles,
            &mut self.rng,
        );

        // Particles
        for (_, entity) in self.arena.iter_alive() {
            if entity.is_free() && entity.is_glowing() {
                self.particles.emit_glow(entity, &mut self.rng);
            }
        }
        self.particles.update();

        // Cleanup
        report.lost = population::cleanup_lost(&mut self.arena, &self.world);
        report.corrupt = self.remove_corrupt();
        self.physics.prune(&self.arena);
        if self.drag.is_some_and(|d| !self.arena.contains(d.id)) {
            self.drag = None;
        }

        self.last_report = report;
        self.tick_count += 1;
    }

    /// Run a tick, catching any panic at the tick boundary. A fault is logged,
    /// kept for the overlay and followed by a recovery sweep; the caller keeps
    /// scheduling frames.
    pub fn tick_guarded(&mut self, config: &SimulationConfig) -> Result<(), SimError> {
        self.run_guarded(|sim| sim.tick(config))
    }

    fn run_guarded(&mut self, step: impl FnOnce(&mut Self)) -> Result<(), SimError> {
        let tick = self.tick_count;
        match panic::catch_unwind(AssertUnwindSafe(|| step(self))) {
            Ok(()) => Ok(()),
            Err(payload) => {
                let fault = SimError::TickFault {
                    tick,
                    message: panic_message(payload.as_ref()),
                };
                tracing::error!(%fault, "tick failed, skipping frame");
                self.recover();
                self.tick_count = tick + 1;
                self.last_fault = Some(fault.to_string());
                Err(fault)
            }
        }
    }

    /// Bring the state back to something the next tick can trust.
    fn recover(&mut self) {
        let corrupt = self.remove_corrupt();

        let live: HashSet<EntityId> = self.arena.iter_ids().map(|(id, _)| id).collect();
        for entity in self.arena.entities.iter_mut().flatten() {
            entity.force = Vec2::ZERO;
            entity.torque = 0.0;
            if let Some(agent) = entity.agent_mut() {
                if agent.fascinated_target.is_some_and(|id| !live.contains(&id)) {
                    agent.clear_fascination();
                }
                if agent.attention.is_some_and(|id| !live.contains(&id)) {
                    agent.attention = None;
                }
            }
        }
        if self.drag.is_some_and(|d| !live.contains(&d.id)) {
            self.drag = None;
        }
        self.physics.prune(&self.arena);
        self.spatial_hash.rebuild(&self.arena);
        tracing::warn!(removed = corrupt, "recovery sweep finished");
    }

    /// Remove entities whose state can no longer be simulated.
    fn remove_corrupt(&mut self) -> usize {
        let corrupt: Vec<EntityId> = self
            .arena
            .iter_ids()
            .filter(|(_, e)| e.is_corrupt())
            .map(|(id, _)| id)
            .collect();
        for &id in &corrupt {
            tracing::warn!(index = id.index, "removing entity with corrupt state");
            self.arena.despawn(id);
        }
        corrupt.len()
    }

    pub fn set_target_population(&mut self, target: usize) {
        self.population.set_target(target);
    }

    pub fn release_population_control(&mut self) {
        self.population.release();
    }

    pub fn toggle_eraser(&mut self) -> bool {
        self.eraser = !self.eraser;
        if self.eraser {
            self.drag_end();
        }
        self.eraser
    }

    /// Delete everything under `point` and startle nearby eyes.
    pub fn erase_at(&mut self, point: Vec2) -> usize {
        let hits = physics::query_point_contains(&self.arena, point);
        let mut erased = 0;
        for id in hits {
            if let Some(gem) = self.arena.despawn(id) {
                self.particles.emit_pop(gem.pos, gem.color, &mut self.rng);
                erased += 1;
            }
        }
        if erased == 0 {
            return 0;
        }

        let radius_sq = config::ERASE_SCARE_RADIUS * config::ERASE_SCARE_RADIUS;
        for entity in self.arena.entities.iter_mut().flatten() {
            if entity.is_static || entity.pos.distance_squared(point) > radius_sq {
                continue;
            }
            if let Some(agent) = entity.agent_mut() {
                agent.scare();
            }
        }
        if self.drag.is_some_and(|d| !self.arena.contains(d.id)) {
            self.drag = None;
        }
        erased
    }

    /// Grab the nearest body under `point`. Tray gems come loose and lose
    /// their grab sensor.
    pub fn drag_start(&mut self, point: Vec2) -> Option<EntityId> {
        if self.eraser {
            return None;
        }
        let id = physics::query_point_contains(&self.arena, point)
            .into_iter()
            .next()?;
        let entity = self.arena.get_mut(id)?;
        if entity.category == Category::GemSupply {
            entity.set_static(false);
            entity.category = Category::GemTransition;
            entity.grab_sensor = None;
        }
        if let Some(agent) = entity.agent_mut() {
            agent.scare();
        }
        self.drag = Some(DragState { id, target: point });
        Some(id)
    }

    pub fn drag_move(&mut self, point: Vec2) {
        if let Some(drag) = self.drag.as_mut() {
            drag.target = point;
        }
    }

    pub fn drag_end(&mut self) {
        let Some(drag) = self.drag.take() else { return };
        let Some(entity) = self.arena.get_mut(drag.id) else { return };
        if entity.category == Category::GemTransition {
            entity.category = Category::Gem;
        }
        if let Some(agent) = entity.agent_mut() {
            agent.calm();
        }
    }

    /// Fling every free body away from the boundary center.
    pub fn shake(&mut self) -> usize {
        physics::push_outward(
            &mut self.arena,
            self.world.center(),
            None,
            config::SHAKE_ACCEL,
            None,
        )
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if width == self.world.width && height == self.world.height {
            return;
        }
        self.world = World::new(width, height);
        self.spatial_hash = spatial_for(&self.world);
        self.supply.layout(&self.world, &mut self.arena);
        tracing::debug!(width, height, "world resized");
    }

    pub fn eye_count(&self) -> usize {
        self.arena
            .iter_alive()
            .filter(|(_, e)| e.is_free() && e.rarity.is_eye())
            .count()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
