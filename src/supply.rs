use ::rand::Rng;
use macroquad::prelude::*;

use crate::config::{self, SimulationConfig};
use crate::entity::{Category, EntityArena, EntityId};
use crate::factory;
use crate::world::World;

/// A fixed tray position holding at most one static display gem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupplySlot {
    pub pos: Vec2,
    pub occupied_by: Option<EntityId>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SupplyReport {
    pub released: usize,
    pub filled: usize,
}

/// The tray of regenerating gems at the bottom of the screen.
pub struct SupplyTray {
    slots: Vec<SupplySlot>,
    initial_fill_done: bool,
}

impl SupplyTray {
    pub fn new(world: &World) -> Self {
        let slots = slot_positions(world)
            .into_iter()
            .map(|pos| SupplySlot {
                pos,
                occupied_by: None,
            })
            .collect();
        Self {
            slots,
            initial_fill_done: false,
        }
    }

    pub fn slots(&self) -> &[SupplySlot] {
        &self.slots
    }

    /// Tray box in screen space.
    pub fn bounds(world: &World) -> Rect {
        let width = world.width * 0.8;
        Rect::new(
            (world.width - width) * 0.5,
            world.tray_top(),
            width,
            config::SUPPLY_BOX_HEIGHT,
        )
    }

    /// Recompute slot positions after a resize, carrying resting gems along.
    pub fn layout(&mut self, world: &World, arena: &mut EntityArena) {
        for (slot, pos) in self.slots.iter_mut().zip(slot_positions(world)) {
            slot.pos = pos;
            let Some(id) = slot.occupied_by else { continue };
            if let Some(entity) = arena.get_mut(id) {
                if entity.is_static {
                    entity.pos = pos;
                    entity.prev_pos = pos;
                }
            }
        }
    }

    /// Release slots whose gem left, then refill every empty slot.
    pub fn maintain(
        &mut self,
        arena: &mut EntityArena,
        config: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> SupplyReport {
        let mut report = SupplyReport::default();

        for slot in &mut self.slots {
            let Some(id) = slot.occupied_by else { continue };
            let Some(entity) = arena.get_mut(id) else {
                slot.occupied_by = None;
                continue;
            };
            let moved = entity.pos.distance(slot.pos) > config::SLOT_RELEASE_DISTANCE;
            if !moved && entity.is_static {
                continue;
            }

            slot.occupied_by = None;
            entity.grab_sensor = None;
            if config.global_scale != 1.0 {
                let mass_per_area = entity.mass / entity.area;
                entity.scale_shape(config.global_scale);
                entity.set_density(mass_per_area);
            }
            if entity.category == Category::GemSupply {
                entity.category = Category::Gem;
            }
            report.released += 1;
        }

        // The very first fill never produces eyes.
        let allow_special = self.initial_fill_done;
        for slot in &mut self.slots {
            if slot.occupied_by.is_some() {
                continue;
            }
            let gem = factory::create_entity(slot.pos, true, allow_special, config, rng);
            // A full registry leaves the slot empty until next tick.
            if let Some(id) = arena.spawn(gem) {
                slot.occupied_by = Some(id);
                report.filled += 1;
            }
        }
        self.initial_fill_done = true;

        if report.released > 0 {
            tracing::debug!(released = report.released, filled = report.filled, "tray restocked");
        }
        report
    }
}

fn slot_positions(world: &World) -> Vec<Vec2> {
    let bounds = SupplyTray::bounds(world);
    let col_width = bounds.w / config::SLOT_COLUMNS as f32;
    let row_height = bounds.h / config::SLOT_ROWS as f32;
    let mut positions = Vec::with_capacity(config::SLOT_COLUMNS * config::SLOT_ROWS);
    for row in 0..config::SLOT_ROWS {
        for col in 0..config::SLOT_COLUMNS {
            positions.push(vec2(
                bounds.x + (col as f32 + 0.5) * col_width,
                bounds.y + (row as f32 + 0.5) * row_height,
            ));
        }
    }
    positions
}
