use std::collections::VecDeque;

use ::rand::Rng;
use macroquad::prelude::*;

use crate::config;
use crate::entity::{Entity, GemColor, RarityTag};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Remaining life in [0, 1].
    pub life: f32,
    pub color: GemColor,
    /// Rising particles drift upward as they fade.
    pub rising: bool,
}

/// Bounded FIFO of decorative particles; the oldest is evicted when full.
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    capacity: usize,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::with_capacity(config::MAX_PARTICLES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn spawn(&mut self, pos: Vec2, color: GemColor, rising: bool, rng: &mut impl Rng) {
        if self.capacity == 0 {
            return;
        }
        while self.particles.len() >= self.capacity {
            self.particles.pop_front();
        }
        self.particles.push_back(Particle {
            pos,
            velocity: vec2(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            life: 1.0,
            color,
            rising,
        });
    }

    /// Two-particle burst left behind by an eaten or culled gem.
    pub fn emit_pop(&mut self, pos: Vec2, color: GemColor, rng: &mut impl Rng) {
        self.spawn(pos, color, false, rng);
        self.spawn(pos, GemColor::WHITE, false, rng);
    }

    /// Ambient sparkle around glowing gems and powered-up eyes.
    pub fn emit_glow(&mut self, entity: &Entity, rng: &mut impl Rng) {
        if !rng.gen_bool(config::GLOW_EMIT_CHANCE) {
            return;
        }
        let jitter = vec2(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
        let color = if entity.rarity == RarityTag::SuperEye {
            GemColor::GOLD
        } else {
            GemColor::WHITE
        };
        let powered_up = entity.agent().is_some_and(|a| a.is_glowing());
        self.spawn(entity.pos + jitter, color, powered_up, rng);
    }

    /// Advance all particles one tick, removing expired ones.
    pub fn update(&mut self) {
        for p in &mut self.particles {
            if p.rising {
                p.velocity.y -= config::PARTICLE_RISE_ACCEL;
            }
            p.pos += p.velocity;
            p.life -= config::PARTICLE_LIFE_DECAY;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }
}
