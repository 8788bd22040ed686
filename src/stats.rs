//! Rolling statistics for the debug dashboard graphs.

use crate::agent::{Emotion, Personality};
use crate::simulation::SimState;

/// Ring buffer that stores the last N samples of a metric.
pub struct RingBuffer {
    data: Vec<f32>,
    head: usize,
    len: usize,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity],
            head: 0,
            len: 0,
            capacity,
        }
    }

    pub fn push(&mut self, value: f32) {
        self.data[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    /// Return samples in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let start = if self.len < self.capacity {
            0
        } else {
            self.head
        };
        (0..self.len).map(move |i| self.data[(start + i) % self.capacity])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn last(&self) -> Option<f32> {
        if self.len == 0 {
            None
        } else {
            let idx = (self.head + self.capacity - 1) % self.capacity;
            Some(self.data[idx])
        }
    }
}

/// Live counts of eyes by emotion and personality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EyeCensus {
    pub by_emotion: [usize; Emotion::ALL.len()],
    pub by_personality: [usize; Personality::ALL.len()],
    pub fascinated: usize,
    pub glowing: usize,
}

impl EyeCensus {
    pub fn take(sim: &SimState) -> Self {
        let mut census = Self::default();
        for (_, e) in sim.arena.iter_alive() {
            if !e.is_free() {
                continue;
            }
            let Some(agent) = e.agent() else { continue };
            if let Some(i) = Emotion::ALL.iter().position(|&m| m == agent.emotion) {
                census.by_emotion[i] += 1;
            }
            if let Some(i) = Personality::ALL.iter().position(|&p| p == agent.personality) {
                census.by_personality[i] += 1;
            }
            if agent.is_fascinated {
                census.fascinated += 1;
            }
            if agent.is_glowing() {
                census.glowing += 1;
            }
        }
        census
    }
}

/// All tracked simulation statistics.
pub struct SimStats {
    pub population: RingBuffer,
    pub eyes: RingBuffer,
    pub particles: RingBuffer,
    pub eaten: RingBuffer,

    pub census: EyeCensus,
    pub eaten_total: u64,
    pub faults: u64,

    // Per-sample accumulators
    pub eaten_this_sample: u32,
    pub sample_interval: u32,
    pub tick_counter: u32,
}

impl SimStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            population: RingBuffer::new(capacity),
            eyes: RingBuffer::new(capacity),
            particles: RingBuffer::new(capacity),
            eaten: RingBuffer::new(capacity),
            census: EyeCensus::default(),
            eaten_total: 0,
            faults: 0,
            eaten_this_sample: 0,
            sample_interval: 10, // sample every N ticks
            tick_counter: 0,
        }
    }

    /// Record the outcome of the tick that just ran.
    pub fn record(&mut self, population: usize, eyes: usize, particles: usize, eaten: usize) {
        self.eaten_this_sample += eaten as u32;
        self.eaten_total += eaten as u64;

        self.tick_counter += 1;
        if self.tick_counter % self.sample_interval != 0 {
            return;
        }

        self.population.push(population as f32);
        self.eyes.push(eyes as f32);
        self.particles.push(particles as f32);
        self.eaten.push(self.eaten_this_sample as f32);
        self.eaten_this_sample = 0;
    }

    pub fn record_sim(&mut self, sim: &SimState) {
        let population =
            crate::population::PopulationControl::counted(&sim.arena, &sim.world).len();
        self.record(
            population,
            sim.eye_count(),
            sim.particles.count(),
            sim.last_report.eaten.len(),
        );
        if self.tick_counter % self.sample_interval == 0 {
            self.census = EyeCensus::take(sim);
        }
    }
}
