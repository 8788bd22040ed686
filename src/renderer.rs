use macroquad::prelude::*;

use crate::agent::{Emotion, EyeAgent};
use crate::config;
use crate::entity::{Entity, EntityArena, RarityTag};
use crate::particles::ParticleSystem;
use crate::simulation::SimState;
use crate::supply::SupplyTray;
use crate::world::World;

const BG_COLOR: Color = Color::new(0.02, 0.02, 0.05, 1.0);
const GEM_ALPHA: f32 = 0.7;

/// Draw the whole frame. `alpha` interpolates between the last two physics states.
pub fn draw(sim: &SimState, alpha: f32, pointer: Vec2) {
    clear_background(BG_COLOR);

    draw_boundary(&sim.world);
    draw_tray(&sim.world);
    draw_auras(&sim.arena, alpha);
    draw_gems(&sim.arena, alpha);
    draw_eyes(&sim.arena, sim.tick_count, alpha);
    draw_particles(&sim.particles);

    if sim.eraser {
        draw_circle_lines(pointer.x, pointer.y, 14.0, 2.0, Color::new(1.0, 0.3, 0.3, 0.8));
    }

    draw_hud(sim);
    if let Some(fault) = &sim.last_fault {
        draw_fault_overlay(fault);
    }
}

fn draw_boundary(world: &World) {
    let c = world.boundary_center;
    draw_circle(c.x, c.y, world.boundary_radius, Color::new(0.05, 0.05, 0.1, 1.0));
    draw_circle_lines(
        c.x,
        c.y,
        world.boundary_radius,
        3.0,
        Color::new(0.35, 0.35, 0.5, 0.8),
    );
}

fn draw_tray(world: &World) {
    let r = SupplyTray::bounds(world);
    draw_rectangle(r.x, r.y, r.w, r.h, Color::new(0.08, 0.08, 0.12, 0.9));
    draw_rectangle_lines(r.x, r.y, r.w, r.h, 2.0, Color::new(0.3, 0.3, 0.4, 0.8));
}

fn interpolated(entity: &Entity, alpha: f32) -> Vec2 {
    if entity.is_static {
        entity.pos
    } else {
        entity.prev_pos.lerp(entity.pos, alpha)
    }
}

fn draw_auras(arena: &EntityArena, alpha: f32) {
    for (_, entity) in arena.iter_alive() {
        if !entity.is_glowing() {
            continue;
        }
        let pos = interpolated(entity, alpha);
        let r = entity.collision_radius();
        let color = if entity.rarity == RarityTag::SuperEye {
            crate::entity::GemColor::GOLD
        } else {
            entity.color
        };
        for (scale, a) in [(2.2, 0.06), (1.7, 0.1), (1.3, 0.16)] {
            draw_circle(pos.x, pos.y, r * scale, color.to_color(a));
        }
    }
}

fn draw_gems(arena: &EntityArena, alpha: f32) {
    for (_, entity) in arena.iter_alive() {
        let shift = interpolated(entity, alpha) - entity.pos;
        let fill = entity.color.to_color(GEM_ALPHA);
        let edge = entity.color.to_color(1.0);
        for part in entity.parts() {
            let n = part.len();
            if n < 3 {
                continue;
            }
            let center = part.iter().copied().sum::<Vec2>() / n as f32 + shift;
            for i in 0..n {
                let a = part[i] + shift;
                let b = part[(i + 1) % n] + shift;
                draw_triangle(center, a, b, fill);
                draw_line(a.x, a.y, b.x, b.y, 1.5, edge);
            }
        }
    }
}

fn draw_eyes(arena: &EntityArena, tick: u64, alpha: f32) {
    for (_, entity) in arena.iter_alive() {
        let Some(agent) = entity.agent() else { continue };
        let pos = interpolated(entity, alpha);
        let look = look_target(arena, agent).map(|t| t - pos).unwrap_or(entity.velocity);
        draw_eye(pos, entity.collision_radius() * 0.55, agent, look, tick);
    }
}

/// Where the pupil points: the fascination target first, then the nearest kin.
fn look_target(arena: &EntityArena, agent: &EyeAgent) -> Option<Vec2> {
    agent
        .fascinated_target
        .or(agent.attention)
        .and_then(|id| arena.get(id))
        .map(|e| e.pos)
}

fn draw_eye(pos: Vec2, radius: f32, agent: &EyeAgent, look: Vec2, tick: u64) {
    let sclera = match agent.emotion {
        Emotion::Angry => Color::new(1.0, 0.75, 0.75, 1.0),
        _ => WHITE,
    };

    let blink_phase = (tick as f32 * 0.02 + agent.noise_offset) % 6.0;
    let lid_closed = agent.emotion == Emotion::Sleep || blink_phase < 0.12;
    if lid_closed {
        draw_circle(pos.x, pos.y, radius, Color::new(0.85, 0.85, 0.85, 1.0));
        draw_line(
            pos.x - radius,
            pos.y,
            pos.x + radius,
            pos.y,
            2.0,
            Color::new(0.1, 0.1, 0.1, 1.0),
        );
        return;
    }

    draw_circle(pos.x, pos.y, radius, sclera);

    let pupil_scale = match agent.emotion {
        Emotion::Surprised => 0.65,
        Emotion::Scared => 0.25,
        Emotion::Tired => 0.4,
        _ => 0.45,
    };
    let pupil_r = radius * pupil_scale;
    let dir = look.try_normalize().unwrap_or(Vec2::ZERO);
    let pupil = pos + dir * (radius - pupil_r) * 0.8;
    draw_circle(pupil.x, pupil.y, pupil_r, BLACK);
    draw_circle(
        pupil.x - pupil_r * 0.3,
        pupil.y - pupil_r * 0.3,
        pupil_r * 0.25,
        Color::new(1.0, 1.0, 1.0, 0.8),
    );

    if agent.emotion == Emotion::Tired {
        // Half-closed lid.
        draw_rectangle(
            pos.x - radius,
            pos.y - radius,
            radius * 2.0,
            radius * 0.8,
            Color::new(0.6, 0.6, 0.65, 0.9),
        );
    }
    if agent.emotion == Emotion::Angry {
        draw_line(
            pos.x - radius,
            pos.y - radius * 1.2,
            pos.x + radius * 0.2,
            pos.y - radius * 0.7,
            2.5,
            Color::new(0.8, 0.1, 0.1, 1.0),
        );
    }
}

fn draw_particles(particles: &ParticleSystem) {
    for p in particles.iter() {
        let life = p.life.clamp(0.0, 1.0);
        draw_circle(p.pos.x, p.pos.y, 1.0 + 2.0 * life, p.color.to_color(life));
    }
}

fn draw_hud(sim: &SimState) {
    let tc = Color::new(0.7, 0.75, 0.8, 1.0);
    let sh = Color::new(0.0, 0.0, 0.0, 0.5);

    let lines = [
        format!("FPS: {}", get_fps()),
        format!("Gems: {}", sim.arena.count),
        format!("Eyes: {}", sim.eye_count()),
        format!("Particles: {}/{}", sim.particles.count(), config::MAX_PARTICLES),
        format!("Target: {}", sim.population.target),
        format!("Tick: {}", sim.tick_count),
    ];
    for (i, text) in lines.iter().enumerate() {
        let y = 20.0 + i as f32 * 20.0;
        draw_text(text, 11.0, y + 1.0, 18.0, sh);
        draw_text(text, 10.0, y, 18.0, tc);
    }

    let banner = match (sim.paused, sim.eraser) {
        (true, _) => Some("PAUSED (Space to resume)"),
        (false, true) => Some("ERASER (E to toggle)"),
        _ => None,
    };
    if let Some(text) = banner {
        let tw = measure_text(text, None, 24, 1.0).width;
        let x = screen_width() * 0.5 - tw * 0.5;
        draw_text(text, x + 1.0, 31.0, 24.0, sh);
        draw_text(text, x, 30.0, 24.0, Color::new(1.0, 0.8, 0.2, 0.9));
    }
}

fn draw_fault_overlay(message: &str) {
    let mut text: String = message.chars().take(160).collect();
    if text.len() < message.len() {
        text.push_str("...");
    }
    let w = screen_width() - 40.0;
    let y = screen_height() - 70.0;
    draw_rectangle(20.0, y, w, 50.0, Color::new(0.4, 0.0, 0.0, 0.85));
    draw_text("tick fault (recovered)", 30.0, y + 20.0, 18.0, YELLOW);
    draw_text(&text, 30.0, y + 40.0, 16.0, WHITE);
}
