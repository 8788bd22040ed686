use std::path::{Path, PathBuf};

use clap::Parser;
use macroquad::prelude::*;
use tracing_subscriber::EnvFilter;

mod agent;
mod behavior;
mod collision;
mod config;
mod entity;
mod error;
mod factory;
mod particles;
mod physics;
mod population;
mod renderer;
mod simulation;
mod spatial_hash;
mod stats;
mod supply;
mod ui;
mod world;

use config::SimulationConfig;
use simulation::SimState;
use stats::SimStats;
use ui::UiState;

fn window_conf() -> Conf {
    Conf {
        window_title: "Kaleidoscope".to_string(),
        window_width: config::DEFAULT_SCREEN_WIDTH as i32,
        window_height: config::DEFAULT_SCREEN_HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kaleidoscope=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Kaleidoscope gem toy
#[derive(Parser, Debug)]
#[command(name = "kaleidoscope")]
#[command(about = "Tilt the kaleidoscope and watch the eyes eat")]
struct Args {
    /// JSON file with runtime settings (gravity, friction, seed, ...)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Config from `--config <path>`, falling back to defaults when absent or invalid.
fn load_config(path: Option<&Path>) -> SimulationConfig {
    let Some(path) = path else {
        return SimulationConfig::default();
    };
    match SimulationConfig::load(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config");
            config
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "config rejected; using defaults");
            SimulationConfig::default()
        }
    }
}

/// Gravity follows the pointer's offset from the screen center.
fn pointer_gravity(pointer: Vec2) -> Vec2 {
    let half = vec2(screen_width(), screen_height()) * 0.5;
    ((pointer - half) / half).clamp(Vec2::splat(-1.0), Vec2::ONE)
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();
    init_logging();
    let mut config = load_config(args.config.as_deref());
    let mut sim = SimState::new(screen_width(), screen_height(), &config);
    let mut accumulator = 0.0f64;
    let mut sim_stats = SimStats::new(1000);
    let mut ui_state = UiState::default();

    tracing::info!(seed = config.seed, "kaleidoscope started");

    loop {
        sim.resize(screen_width(), screen_height());

        let frame_time = get_frame_time() as f64;
        accumulator += frame_time.min(0.1);

        let mut egui_wants_pointer = false;
        egui_macroquad::cfg(|ctx| {
            egui_wants_pointer = ctx.wants_pointer_input();
        });

        let pointer = Vec2::from(mouse_position());
        if !egui_wants_pointer {
            if !is_mouse_button_down(MouseButton::Left) {
                let g = pointer_gravity(pointer);
                config.gravity_x = g.x;
                config.gravity_y = g.y;
            }

            if is_mouse_button_pressed(MouseButton::Left) {
                if sim.eraser {
                    sim.erase_at(pointer);
                } else {
                    sim.drag_start(pointer);
                }
            } else if is_mouse_button_down(MouseButton::Left) {
                if sim.eraser {
                    sim.erase_at(pointer);
                } else {
                    sim.drag_move(pointer);
                }
            }
        }
        if is_mouse_button_released(MouseButton::Left) {
            sim.drag_end();
        }
        ui_state.hovered = physics::query_point_contains(&sim.arena, pointer)
            .first()
            .copied();

        if is_key_pressed(KeyCode::Space) {
            sim.paused = !sim.paused;
        }
        if is_key_pressed(KeyCode::E) {
            sim.toggle_eraser();
        }
        if is_key_pressed(KeyCode::Z) {
            config.zero_gravity = !config.zero_gravity;
        }
        if is_key_pressed(KeyCode::D) {
            ui_state.show_inspector = !ui_state.show_inspector;
        }
        if is_key_pressed(KeyCode::S) || ui_state.shake_requested {
            ui_state.shake_requested = false;
            sim.shake();
        }

        let dt = config::FIXED_DT as f64;
        if !sim.paused {
            while accumulator >= dt {
                // Faults are logged and shown by the simulation itself.
                if sim.tick_guarded(&config).is_err() {
                    sim_stats.faults += 1;
                }
                sim_stats.record_sim(&sim);
                accumulator -= dt;
            }
        } else {
            accumulator = 0.0;
        }

        let alpha = if !sim.paused {
            (accumulator / dt) as f32
        } else {
            1.0
        };

        renderer::draw(&sim, alpha, pointer);

        // Draw egui UI on top
        ui::draw_ui(&mut sim, &mut config, &mut ui_state, &sim_stats);

        next_frame().await;
    }
}
