use egui;

use super::UiState;
use crate::config::{self, SimulationConfig};
use crate::simulation::SimState;

/// Runtime settings panel. Sliders edit the UI-owned config copy; the next
/// tick picks it up as its snapshot.
pub fn draw_settings(
    ctx: &egui::Context,
    sim: &mut SimState,
    config: &mut SimulationConfig,
    ui_state: &mut UiState,
) {
    egui::Window::new("Settings")
        .default_pos(egui::pos2(10.0, 140.0))
        .default_size(egui::vec2(260.0, 320.0))
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Physics");
            ui.add(egui::Slider::new(&mut config.gravity_scale, 0.0..=3.0).text("Gravity"));
            ui.add(egui::Slider::new(&mut config.air_friction, 0.0..=0.3).text("Air friction"));
            ui.add(
                egui::Slider::new(&mut config.wall_restitution, 0.0..=1.2).text("Wall bounce"),
            );
            ui.add(egui::Slider::new(&mut config.global_scale, 0.5..=2.5).text("Gem size"));
            ui.checkbox(&mut config.zero_gravity, "Zero gravity");
            ui.label(format!(
                "Gravity vector: ({:.2}, {:.2})",
                config.gravity_x, config.gravity_y
            ));

            ui.separator();
            ui.heading("Population");

            // Follow the live target unless the user is holding the slider.
            if !sim.population.is_held() {
                ui_state.population_slider = sim.population.target;
            }
            let response = ui.add(
                egui::Slider::new(
                    &mut ui_state.population_slider,
                    0..=config::MAX_ENTITY_COUNT / 2,
                )
                .text("Gems"),
            );
            if response.dragged() || response.changed() {
                sim.set_target_population(ui_state.population_slider);
            }
            if response.drag_stopped() || (response.changed() && !response.dragged()) {
                sim.release_population_control();
            }

            ui.separator();
            ui.heading("Tools");
            ui.horizontal(|ui| {
                let eraser_label = if sim.eraser { "Eraser: on" } else { "Eraser: off" };
                if ui.button(eraser_label).clicked() {
                    sim.toggle_eraser();
                }
                if ui.button("Shake").clicked() {
                    ui_state.shake_requested = true;
                }
            });

            if let Some(fault) = &sim.last_fault {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(220, 90, 80), fault);
                if ui.button("Dismiss").clicked() {
                    sim.last_fault = None;
                }
            }

            ui.separator();
            ui.heading("Info");
            ui.label(format!(
                "Spatial cells: {}x{}",
                sim.spatial_hash.cols, sim.spatial_hash.rows
            ));
            ui.label(format!("Seed: {}", config.seed));
        });
}
