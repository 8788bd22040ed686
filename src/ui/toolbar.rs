use egui;

use super::UiState;
use crate::config::SimulationConfig;
use crate::simulation::SimState;

/// Slim status strip + compact controls.
pub fn draw_toolbar(
    ctx: &egui::Context,
    sim: &mut SimState,
    config: &mut SimulationConfig,
    ui_state: &mut UiState,
) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.add_space(3.0);
        ui.horizontal_wrapped(|ui| {
            title_badge(ui, "KALEIDOSCOPE");

            ui.separator();
            compact_group(ui, "Sim", |ui| {
                let pause_label = if sim.paused { "Play" } else { "Pause" };
                if ui.button(pause_label).clicked() {
                    sim.paused = !sim.paused;
                }
                if ui.button("Shake").clicked() {
                    ui_state.shake_requested = true;
                }
            });

            compact_group(ui, "Tool", |ui| {
                if ui.selectable_label(!sim.eraser, "Grab").clicked() && sim.eraser {
                    sim.toggle_eraser();
                }
                if ui.selectable_label(sim.eraser, "Eraser").clicked() && !sim.eraser {
                    sim.toggle_eraser();
                }
                ui.toggle_value(&mut config.zero_gravity, "Zero-G");
            });

            compact_group(ui, "Panels", |ui| {
                ui.toggle_value(&mut ui_state.show_settings, "Settings");
                ui.toggle_value(&mut ui_state.show_graphs, "Graphs");
                ui.toggle_value(&mut ui_state.show_inspector, "Debug");
            });
        });

        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            metric_chip(ui, "Gems", format!("{}", sim.arena.count));
            metric_chip(ui, "Eyes", format!("{}", sim.eye_count()));
            metric_chip(ui, "Target", format!("{}", sim.population.target));
            metric_chip(ui, "Particles", format!("{}", sim.particles.count()));
            if sim.population.is_held() {
                status_chip(ui, "HOLDING", egui::Color32::from_rgb(98, 154, 191));
            }
            if sim.last_fault.is_some() {
                status_chip(ui, "FAULT", egui::Color32::from_rgb(220, 90, 80));
            }
        });
        ui.add_space(3.0);
    });
}

fn title_badge(ui: &mut egui::Ui, label: &str) {
    let text = egui::RichText::new(label)
        .strong()
        .color(egui::Color32::from_rgb(190, 220, 255));
    ui.label(text);
}

fn compact_group(ui: &mut egui::Ui, heading: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(heading)
                    .small()
                    .color(egui::Color32::from_rgb(150, 170, 185)),
            );
            add_contents(ui);
        });
    });
}

fn metric_chip(ui: &mut egui::Ui, key: &str, value: String) {
    let text = egui::RichText::new(format!("{key}: {value}"))
        .small()
        .color(egui::Color32::from_rgb(205, 215, 225));
    ui.group(|ui| {
        ui.label(text);
    });
}

fn status_chip(ui: &mut egui::Ui, label: &str, color: egui::Color32) {
    ui.group(|ui| {
        ui.label(egui::RichText::new(label).small().strong().color(color));
    });
}
