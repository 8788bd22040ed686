pub mod graphs;
pub mod inspector;
pub mod settings;
pub mod toolbar;

use crate::config::SimulationConfig;
use crate::entity::EntityId;
use crate::simulation::SimState;
use crate::stats::SimStats;

/// Tracks which UI panels are open plus widget state that outlives a frame.
pub struct UiState {
    pub show_settings: bool,
    pub show_graphs: bool,
    pub show_inspector: bool,
    /// Value shown on the population slider.
    pub population_slider: usize,
    /// Entity under the pointer, for the inspector.
    pub hovered: Option<EntityId>,
    pub shake_requested: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_settings: true,
            show_graphs: false,
            show_inspector: false,
            population_slider: 0,
            hovered: None,
            shake_requested: false,
        }
    }
}

/// Draw all egui UI panels.
pub fn draw_ui(
    sim: &mut SimState,
    config: &mut SimulationConfig,
    ui_state: &mut UiState,
    stats: &SimStats,
) {
    egui_macroquad::ui(|ctx| {
        toolbar::draw_toolbar(ctx, sim, config, ui_state);

        if ui_state.show_settings {
            settings::draw_settings(ctx, sim, config, ui_state);
        }

        if ui_state.show_graphs {
            graphs::draw_graphs(ctx, stats);
        }

        if ui_state.show_inspector {
            inspector::draw_inspector(ctx, sim, ui_state.hovered, stats);
        }
    });

    egui_macroquad::draw();
}
