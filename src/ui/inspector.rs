use egui;

use crate::agent::{Emotion, Personality};
use crate::entity::{Entity, EntityId};
use crate::simulation::SimState;
use crate::stats::SimStats;

/// Debug dashboard: eye census plus details of the gem under the pointer.
pub fn draw_inspector(
    ctx: &egui::Context,
    sim: &SimState,
    hovered: Option<EntityId>,
    stats: &SimStats,
) {
    egui::Window::new("Debug")
        .default_pos(egui::pos2(980.0, 80.0))
        .default_size(egui::vec2(260.0, 420.0))
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Eyes");
            let census = &stats.census;
            ui.collapsing("By emotion", |ui| {
                for (emotion, count) in Emotion::ALL.iter().zip(census.by_emotion) {
                    ui.label(format!("{}: {}", emotion.name(), count));
                }
            });
            ui.collapsing("By personality", |ui| {
                for (personality, count) in Personality::ALL.iter().zip(census.by_personality) {
                    ui.label(format!("{}: {}", personality.name(), count));
                }
            });
            ui.label(format!("Fascinated: {}", census.fascinated));
            ui.label(format!("Powered up: {}", census.glowing));

            ui.separator();
            ui.heading("Last tick");
            let report = &sim.last_report;
            ui.label(format!(
                "Tray: {} released, {} filled",
                report.supply.released, report.supply.filled
            ));
            ui.label(format!(
                "Population: +{} / -{}",
                report.population.spawned, report.population.culled
            ));
            ui.label(format!("Meals: {}", report.eaten.len()));
            ui.label(format!(
                "Removed: {} lost, {} corrupt",
                report.lost, report.corrupt
            ));

            ui.separator();
            ui.heading("Under pointer");
            match hovered.and_then(|id| sim.arena.get(id).map(|e| (id, e))) {
                Some((id, entity)) => entity_details(ui, sim, id, entity),
                None => {
                    ui.label("Hover a gem to inspect it.");
                }
            }
        });
}

fn entity_details(ui: &mut egui::Ui, sim: &SimState, id: EntityId, entity: &Entity) {
    ui.label(format!("Slot: {} (gen {})", id.index, id.generation));
    ui.horizontal(|ui| {
        ui.label("Color:");
        let rect = ui.allocate_space(egui::vec2(20.0, 14.0));
        let c = entity.color;
        ui.painter()
            .rect_filled(rect.1, 0.0, egui::Color32::from_rgb(c.r, c.g, c.b));
    });
    ui.label(format!("Rarity: {}", entity.rarity.name()));
    ui.label(format!("Category: {:?}", entity.category));
    ui.label(format!("Area: {:.0}  Mass: {:.2}", entity.area, entity.mass));
    ui.label(format!("Speed: {:.2}", entity.velocity.length()));

    let Some(agent) = entity.agent() else { return };
    ui.separator();
    ui.label(format!("Personality: {}", agent.personality.name()));
    ui.label(format!("Emotion: {}", agent.emotion.name()));
    ui.label(format!(
        "Timers: emotion {} sleep {} glow {}",
        agent.emotion_timer, agent.sleep_counter, agent.glow_timer
    ));
    ui.label(format!("Stuck: {}", agent.stuck_counter));
    ui.label(format!(
        "Fascination: {} for {} (cooldown {})",
        if agent.is_fascinated { "yes" } else { "no" },
        agent.fascinated_timer,
        agent.cooldown_timer
    ));
    if let Some(target) = agent.fascinated_target.and_then(|t| sim.arena.get(t)) {
        ui.label(format!(
            "Staring at {} gem {:.0}px away",
            target.rarity.name(),
            target.pos.distance(entity.pos)
        ));
    }
}
