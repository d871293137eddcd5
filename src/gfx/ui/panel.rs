use imgui::Ui;

use crate::simulation::{game::GameOfLife, rules::RuleParameters};

/// Buttons pressed this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    ToggleRunning,
    Reseed,
}

/// Rule constants, start/stop and reseed. Edits land in `rules`; the caller
/// hands them to the game with [`apply_rules`].
pub fn control_panel(
    ui: &Ui,
    rules: &mut RuleParameters,
    running: bool,
    generation: u64,
) -> Option<PanelAction> {
    let mut action = None;

    ui.window("Game of Life")
        .size([320.0, 230.0], imgui::Condition::FirstUseEver)
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .build(|| {
            ui.text(format!("Generation {}", generation));
            ui.separator();

            ui.slider("Under-population", 0u32, 8, &mut rules.under_population_limit);
            ui.slider("Over-population", 0u32, 8, &mut rules.over_population_limit);
            ui.slider("Reproduce at", 0u32, 8, &mut rules.num_neighbors_to_reproduce);
            ui.slider("Resolution", 1u32, 8, &mut rules.resolution_multiplier);
            ui.separator();

            if ui.button(if running { "Stop" } else { "Start" }) {
                action = Some(PanelAction::ToggleRunning);
            }
            ui.same_line();
            if ui.button("Reseed") {
                action = Some(PanelAction::Reseed);
            }
        });

    action
}

/// Pushes every constant that differs from the game's current one through its
/// setter. Returns whether anything changed.
pub fn apply_rules(game: &mut GameOfLife, edited: RuleParameters) -> bool {
    let current = game.params();
    if edited == current {
        return false;
    }

    if edited.under_population_limit != current.under_population_limit {
        game.set_under_population_limit(edited.under_population_limit);
    }
    if edited.over_population_limit != current.over_population_limit {
        game.set_over_population_limit(edited.over_population_limit);
    }
    if edited.num_neighbors_to_reproduce != current.num_neighbors_to_reproduce {
        game.set_num_neighbors_to_reproduce(edited.num_neighbors_to_reproduce);
    }
    if edited.resolution_multiplier != current.resolution_multiplier {
        game.set_resolution_multiplier(edited.resolution_multiplier);
    }
    true
}
