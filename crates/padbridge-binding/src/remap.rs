//! Stages 3 and 4: aliases and simulated combos.

use padbridge_controller_types::{ControllerButton, ControllerConfig, NormalizedButtonData};

/// Every aliased button takes the value its alias had before any alias
/// was applied, so aliases never chain.
pub fn apply_aliases(config: &ControllerConfig, out: &mut NormalizedButtonData) {
    let snapshot = *out;
    for button in ControllerButton::ALL {
        let alias = config.buttons_alias[button.index()];
        if alias != ControllerButton::None {
            out.set(button, snapshot.pressed(alias));
        }
    }
}

/// Combos run in configured order; a consumed source is no longer held
/// for later combos.
pub fn apply_combos(config: &ControllerConfig, out: &mut NormalizedButtonData) {
    for combo in config.combos() {
        let [first, second] = combo.sources;
        if first == ControllerButton::None || second == ControllerButton::None {
            continue;
        }
        if out.pressed(first) && out.pressed(second) {
            out.set(first, false);
            out.set(second, false);
            out.set(combo.target, true);
        }
    }
}
