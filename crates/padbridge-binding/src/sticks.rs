//! Stage 2: stick deflection and direction buttons.

use padbridge_controller_types::normalize::clip_unit_vector;
use padbridge_controller_types::{ControllerButton, ControllerConfig, NormalizedButtonData};

use crate::resolve::BoundAxes;

/// Direction buttons of one stick.
#[derive(Debug, Clone, Copy)]
pub struct StickDirections {
    pub left: ControllerButton,
    pub right: ControllerButton,
    pub up: ControllerButton,
    pub down: ControllerButton,
}

pub const STICK_DIRECTIONS: [StickDirections; 2] = [
    StickDirections {
        left: ControllerButton::LStickLeft,
        right: ControllerButton::LStickRight,
        up: ControllerButton::LStickUp,
        down: ControllerButton::LStickDown,
    },
    StickDirections {
        left: ControllerButton::RStickLeft,
        right: ControllerButton::RStickRight,
        up: ControllerButton::RStickUp,
        down: ControllerButton::RStickDown,
    },
];

#[inline]
fn axis_from_buttons(negative: bool, positive: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

pub fn apply(config: &ControllerConfig, bound: &BoundAxes, out: &mut NormalizedButtonData) {
    let threshold = f32::from(config.stick_activation_threshold) / 100.0;

    for (idx, (dirs, bound)) in STICK_DIRECTIONS.iter().zip(bound).enumerate() {
        let [x_bound, y_bound] = *bound;
        let stick = out.sticks[idx];

        // Bound axes fire direction buttons past the threshold
        if x_bound {
            if stick.axis_x < -threshold {
                out.set(dirs.left, true);
            }
            if stick.axis_x > threshold {
                out.set(dirs.right, true);
            }
        }
        if y_bound {
            if stick.axis_y < -threshold {
                out.set(dirs.up, true);
            }
            if stick.axis_y > threshold {
                out.set(dirs.down, true);
            }
        }

        if x_bound && y_bound {
            continue;
        }

        let x = if x_bound {
            stick.axis_x
        } else {
            axis_from_buttons(out.pressed(dirs.left), out.pressed(dirs.right))
        };
        let y = if y_bound {
            stick.axis_y
        } else {
            axis_from_buttons(out.pressed(dirs.up), out.pressed(dirs.down))
        };
        let (x, y) = clip_unit_vector(x, y);
        out.sticks[idx].axis_x = x;
        out.sticks[idx].axis_y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padbridge_controller_types::NormalizedStick;

    #[test]
    fn test_threshold_is_strict() {
        let config = ControllerConfig::default().with_stick_activation_threshold(50);
        let mut out = NormalizedButtonData::default();
        out.sticks[0] = NormalizedStick::new(-0.5, 0.51);
        apply(&config, &[[true, true], [true, true]], &mut out);
        assert!(!out.pressed(ControllerButton::LStickLeft));
        assert!(out.pressed(ControllerButton::LStickDown));
    }

    #[test]
    fn test_single_direction_synthesized() {
        let config = ControllerConfig::default();
        let mut out = NormalizedButtonData::default();
        out.set(ControllerButton::RStickUp, true);
        apply(&config, &[[true, true], [false, false]], &mut out);
        assert!((out.sticks[1].axis_y + 1.0).abs() < 1e-6);
        assert!(out.sticks[1].axis_x.abs() < 1e-6);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let config = ControllerConfig::default();
        let mut out = NormalizedButtonData::default();
        out.set(ControllerButton::LStickLeft, true);
        out.set(ControllerButton::LStickRight, true);
        apply(&config, &[[false, false], [false, false]], &mut out);
        assert_eq!(out.sticks[0], NormalizedStick::default());
    }

    #[test]
    fn test_bound_axis_kept_when_other_synthesized() {
        let config = ControllerConfig::default();
        let mut out = NormalizedButtonData::default();
        out.sticks[0].axis_x = 0.3;
        apply(&config, &[[true, false], [false, false]], &mut out);
        assert!((out.sticks[0].axis_x - 0.3).abs() < 1e-6);
        assert!(out.sticks[0].axis_y.abs() < 1e-6);
    }
}
